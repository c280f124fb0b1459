pub mod error;
pub mod models;
pub mod mongo;
pub mod store;
pub mod thread;

pub use error::HistoryError;
pub use models::{MessageRole, StoredMessage};
pub use mongo::MongoHistoryStore;
pub use store::HistoryStore;
pub use thread::{ThreadIdentity, ThreadKind, ThreadSelector};
