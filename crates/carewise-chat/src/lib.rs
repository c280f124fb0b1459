pub mod error;
pub mod prompt;
pub mod service;

pub use error::ChatError;
pub use service::ChatService;

pub use carewise_history::{MessageRole, StoredMessage, ThreadIdentity, ThreadKind, ThreadSelector};
