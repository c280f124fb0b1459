pub mod error;
pub mod models;
pub mod mongo;
pub mod store;

pub use error::RecordError;
pub use models::{BloodPressure, HealthRecord, NewHealthRecord, Symptoms};
pub use mongo::MongoRecordStore;
pub use store::RecordStore;
