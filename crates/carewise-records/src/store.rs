use crate::error::Result;
use crate::models::{HealthRecord, NewHealthRecord};
use async_trait::async_trait;

/// Trait for health record storage.
///
/// Every lookup is scoped to the owning user: a record id belonging to a
/// different user behaves exactly like a missing record.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new record for the user, assigning its id and timestamps.
    async fn create(&self, user_id: &str, record: NewHealthRecord) -> Result<HealthRecord>;

    /// Fetch one record by id, if it exists and is owned by the user.
    /// An id that does not parse is treated as not found.
    async fn find_by_id(&self, user_id: &str, record_id: &str) -> Result<Option<HealthRecord>>;

    /// The user's most recently created record, if any.
    async fn find_latest_for_user(&self, user_id: &str) -> Result<Option<HealthRecord>>;

    /// All records for the user, newest first. The order is stable: ties on
    /// creation time fall back to the descending id order of the store.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<HealthRecord>>;
}
