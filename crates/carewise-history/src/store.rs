use crate::error::Result;
use crate::models::StoredMessage;
use crate::thread::ThreadIdentity;
use async_trait::async_trait;

/// Trait for transcript persistence, keyed by thread identity.
///
/// Implementations must make `get_or_create` an atomic check-then-act and
/// `append` a single atomic write, so that concurrent first turns cannot
/// create duplicate transcripts and a turn's (user, assistant) pair is
/// appended without interleaving.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Return the transcript for the identity, creating an empty one if it
    /// does not exist yet.
    async fn get_or_create(&self, identity: &ThreadIdentity) -> Result<Vec<StoredMessage>>;

    /// Append messages in order. Fails with
    /// [`crate::HistoryError::ThreadNotFound`] if the identity was never
    /// created; callers go through [`HistoryStore::get_or_create`] first.
    async fn append(&self, identity: &ThreadIdentity, messages: Vec<StoredMessage>) -> Result<()>;

    /// Empty the transcript, keeping the thread itself so the identity is
    /// immediately reusable. Idempotent on an already-empty transcript;
    /// fails with [`crate::HistoryError::ThreadNotFound`] if the identity
    /// was never created.
    async fn clear(&self, identity: &ThreadIdentity) -> Result<()>;

    /// Read the transcript without creating anything; a never-created
    /// identity reads as an empty sequence.
    async fn read(&self, identity: &ThreadIdentity) -> Result<Vec<StoredMessage>>;
}
