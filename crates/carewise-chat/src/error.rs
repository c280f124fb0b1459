use carewise_history::HistoryError;
use carewise_llm::CompletionError;
use carewise_records::RecordError;
use thiserror::Error;

/// Stable error surface of the chat core.
///
/// Collaborator failures are folded into these variants so callers never
/// have to branch on provider- or database-specific shapes.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A form-specific thread referenced a record that does not exist or is
    /// not owned by the caller.
    #[error("health record not found: {0}")]
    RecordNotFound(String),

    /// Operation on a thread identity that was never created. `send_turn`
    /// and `get_history` cannot produce this; `clear_history` can.
    #[error("conversation thread not found: {0}")]
    ThreadNotFound(String),

    /// The completion call failed; safe to retry. The transcript is
    /// guaranteed unchanged.
    #[error("completion service unavailable")]
    CompletionUnavailable,

    /// Malformed request, rejected before any I/O.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Storage-layer failure outside the taxonomy above.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<HistoryError> for ChatError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::ThreadNotFound(identity) => ChatError::ThreadNotFound(identity),
            other => ChatError::Storage(other.to_string()),
        }
    }
}

impl From<RecordError> for ChatError {
    fn from(err: RecordError) -> Self {
        ChatError::Storage(err.to_string())
    }
}

impl From<CompletionError> for ChatError {
    fn from(_: CompletionError) -> Self {
        ChatError::CompletionUnavailable
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
