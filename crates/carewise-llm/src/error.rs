use thiserror::Error;

/// Failures of the completion client.
///
/// Provider-specific detail (HTTP status, response body, transport error) is
/// logged at the client boundary and deliberately absent from these variants
/// so that callers cannot branch on it.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion API key is missing")]
    MissingCredential,

    #[error("completion API key is not a valid header value")]
    InvalidCredential,

    #[error("completion service unavailable")]
    Unavailable,
}

pub type Result<T> = std::result::Result<T, CompletionError>;
