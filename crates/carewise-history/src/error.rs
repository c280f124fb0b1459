use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("transcript serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("thread not found: {0}")]
    ThreadNotFound(String),
}

pub type Result<T> = std::result::Result<T, HistoryError>;
