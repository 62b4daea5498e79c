use thiserror::Error;

/// Errors that can occur within the storage subsystem.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A JSON column could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A TEXT status column held a value no enum variant matches.
    #[error("Corrupt status column: {0}")]
    CorruptStatus(String),

    /// No job state exists for the given schedule id.
    #[error("Job state not found for schedule: {id}")]
    JobStateNotFound { id: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
