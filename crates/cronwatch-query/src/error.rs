use thiserror::Error;

/// Errors that can occur while resolving a query.
///
/// These never escape the resolver as failures — they are converted into
/// `PythonError` data before the response leaves the crate.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidCron { expression: String, reason: String },

    #[error("Invalid execution timezone: {0}")]
    InvalidTimezone(String),

    #[error("Store error: {0}")]
    Store(#[from] cronwatch_store::StoreError),
}

pub type Result<T> = std::result::Result<T, QueryError>;
