use crate::db::store::StoreError;

/// Result type for engine and report operations
pub type EngineResult<T> = Result<T, TimesheetError>;

/// Errors surfaced by the workflow engine. Every variant except `Store` is
/// raised before any mutation is applied, so a failed call never leaves a
/// timesheet half-updated.
#[derive(Debug, thiserror::Error)]
pub enum TimesheetError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl TimesheetError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
