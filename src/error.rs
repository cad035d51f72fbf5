//! Error types returned at the service boundary.

use sea_orm::DbErr;

/// Errors surfaced to callers of the task and tag services.
///
/// `NotFound` covers both missing records and records owned by someone else.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<DbErr> for TaskError {
    fn from(err: DbErr) -> Self {
        TaskError::Storage(err.into())
    }
}

impl TaskError {
    pub fn task_not_found() -> Self {
        TaskError::NotFound("Task".to_string())
    }

    pub fn tag_not_found() -> Self {
        TaskError::NotFound("Tag".to_string())
    }

    /// Whether the caller can act on this error (as opposed to an infrastructure failure).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TaskError::Storage(_))
    }
}

pub type TaskResult<T> = Result<T, TaskError>;
