use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DatabaseError> for ScheduleError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Conflict(msg) => ScheduleError::Conflict(msg),
            DatabaseError::NotFound(msg) => ScheduleError::NotFound(msg),
            other => ScheduleError::Database(other.to_string()),
        }
    }
}

impl From<ScheduleError> for AppError {
    fn from(error: ScheduleError) -> Self {
        match error {
            ScheduleError::Validation(msg) => AppError::ValidationError(msg),
            ScheduleError::NotFound(msg) => AppError::NotFound(msg),
            ScheduleError::Conflict(msg) => AppError::Conflict(msg),
            ScheduleError::Unauthorized(msg) => AppError::Forbidden(msg),
            ScheduleError::Database(msg) => AppError::Database(msg),
        }
    }
}
