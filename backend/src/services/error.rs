use thiserror::Error;

use crate::db::repository::RepositoryError;

/// Failures raised by the reservation workflow and the catalog.
///
/// `NotFound` and `BadRequest` carry the fixed human-readable message that
/// is sent back to the client unchanged.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
