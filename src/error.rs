use axum::http::StatusCode;
use thiserror::Error;
use tracing::error;

use crate::store::UniqueViolation;

/// Failures surfaced by the user and article services.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request payload is incomplete or invalid.
    #[error("{0}")]
    MalformedRequest(String),
    /// Supplied credentials did not verify.
    #[error("Invalid credentials")]
    Unauthenticated,
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(anyhow::Error),
}

/// Store errors are internal unless the adapter flagged a unique-constraint
/// collision, which the caller sees as a conflict.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<UniqueViolation>() {
            Some(v) => Self::Conflict(v.to_string()),
            None => Self::Internal(err),
        }
    }
}

impl AppError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for (StatusCode, String) {
    fn from(err: AppError) -> Self {
        let status = err.status();
        match err {
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                (status, "Internal server error".into())
            }
            other => (status, other.to_string()),
        }
    }
}
