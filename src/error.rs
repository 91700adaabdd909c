use axum::http::StatusCode;
use thiserror::Error;

/// Operation-level error taxonomy.
///
/// `Validation` carries a user-facing message and always maps to 400.
/// `NotFound` covers both missing rows and rows the caller does not own —
/// the two are indistinguishable on the wire on purpose. `Database` and
/// `Internal` render as a generic message; the underlying cause is only
/// ever written to the server log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("An unexpected error occurred")]
    Database(#[from] sqlx::Error),
    #[error("An unexpected error occurred")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log server faults; validation and not-found outcomes are expected
    /// traffic and stay out of the error log.
    pub fn log(&self) {
        match self {
            Self::Database(e) => tracing::error!("database error: {e}"),
            Self::Internal(e) => tracing::error!("internal error: {e}"),
            _ => {}
        }
    }
}
