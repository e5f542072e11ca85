//! API error taxonomy.
//!
//! Maps domain failures to HTTP statuses. Storage failures are logged
//! server-side and surfaced to clients as a generic message only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or out-of-range input.
    #[error("{0}")]
    Validation(String),

    /// Missing user/post.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Duplicate email/handle, or a one-time step repeated.
    #[error("{0}")]
    Conflict(String),

    /// Missing or invalid session.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not permitted (e.g., profile setup incomplete).
    #[error("{0}")]
    Forbidden(String),

    /// External database failure; detail goes to the server log only.
    #[error("storage error: {0}")]
    Storage(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err)
    }
}

impl From<StatusCode> for ApiError {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            _ => Self::Storage(anyhow::anyhow!("unexpected status: {status}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            Self::Conflict(message) => (StatusCode::CONFLICT, message),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            Self::Storage(err) => {
                error!("Storage error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            status_of(ApiError::Validation("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ApiError::NotFound("User")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ApiError::Conflict("taken".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(ApiError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(ApiError::Forbidden("no".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ApiError::Storage(anyhow::anyhow!("db down"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unauthorized_status_converts() {
        assert!(matches!(
            ApiError::from(StatusCode::UNAUTHORIZED),
            ApiError::Unauthorized
        ));
    }
}
