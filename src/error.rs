//! Central error type shared by every handler.
//!
//! The taxonomy maps one-to-one onto response statuses: callers never retry,
//! every error is terminal for its request.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::api::ErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("admin access required")]
    Forbidden,

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("database connection failed: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            // Conflicts ride the 400 with bad input; the wire contract does
            // not distinguish them.
            ApiError::Conflict(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Pool(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message surfaced to the client. Storage-level detail stays in the logs.
    fn public_message(&self) -> String {
        match self {
            ApiError::Database(_) | ApiError::Pool(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        assert_eq!(ApiError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("recipe").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Validation("password too short".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn conflicts_surface_as_bad_request() {
        assert_eq!(
            ApiError::Conflict("recipe already exists").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("recipe not favorited").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn storage_errors_are_not_leaked() {
        let err = ApiError::Database(diesel::result::Error::BrokenTransactionManager);
        assert_eq!(err.public_message(), "internal server error");
    }
}
