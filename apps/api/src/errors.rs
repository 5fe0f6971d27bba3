use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Failure inside a function handler, reported with the handler's own code
    /// and the caught message.
    #[error("{code}: {message}")]
    Handler { code: &'static str, message: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Re-labels downstream failures with a function handler's error code.
    /// Auth and validation failures keep their own status and code.
    pub fn in_handler(self, code: &'static str) -> Self {
        match self {
            AppError::Store(e) => AppError::Handler {
                code,
                message: e.to_string(),
            },
            AppError::Upstream(message) => AppError::Handler { code, message },
            AppError::Internal(e) => AppError::Handler {
                code,
                message: e.to_string(),
            },
            other => other,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "A data store error occurred".to_string(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_ERROR",
                    msg.clone(),
                )
            }
            AppError::Handler { code, message } => {
                tracing::error!("{code}: {message}");
                (StatusCode::INTERNAL_SERVER_ERROR, *code, message.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_handler_relabels_upstream() {
        let err = AppError::Upstream("Failed to fetch user profile".to_string())
            .in_handler("RECOMMENDATION_FAILED");
        match err {
            AppError::Handler { code, message } => {
                assert_eq!(code, "RECOMMENDATION_FAILED");
                assert_eq!(message, "Failed to fetch user profile");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_in_handler_keeps_unauthorized() {
        let err = AppError::Unauthorized("Invalid token".to_string()).in_handler("X");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Handler {
                code: "MENTOR_FOLLOW_ERROR",
                message: "boom".into()
            }
            .into_response()
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
