use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::models::approval::Decision;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing {0} parameter")]
    MissingParameter(&'static str),

    #[error("endpoint not found")]
    RouteNotFound,

    #[error("failed to process {decision}: {source}")]
    Persistence {
        decision: Decision,
        #[source]
        source: std::io::Error,
    },

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            AppError::MissingParameter(name) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "missing_parameter",
                format!("Missing {} parameter", name),
            ),
            AppError::RouteNotFound => (
                StatusCode::NOT_FOUND,
                "invalid_request_error",
                "not_found",
                "Endpoint not found".to_string(),
            ),
            AppError::Persistence { decision, source } => {
                tracing::error!("Failed to create {} file: {}", decision, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "persistence_failure",
                    format!("Failed to process {}", decision),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Error handling request: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    format!("Internal server error: {:#}", e),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::MissingParameter("token").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::RouteNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        let err = AppError::Persistence {
            decision: Decision::Rejected,
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_persistence_message_names_decision() {
        let err = AppError::Persistence {
            decision: Decision::Approved,
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(err.to_string(), "failed to process approved: disk full");
    }
}
