use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use mathforge_core::{HistoryEntry, MathError};

// ---------------------------------------------------------------------------
// Request parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct QuizQuery {
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub difficulty: Option<String>,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HistoryPage {
    pub total_queries: usize,
    pub capacity: usize,
    pub history: Vec<HistoryEntry>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct Cleared {
    pub message: String,
    pub cleared: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ApiError {
    Math(MathError),
    UnknownRoute(String),
    MethodNotAllowed { method: String, path: String },
}

impl From<MathError> for ApiError {
    fn from(err: MathError) -> Self {
        Self::Math(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Math(MathError::out_of_domain("body", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Math(MathError::out_of_domain("query", rejection.body_text()))
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::Math(err @ MathError::Validation { .. }) => {
                (StatusCode::BAD_REQUEST, "Invalid input", err.to_string())
            }
            Self::Math(err @ MathError::NotFound(_)) => {
                (StatusCode::BAD_REQUEST, "Invalid answer_id", err.to_string())
            }
            Self::Math(MathError::Serialization(_) | MathError::Internal(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "the computation failed unexpectedly".to_string(),
            ),
            Self::UnknownRoute(path) => (
                StatusCode::NOT_FOUND,
                "Not found",
                format!("no endpoint at {path}"),
            ),
            Self::MethodNotAllowed { method, path } => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed",
                format!("{method} is not supported on {path}"),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, label, message) = self.parts();
        match &self {
            Self::Math(err) if !err.is_client_error() => error!("request failed: {err}"),
            _ => warn!(status = status.as_u16(), "rejected request: {message}"),
        }
        let body = ErrorBody {
            error: label.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let (status, label, message) = ApiError::from(MathError::out_of_domain("b", "division by zero")).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(label, "Invalid input");
        assert_eq!(message, "invalid b: division by zero");

        let (status, label, _) = ApiError::from(MathError::NotFound("x".into())).parts();
        assert_eq!((status, label), (StatusCode::BAD_REQUEST, "Invalid answer_id"));

        let (status, _, _) = ApiError::UnknownRoute("/nope".into()).parts();
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, label, message) = ApiError::MethodNotAllowed {
            method: "PUT".into(),
            path: "/api/statistics".into(),
        }
        .parts();
        assert_eq!((status, label), (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"));
        assert_eq!(message, "PUT is not supported on /api/statistics");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let (status, label, message) =
            ApiError::from(MathError::Internal("stack overflow at 0xdeadbeef".into())).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(label, "Internal server error");
        assert!(!message.contains("deadbeef"));
    }
}
