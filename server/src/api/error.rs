//! Mapping of flow outcomes to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::flows::AuthError;

/// An error response in one of the wire shapes clients expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 400 `{statusCode, error, message}`.
    BadRequest(String),
    /// 400 `{status: "Invalid password"}`.
    InvalidPassword,
    /// 401 `{statusCode, error, message}`.
    Unauthorized(String),
    /// 404 `{statusCode, error, message}`.
    NotFound(String),
    /// 500 with a fixed message; the cause is logged, never sent.
    Internal,
}

impl ApiError {
    #[must_use]
    pub fn missing_property(field: &str) -> Self {
        Self::BadRequest(format!("body should have required property '{field}'"))
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::UsernameTaken | AuthError::EmptyField(_) => Self::BadRequest(e.to_string()),
            AuthError::InvalidPassword => Self::InvalidPassword,
            AuthError::InvalidToken => Self::Unauthorized(e.to_string()),
            AuthError::Fatal(fatal) => {
                tracing::error!("request failed: {fatal}");
                Self::Internal
            }
        }
    }
}

fn standard_body(status: StatusCode, message: &str) -> Json<serde_json::Value> {
    Json(json!({
        "statusCode": status.as_u16(),
        "error": status.canonical_reason().unwrap_or_default(),
        "message": message,
    }))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => {
                let status = StatusCode::BAD_REQUEST;
                (status, standard_body(status, &message)).into_response()
            }
            Self::InvalidPassword => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "Invalid password" })),
            )
                .into_response(),
            Self::Unauthorized(message) => {
                let status = StatusCode::UNAUTHORIZED;
                (status, standard_body(status, &message)).into_response()
            }
            Self::NotFound(message) => {
                let status = StatusCode::NOT_FOUND;
                (status, standard_body(status, &message)).into_response()
            }
            Self::Internal => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                (status, standard_body(status, "Internal Server Error")).into_response()
            }
        }
    }
}
