use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use drainwatch_core::error::{DrainError, ErrorKind};
use serde::Serialize;

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into(), details: None }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self { status: StatusCode::UNAUTHORIZED, message: message.into(), details: None }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into(), details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.message, details: self.details };
        (self.status, Json(body)).into_response()
    }
}

impl From<DrainError> for ApiError {
    fn from(err: DrainError) -> Self {
        let (status, message) = match err.kind() {
            ErrorKind::Validation => (StatusCode::UNPROCESSABLE_ENTITY, "Validation failed"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "Not found"),
            ErrorKind::Authorization => (StatusCode::FORBIDDEN, "Forbidden"),
            ErrorKind::Reconciliation => {
                tracing::error!(error = %err, "Reconciliation failed");
                return Self::internal("Update failed, nothing was changed");
            }
            ErrorKind::Internal => {
                tracing::error!(error = %err, "Internal error");
                return Self::internal("Internal error");
            }
        };
        Self { status, message: message.to_string(), details: Some(err.to_string()) }
    }
}
