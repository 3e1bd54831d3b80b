//! API error handling for consistent JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::CaptureError;

/// API error type that converts to JSON responses.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": true,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<CaptureError> for ApiError {
    fn from(err: CaptureError) -> Self {
        let status = match &err {
            CaptureError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            CaptureError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            CaptureError::DeviceUnavailable { .. }
            | CaptureError::TranscriptionUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            CaptureError::RecorderFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionId;

    #[test]
    fn test_capture_error_status_mapping() {
        let err: ApiError = CaptureError::SessionNotFound(SessionId::new("x")).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: ApiError = CaptureError::PermissionDenied { device: "screen" }.into();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let err: ApiError = CaptureError::DeviceUnavailable { device: "screen" }.into();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
