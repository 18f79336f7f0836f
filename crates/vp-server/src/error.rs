//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`vp_core::Error`] so that route handlers
//! can return `Result<T, AppError>` directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
pub struct AppError {
    inner: vp_core::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: vp_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }
}

impl From<vp_core::Error> for AppError {
    fn from(e: vp_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                request_id = self.request_id.as_deref().unwrap_or("-"),
                failed_job = self.inner.job_kind().map(|k| k.as_str()).unwrap_or("-"),
                "Server error in API handler"
            );
        }

        let code = match &self.inner {
            vp_core::Error::Validation(_) => "validation_error",
            vp_core::Error::TooLarge(_) => "payload_too_large",
            vp_core::Error::Persistence(_) => "persistence_error",
            vp_core::Error::Io { .. } => "io_error",
            vp_core::Error::Tool { .. } => "tool_error",
            vp_core::Error::Encode { .. } => "encode_error",
            vp_core::Error::Config(_) => "config_error",
            vp_core::Error::Internal(_) => "internal_error",
        };

        // Encode and persistence details stay in the log.
        let message = match &self.inner {
            vp_core::Error::Encode { .. } => "Failed to transcode video".to_string(),
            vp_core::Error::Persistence(_) => "Failed to save video".to_string(),
            vp_core::Error::TooLarge(_) => "Video exceeds the upload size limit".to_string(),
            vp_core::Error::Validation(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = json!({
            "error": message,
            "code": code,
            "request_id": self.request_id,
        });

        (status, axum::Json(body)).into_response()
    }
}
