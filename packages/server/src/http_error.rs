//! HTTP error handling for the dev server
//!
//! Renders handler errors as `{ message, code }` JSON with the handler's
//! status code. Server errors carry the underlying failure in `details`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use hierarchy_core::ApiError;
use serde::{Deserialize, Serialize};

/// HTTP error response body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip)]
    status_code: u16,
}

impl HttpError {
    /// Create a new HTTP error answered with 500
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
            status_code: 500,
        }
    }

    /// Create an error with debugging detail, answered with 500
    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(message, code)
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(
                "{} ({}): {}",
                status,
                self.code,
                self.details.as_deref().unwrap_or(&self.message)
            );
        }
        (status, Json(self)).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        if err.status_code >= 500 {
            HttpError::with_details("Store operation failed.", err.code, err.message)
                .with_status(err.status_code)
        } else {
            HttpError::new(err.message, err.code).with_status(err.status_code)
        }
    }
}
