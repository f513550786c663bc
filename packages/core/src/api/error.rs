//! Handler Error Types
//!
//! `ApiError` is what a request handler hands back to its transport: an HTTP
//! status code, a machine-readable code and a user-facing message.

use crate::models::ValidationError;
use crate::services::HierarchyError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned by request handlers
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status code
    pub status_code: u16,
    /// Machine-readable error code
    pub code: String,
    /// User-facing error message
    pub message: String,
}

impl ApiError {
    pub fn new(status_code: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            code: code.into(),
            message: message.into(),
        }
    }

    /// 400 with code `INVALID_INPUT`
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, "INVALID_INPUT", message)
    }

    /// 404 with code `RESOURCE_NOT_FOUND`
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, "RESOURCE_NOT_FOUND", message)
    }

    /// 409 with code `CIRCULAR_REFERENCE`
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(409, "CIRCULAR_REFERENCE", message)
    }

    /// 500 with code `STORE_ERROR`
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, "STORE_ERROR", message)
    }

    pub fn missing_body() -> Self {
        Self::bad_request("Missing request body.")
    }

    pub fn missing_path_id() -> Self {
        Self::not_found("Missing required id in path.")
    }

    pub fn missing_id_parameter() -> Self {
        Self::not_found("Missing required id path parameter.")
    }

    pub fn path_not_found() -> Self {
        Self::not_found("Path not found.")
    }

    pub fn node_not_found() -> Self {
        Self::not_found("Unable to locate node.")
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::new(400, "VALIDATION_ERROR", err.to_string())
    }
}

impl From<HierarchyError> for ApiError {
    fn from(err: HierarchyError) -> Self {
        match err {
            HierarchyError::Validation(e) => e.into(),
            HierarchyError::CircularReference { .. } => Self::conflict(err.to_string()),
            HierarchyError::Store(e) => Self::internal(e.to_string()),
        }
    }
}
