//! Store Error Types
//!
//! This module defines error types for record store operations: backend
//! failures, decoding failures, and the two conditions the store layer itself
//! detects (stalled pagination and exhausted batch retries).

use std::path::PathBuf;
use thiserror::Error;

/// Record store errors
///
/// Transport and backend errors are surfaced unchanged to the repository,
/// which lets them propagate to its caller.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    /// Failed to create parent directory
    #[error("Failed to create parent directory for store: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    /// libsql operation error
    #[error("Database operation failed: {0}")]
    LibsqlError(#[from] libsql::Error),

    /// Backend rejected or failed an operation
    #[error("Store operation failed: {context}")]
    Backend { context: String },

    /// A stored row could not be turned back into a record
    #[error("Failed to decode record: {0}")]
    Decode(String),

    /// The store handed back the same continuation key twice
    #[error("Pagination stalled: store returned continuation key {key} twice")]
    PaginationStalled { key: String },

    /// Store constructed with settings it cannot serve queries under
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    /// Batch delete retries were exhausted with items still pending
    #[error("Batch delete gave up with {remaining} unprocessed item(s)")]
    UnprocessedItems { remaining: usize },
}

impl StoreError {
    /// Create a connection failed error
    pub fn connection_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    /// Create a backend error with context
    pub fn backend(context: impl Into<String>) -> Self {
        Self::Backend {
            context: context.into(),
        }
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a stalled pagination error
    pub fn pagination_stalled(key: impl Into<String>) -> Self {
        Self::PaginationStalled { key: key.into() }
    }

    /// Create an unprocessed items error
    pub fn unprocessed_items(remaining: usize) -> Self {
        Self::UnprocessedItems { remaining }
    }
}
