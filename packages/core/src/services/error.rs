//! Service Layer Error Types
//!
//! This module defines the error type returned by hierarchy repository
//! operations.

use crate::db::StoreError;
use crate::models::ValidationError;
use thiserror::Error;

/// Hierarchy repository errors
///
/// Store errors are passed through unchanged. A failed store call aborts the
/// cascade in progress; writes already applied stay, and re-running the
/// operation converges.
#[derive(Error, Debug)]
pub enum HierarchyError {
    /// Store operation failed
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    /// Input failed validation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Move would place a node under itself or one of its descendants
    #[error("Circular reference: cannot move {node_id} under {new_parent_id}")]
    CircularReference {
        node_id: String,
        new_parent_id: String,
    },
}

impl HierarchyError {
    /// Create a circular reference error
    pub fn circular_reference(node_id: impl Into<String>, new_parent_id: impl Into<String>) -> Self {
        Self::CircularReference {
            node_id: node_id.into(),
            new_parent_id: new_parent_id.into(),
        }
    }
}
