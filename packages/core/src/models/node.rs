//! Node Data Structures
//!
//! This module defines the logical `Node` a client manages directly, and the
//! validation errors raised for malformed input.
//!
//! # Architecture
//!
//! - **Logical node**: `{id, parentId?, name}`. `parent_id` is the only link a
//!   client manages; everything else in the index is derived from it.
//! - **Physical records**: see [`crate::models::HierarchyRecord`]. One logical
//!   node fans out into `1 + depth` records.
//!
//! # Examples
//!
//! ```rust
//! use hierarchy_core::models::Node;
//!
//! let root = Node::new("A", "Item A");
//! let child = Node::new("B", "Item B").with_parent("A");
//!
//! assert!(root.is_root());
//! assert_eq!(child.parent_id.as_deref(), Some("A"));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for hierarchy input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid depth range: minimum {min} is greater than maximum {max}")]
    InvalidDepthRange { min: u32, max: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A node in the tree, as the client sees it.
///
/// # Fields
///
/// - `id`: Unique identifier, supplied by the caller (never allocated here)
/// - `parent_id`: Direct parent, `None` for a root
/// - `name`: Display name, replicated onto every record of this node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier
    pub id: String,

    /// Direct parent node ID (None means this node is a root)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Node name
    pub name: String,
}

impl Node {
    /// Create a root node
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            name: name.into(),
        }
    }

    /// Set the parent of this node
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Whether this node has no parent
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Validate the node before it is written.
    ///
    /// Only the id is checked: it must be non-empty. An empty `parent_id` is
    /// treated as a missing field as well, since it could never match a
    /// self-record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }

        if matches!(self.parent_id.as_deref(), Some("")) {
            return Err(ValidationError::MissingField("parentId".to_string()));
        }

        Ok(())
    }
}
