//! Physical Records and Key Scheme
//!
//! Every logical node is stored as one record per ancestor it has, itself
//! included. The store holds these records under two keys:
//!
//! - **Primary key** `(id, relativeDepth)`: all records of one descendant,
//!   ordered from the node itself (depth 0) up to its root.
//! - **Secondary index** `(ancestorId, relativeDepth)`: all descendants of one
//!   ancestor, ordered from the ancestor itself (depth 0) down the subtree.
//!
//! A record's `name` and `parent_id` are copies of the descendant's self-record
//! and are rewritten together whenever the descendant changes.

use crate::models::{Node, ValidationError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Primary key of a record: descendant id plus hop count from the ancestor
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordKey {
    pub id: String,
    pub relative_depth: u32,
}

impl RecordKey {
    pub fn new(id: impl Into<String>, relative_depth: u32) -> Self {
        Self {
            id: id.into(),
            relative_depth,
        }
    }

    /// Key of the self-record of `id` (depth 0)
    pub fn self_key(id: impl Into<String>) -> Self {
        Self::new(id, 0)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.id, self.relative_depth)
    }
}

/// Secondary index key: ancestor id, hop count, then descendant id.
///
/// `(ancestor_id, relative_depth)` alone is not unique (siblings share it), so
/// the descendant id is the final ordering component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexKey {
    pub ancestor_id: String,
    pub relative_depth: u32,
    pub id: String,
}

impl IndexKey {
    pub fn new(ancestor_id: impl Into<String>, relative_depth: u32, id: impl Into<String>) -> Self {
        Self {
            ancestor_id: ancestor_id.into(),
            relative_depth,
            id: id.into(),
        }
    }
}

/// One (descendant, ancestor) pair as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyRecord {
    /// Descendant node id (primary partition key)
    pub id: String,

    /// Hops from `ancestor_id` down to `id` (primary and index sort key)
    pub relative_depth: u32,

    /// Ancestor node id (index partition key)
    pub ancestor_id: String,

    /// Descendant's current name
    pub name: String,

    /// Descendant's current direct parent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl HierarchyRecord {
    /// The depth-0 record of `node`, where the node is its own ancestor
    pub fn self_record(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            relative_depth: 0,
            ancestor_id: node.id.clone(),
            name: node.name.clone(),
            parent_id: node.parent_id.clone(),
        }
    }

    /// Copy of this record placed under `ancestor_id` at `relative_depth`.
    ///
    /// Descendant id, name and parent are kept; only the key moves.
    pub fn rebased(&self, ancestor_id: impl Into<String>, relative_depth: u32) -> Self {
        Self {
            id: self.id.clone(),
            relative_depth,
            ancestor_id: ancestor_id.into(),
            name: self.name.clone(),
            parent_id: self.parent_id.clone(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_parent_id(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.id.clone(), self.relative_depth)
    }

    pub fn index_key(&self) -> IndexKey {
        IndexKey::new(self.ancestor_id.clone(), self.relative_depth, self.id.clone())
    }

    pub fn is_self_record(&self) -> bool {
        self.relative_depth == 0 && self.id == self.ancestor_id
    }
}

impl From<HierarchyRecord> for Node {
    fn from(record: HierarchyRecord) -> Self {
        Node {
            id: record.id,
            parent_id: record.parent_id,
            name: record.name,
        }
    }
}

/// Listing order: relative depth ascending, then name (ordinal, case-sensitive).
pub fn compare_records(a: &HierarchyRecord, b: &HierarchyRecord) -> Ordering {
    a.relative_depth
        .cmp(&b.relative_depth)
        .then_with(|| a.name.cmp(&b.name))
}

/// Sort records into listing order. Stable, so equal entries keep store order.
pub fn sort_records(records: &mut [HierarchyRecord]) {
    records.sort_by(compare_records);
}

/// Inclusive range over `relative_depth`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthRange {
    pub min: u32,
    pub max: u32,
}

impl DepthRange {
    /// Build a range, rejecting `min > max`
    pub fn new(min: u32, max: u32) -> Result<Self, ValidationError> {
        if min > max {
            return Err(ValidationError::InvalidDepthRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Build a range from optional bounds (missing min is 0, missing max is unbounded)
    pub fn from_bounds(min: Option<u32>, max: Option<u32>) -> Result<Self, ValidationError> {
        Self::new(min.unwrap_or(0), max.unwrap_or(u32::MAX))
    }

    /// Every depth, the node itself included
    pub const fn all() -> Self {
        Self {
            min: 0,
            max: u32::MAX,
        }
    }

    /// Exactly one depth
    pub const fn exact(depth: u32) -> Self {
        Self {
            min: depth,
            max: depth,
        }
    }

    /// Every depth from `min` upward
    pub const fn at_least(min: u32) -> Self {
        Self { min, max: u32::MAX }
    }

    pub fn contains(&self, depth: u32) -> bool {
        self.min <= depth && depth <= self.max
    }
}

impl Default for DepthRange {
    fn default() -> Self {
        Self::all()
    }
}
