//! Data Models
//!
//! This module contains the data structures of the hierarchy index:
//!
//! - `Node` - The logical node a client creates, renames and moves
//! - `HierarchyRecord` - One stored (descendant, ancestor) pair
//! - `RecordKey` / `IndexKey` - Primary and secondary-index keys of a record
//! - `DepthRange` - Inclusive relative-depth bounds for range queries

mod node;
mod record;

pub use node::{Node, ValidationError};
pub use record::{
    compare_records, sort_records, DepthRange, HierarchyRecord, IndexKey, RecordKey,
};
