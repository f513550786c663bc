//! Shared fixtures for integration tests
//!
//! Creates a hierarchy with this structure:
//!
//! ```text
//! -A
//!  |-B
//!  | |-D
//!  | | |-G
//!  | |   |-I
//!  | |-E
//!  |-C
//!    |-F
//!      |-H
//! ```

#![allow(dead_code)]

use anyhow::Result;
use hierarchy_core::models::{HierarchyRecord, Node};
use hierarchy_core::services::HierarchyRepository;

pub const TREE: &[(&str, Option<&str>)] = &[
    ("A", None),
    ("B", Some("A")),
    ("C", Some("A")),
    ("D", Some("B")),
    ("E", Some("B")),
    ("F", Some("C")),
    ("G", Some("D")),
    ("H", Some("F")),
    ("I", Some("G")),
];

pub fn parent_of(id: &str) -> Option<&'static str> {
    TREE.iter()
        .find(|(node_id, _)| *node_id == id)
        .and_then(|(_, parent)| *parent)
}

/// The seeded node `id`
pub fn node(id: &str) -> Node {
    let node = Node::new(id, format!("Item {}", id));
    match parent_of(id) {
        Some(parent) => node.with_parent(parent),
        None => node,
    }
}

/// The record of seeded node `id` under `ancestor_id`
pub fn record(id: &str, ancestor_id: &str, relative_depth: u32) -> HierarchyRecord {
    HierarchyRecord::self_record(&node(id)).rebased(ancestor_id, relative_depth)
}

/// Same as [`record`] with the descendant's parent overridden
pub fn moved_record(
    id: &str,
    parent_id: &str,
    ancestor_id: &str,
    relative_depth: u32,
) -> HierarchyRecord {
    record(id, ancestor_id, relative_depth).with_parent_id(Some(parent_id.to_string()))
}

pub async fn seed_test_data(repository: &HierarchyRepository) -> Result<()> {
    for (id, _) in TREE {
        repository.save(node(id)).await?;
    }
    Ok(())
}
