//! Hierarchy Repository
//!
//! Maintains the materialized ancestor/descendant index. Each operation is a
//! bounded sequence of range queries followed by point writes and deletes:
//!
//! - **save** writes the self-record plus one record per ancestor of the parent
//! - **update_name** rewrites every record of one node
//! - **update_parent** re-roots a subtree: records inside the subtree stay,
//!   records linking it to its old ancestors are replaced by records linking
//!   it to the new ones
//! - **delete** removes one node's own records and nothing else
//!
//! There are no transactions. Every write is a full overwrite of a
//! deterministic key, so re-running an interrupted operation converges.
//! Callers serialize structural mutations per node.
//!
//! # Examples
//!
//! ```rust
//! use hierarchy_core::db::MemoryStore;
//! use hierarchy_core::models::{DepthRange, Node};
//! use hierarchy_core::services::HierarchyRepository;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = HierarchyRepository::new(Arc::new(MemoryStore::new()));
//!
//! repository.save(Node::new("A", "Item A")).await?;
//! repository.save(Node::new("B", "Item B").with_parent("A")).await?;
//!
//! let children = repository.list_direct_children("A").await?;
//! assert_eq!(children[0].id, "B");
//!
//! let chain = repository.list_all_ancestors("B", DepthRange::all()).await?;
//! assert_eq!(chain.len(), 2);
//! # Ok(())
//! # }
//! ```

use crate::config::RepositoryConfig;
use crate::db::{query_all, BatchDeleter, RangeQuery, RecordStore};
use crate::models::{sort_records, DepthRange, HierarchyRecord, Node, RecordKey, ValidationError};
use crate::services::error::HierarchyError;
use futures::{stream, StreamExt, TryStreamExt};
use std::sync::Arc;

/// Repository over the materialized hierarchy index
pub struct HierarchyRepository {
    store: Arc<dyn RecordStore>,
    config: RepositoryConfig,
}

impl HierarchyRepository {
    /// Create a repository with default configuration
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            config: RepositoryConfig::default(),
        }
    }

    /// Create a repository with explicit configuration
    ///
    /// # Errors
    ///
    /// Returns `HierarchyError::Validation` if the configuration is invalid.
    pub fn with_config(
        store: Arc<dyn RecordStore>,
        config: RepositoryConfig,
    ) -> Result<Self, HierarchyError> {
        config.validate().map_err(ValidationError::InvalidConfig)?;
        Ok(Self { store, config })
    }

    /// The record store every operation reads and writes
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Concurrency and batch settings in effect
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Insert a node, or re-write it in place
    ///
    /// Writes the self-record, then one record under each ancestor of the
    /// parent. A parent that does not exist has no ancestors, so the node is
    /// stored detached with only its self-record.
    pub async fn save(&self, node: Node) -> Result<(), HierarchyError> {
        node.validate()?;

        let own = HierarchyRecord::self_record(&node);
        self.store.put(own.clone()).await?;

        let parent_id = match &node.parent_id {
            Some(parent_id) => parent_id,
            None => {
                tracing::debug!("Saved root node '{}'", node.id);
                return Ok(());
            }
        };

        let ancestors = self
            .list_all_ancestors(parent_id, DepthRange::all())
            .await?;
        let records: Vec<HierarchyRecord> = ancestors
            .iter()
            .map(|ancestor| own.rebased(ancestor.ancestor_id.clone(), ancestor.relative_depth + 1))
            .collect();

        let written = self.put_all(records).await?;
        tracing::debug!(
            "Saved node '{}' under '{}' with {} ancestor record(s)",
            node.id,
            parent_id,
            written
        );
        Ok(())
    }

    /// Get a node by id from its self-record
    pub async fn get(&self, id: &str) -> Result<Option<Node>, HierarchyError> {
        let record = self.store.get(&RecordKey::self_key(id)).await?;
        Ok(record.map(Node::from))
    }

    /// Delete every record of `id`, returning how many were removed
    ///
    /// Records of the node's children are untouched; they keep pointing at
    /// the deleted node as an ancestor.
    pub async fn delete(&self, id: &str) -> Result<usize, HierarchyError> {
        let keys: Vec<RecordKey> = self
            .own_records(id)
            .await?
            .iter()
            .map(HierarchyRecord::key)
            .collect();

        let deleted = BatchDeleter::new(self.store.as_ref(), &self.config.batch)
            .delete_all(keys)
            .await?;

        tracing::debug!("Deleted node '{}' ({} record(s))", id, deleted);
        Ok(deleted)
    }

    /// Rename a node on every one of its records
    pub async fn update_name(&self, id: &str, name: &str) -> Result<usize, HierarchyError> {
        let records: Vec<HierarchyRecord> = self
            .own_records(id)
            .await?
            .into_iter()
            .map(|record| record.with_name(name))
            .collect();

        let updated = self.put_all(records).await?;
        tracing::debug!("Renamed node '{}' on {} record(s)", id, updated);
        Ok(updated)
    }

    /// Move `id` and its subtree under `new_parent_id`
    ///
    /// # Errors
    ///
    /// Returns `HierarchyError::CircularReference`, before anything is
    /// written, if `new_parent_id` is `id` or one of its descendants.
    pub async fn update_parent(&self, id: &str, new_parent_id: &str) -> Result<(), HierarchyError> {
        let new_parent_ancestors = self
            .list_all_ancestors(new_parent_id, DepthRange::all())
            .await?;

        if new_parent_id == id
            || new_parent_ancestors
                .iter()
                .any(|ancestor| ancestor.ancestor_id == id)
        {
            return Err(HierarchyError::circular_reference(id, new_parent_id));
        }

        // Point the node's own records at the new parent
        let own: Vec<HierarchyRecord> = self
            .own_records(id)
            .await?
            .into_iter()
            .map(|record| record.with_parent_id(Some(new_parent_id.to_string())))
            .collect();
        self.put_all(own).await?;

        // Read after the parent rewrite so the moved node carries its new parent
        let descendants = self.list_all_descendants(id, DepthRange::all()).await?;

        // Everything above the subtree root belongs to the old ancestor chain
        let concurrency = self.concurrency();
        let stale_queries: Vec<RangeQuery> = descendants
            .iter()
            .map(|descendant| {
                RangeQuery::ancestors_of(
                    descendant.id.clone(),
                    DepthRange::at_least(descendant.relative_depth.saturating_add(1)),
                )
            })
            .collect();
        let stale: Vec<Vec<HierarchyRecord>> = stream::iter(stale_queries.into_iter().map(|query| {
            async move { query_all(self.store.as_ref(), &query).await }
        }))
        .buffer_unordered(concurrency)
        .try_collect()
        .await?;

        let stale_keys: Vec<RecordKey> = stale.iter().flatten().map(HierarchyRecord::key).collect();
        let deleted = BatchDeleter::new(self.store.as_ref(), &self.config.batch)
            .delete_all(stale_keys)
            .await?;

        // Only now write the new chain: the two key ranges overlap
        let records: Vec<HierarchyRecord> = descendants
            .iter()
            .flat_map(|descendant| {
                new_parent_ancestors.iter().map(move |ancestor| {
                    descendant.rebased(
                        ancestor.ancestor_id.clone(),
                        ancestor.relative_depth + descendant.relative_depth + 1,
                    )
                })
            })
            .collect();
        let written = self.put_all(records).await?;

        tracing::debug!(
            "Moved node '{}' under '{}': {} descendant(s), {} record(s) deleted, {} written",
            id,
            new_parent_id,
            descendants.len(),
            deleted,
            written
        );
        Ok(())
    }

    /// Records of `id` under each of its ancestors, itself at depth 0 included
    ///
    /// Sorted by relative depth, then name.
    pub async fn list_all_ancestors(
        &self,
        id: &str,
        depths: DepthRange,
    ) -> Result<Vec<HierarchyRecord>, HierarchyError> {
        let mut records =
            query_all(self.store.as_ref(), &RangeQuery::ancestors_of(id, depths)).await?;
        sort_records(&mut records);
        Ok(records)
    }

    /// Records of every descendant of `id`, itself at depth 0 included
    ///
    /// Sorted by relative depth, then name.
    pub async fn list_all_descendants(
        &self,
        id: &str,
        depths: DepthRange,
    ) -> Result<Vec<HierarchyRecord>, HierarchyError> {
        let mut records =
            query_all(self.store.as_ref(), &RangeQuery::descendants_of(id, depths)).await?;
        sort_records(&mut records);
        Ok(records)
    }

    /// Records of the direct children of `id`, sorted by name
    pub async fn list_direct_children(
        &self,
        id: &str,
    ) -> Result<Vec<HierarchyRecord>, HierarchyError> {
        self.list_all_descendants(id, DepthRange::exact(1)).await
    }

    /// Every record whose primary partition is `id`, in store order
    async fn own_records(&self, id: &str) -> Result<Vec<HierarchyRecord>, HierarchyError> {
        let records =
            query_all(self.store.as_ref(), &RangeQuery::ancestors_of(id, DepthRange::all()))
                .await?;
        Ok(records)
    }

    /// Write all records concurrently; returns once every write has landed
    async fn put_all(&self, records: Vec<HierarchyRecord>) -> Result<usize, HierarchyError> {
        let count = records.len();
        stream::iter(records.into_iter().map(|record| self.store.put(record)))
            .buffer_unordered(self.concurrency())
            .try_collect::<Vec<()>>()
            .await?;
        Ok(count)
    }

    fn concurrency(&self) -> usize {
        self.config.write_concurrency.max(1)
    }
}

#[cfg(test)]
#[path = "hierarchy_repository_test.rs"]
mod hierarchy_repository_test;
