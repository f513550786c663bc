//! RecordStore Trait - Store Abstraction Layer
//!
//! This module defines the `RecordStore` trait: the only surface the hierarchy
//! repository uses to reach storage. It deliberately mirrors a two-key,
//! secondary-indexed key-value store:
//!
//! - point get / put (overwrite) / delete by primary key
//! - paginated range query over the primary key or the ancestor index
//! - bounded batch delete that may hand back unprocessed keys
//!
//! There is no transaction and no traversal primitive. Everything the
//! repository derives, it derives from these calls.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hierarchy_core::db::{MemoryStore, RecordStore};
//! use hierarchy_core::models::{HierarchyRecord, Node, RecordKey};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
//!
//!     let node = Node::new("A", "Item A");
//!     store.put(HierarchyRecord::self_record(&node)).await?;
//!
//!     let fetched = store.get(&RecordKey::self_key("A")).await?;
//!     assert!(fetched.is_some());
//!     Ok(())
//! }
//! ```

use crate::db::error::StoreError;
use crate::db::query::{QueryPage, RangeQuery, StartKey};
use crate::models::{HierarchyRecord, RecordKey};
use async_trait::async_trait;

/// Largest batch a store accepts in one batch call unless it says otherwise
pub const DEFAULT_MAX_BATCH_SIZE: usize = 25;

/// Result of one batch delete call
///
/// `unprocessed` holds the keys the store did not get to. Every other key of
/// the submitted batch is confirmed deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchDeleteOutcome {
    pub unprocessed: Vec<RecordKey>,
}

impl BatchDeleteOutcome {
    pub fn complete() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.unprocessed.is_empty()
    }
}

/// Abstraction over the key-value store holding hierarchy records
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the repository shares one store
/// across concurrently dispatched writes.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Get a record by primary key
    ///
    /// - `Ok(Some(record))` if it exists
    /// - `Ok(None)` if it does not (not an error)
    async fn get(&self, key: &RecordKey) -> Result<Option<HierarchyRecord>, StoreError>;

    /// Write a record, replacing any record with the same primary key
    async fn put(&self, record: HierarchyRecord) -> Result<(), StoreError>;

    /// Delete a record by primary key. Deleting a missing key succeeds.
    async fn delete(&self, key: &RecordKey) -> Result<(), StoreError>;

    /// Fetch one page of a range query
    ///
    /// Records come back in key order: `relative_depth` for primary queries,
    /// `(relative_depth, id)` for index queries. When the page was cut short,
    /// `last_evaluated_key` is set and the next page starts strictly after it.
    /// A page may be empty even when a key is returned.
    async fn query(
        &self,
        query: &RangeQuery,
        exclusive_start_key: Option<&StartKey>,
    ) -> Result<QueryPage, StoreError>;

    /// Delete up to [`RecordStore::max_batch_size`] keys in one call
    ///
    /// Keys the store could not process are returned in the outcome and must
    /// be resubmitted by the caller.
    async fn batch_delete(&self, keys: Vec<RecordKey>) -> Result<BatchDeleteOutcome, StoreError>;

    /// Upper bound on the number of keys accepted by one `batch_delete` call
    fn max_batch_size(&self) -> usize {
        DEFAULT_MAX_BATCH_SIZE
    }
}
