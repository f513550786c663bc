//! MemoryStore - In-Process RecordStore
//!
//! Keeps records in a `BTreeMap` keyed by primary key and mirrors the ancestor
//! index in a `BTreeSet`, so both kinds of range query walk keys in the same
//! order a real store returns them. An optional page size forces callers
//! through the continuation-key path.
//!
//! # Examples
//!
//! ```rust
//! use hierarchy_core::config::MemoryStoreConfig;
//! use hierarchy_core::db::MemoryStore;
//!
//! // Every query page holds at most two records
//! let store = MemoryStore::with_config(MemoryStoreConfig::with_page_size(2)).unwrap();
//! assert_eq!(store.config().page_size, Some(2));
//!
//! // An empty page would end every query early
//! assert!(MemoryStore::with_config(MemoryStoreConfig::with_page_size(0)).is_err());
//! ```

use crate::config::MemoryStoreConfig;
use crate::db::error::StoreError;
use crate::db::query::{Partition, QueryPage, RangeQuery, StartKey};
use crate::db::record_store::{BatchDeleteOutcome, RecordStore};
use crate::models::{HierarchyRecord, IndexKey, RecordKey};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    records: BTreeMap<RecordKey, HierarchyRecord>,
    index: BTreeSet<IndexKey>,
}

impl Tables {
    fn insert(&mut self, record: HierarchyRecord) {
        if let Some(previous) = self.records.get(&record.key()) {
            self.index.remove(&previous.index_key());
        }
        self.index.insert(record.index_key());
        self.records.insert(record.key(), record);
    }

    fn remove(&mut self, key: &RecordKey) {
        if let Some(previous) = self.records.remove(key) {
            self.index.remove(&previous.index_key());
        }
    }

    fn primary_range(
        &self,
        id: &str,
        query: &RangeQuery,
        start: Option<&StartKey>,
    ) -> Vec<HierarchyRecord> {
        let lower = match start {
            Some(key) => Bound::Excluded(key.record_key()),
            None => Bound::Included(RecordKey::new(id, query.depths.min)),
        };

        self.records
            .range((lower, Bound::Unbounded))
            .take_while(|(key, _)| key.id == id && key.relative_depth <= query.depths.max)
            .map(|(_, record)| record.clone())
            .collect()
    }

    fn index_range(
        &self,
        ancestor_id: &str,
        query: &RangeQuery,
        start: Option<&StartKey>,
    ) -> Vec<HierarchyRecord> {
        let lower = match start {
            Some(key) => Bound::Excluded(key.index_key()),
            None => Bound::Included(IndexKey::new(ancestor_id, query.depths.min, "")),
        };

        self.index
            .range((lower, Bound::Unbounded))
            .take_while(|key| {
                key.ancestor_id == ancestor_id && key.relative_depth <= query.depths.max
            })
            .filter_map(|key| {
                self.records
                    .get(&RecordKey::new(key.id.clone(), key.relative_depth))
                    .cloned()
            })
            .collect()
    }
}

/// In-memory record store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    config: MemoryStoreConfig,
}

impl MemoryStore {
    /// Create a store that returns every match in a single page
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with explicit paging and batch limits
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidConfig` for a zero page size or batch
    /// limit; a zero-record page would end every query after one empty page.
    pub fn with_config(config: MemoryStoreConfig) -> Result<Self, StoreError> {
        config.validate().map_err(StoreError::invalid_config)?;
        Ok(Self {
            tables: RwLock::new(Tables::default()),
            config,
        })
    }

    pub fn config(&self) -> &MemoryStoreConfig {
        &self.config
    }

    /// Every stored record in primary key order
    pub async fn scan(&self) -> Vec<HierarchyRecord> {
        self.tables.read().await.records.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tables.read().await.records.is_empty()
    }

    pub async fn clear(&self) {
        let mut tables = self.tables.write().await;
        tables.records.clear();
        tables.index.clear();
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, key: &RecordKey) -> Result<Option<HierarchyRecord>, StoreError> {
        Ok(self.tables.read().await.records.get(key).cloned())
    }

    async fn put(&self, record: HierarchyRecord) -> Result<(), StoreError> {
        self.tables.write().await.insert(record);
        Ok(())
    }

    async fn delete(&self, key: &RecordKey) -> Result<(), StoreError> {
        self.tables.write().await.remove(key);
        Ok(())
    }

    async fn query(
        &self,
        query: &RangeQuery,
        exclusive_start_key: Option<&StartKey>,
    ) -> Result<QueryPage, StoreError> {
        let tables = self.tables.read().await;
        let mut records = match &query.partition {
            Partition::Primary(id) => tables.primary_range(id, query, exclusive_start_key),
            Partition::Ancestor(ancestor_id) => {
                tables.index_range(ancestor_id, query, exclusive_start_key)
            }
        };

        let page_size = match self.config.page_size {
            Some(size) => size,
            None => return Ok(QueryPage::last(records)),
        };

        if records.len() < page_size {
            return Ok(QueryPage::last(records));
        }

        // A full page always carries a key, even if nothing follows it
        records.truncate(page_size);
        let last_evaluated_key = records.last().map(StartKey::from);
        Ok(QueryPage {
            records,
            last_evaluated_key,
        })
    }

    async fn batch_delete(&self, keys: Vec<RecordKey>) -> Result<BatchDeleteOutcome, StoreError> {
        if keys.len() > self.config.max_batch_size {
            return Err(StoreError::backend(format!(
                "batch of {} keys exceeds the limit of {}",
                keys.len(),
                self.config.max_batch_size
            )));
        }

        let mut tables = self.tables.write().await;
        for key in &keys {
            tables.remove(key);
        }
        Ok(BatchDeleteOutcome::complete())
    }

    fn max_batch_size(&self) -> usize {
        self.config.max_batch_size
    }
}
