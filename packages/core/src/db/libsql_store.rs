//! LibsqlStore - RecordStore on Embedded libsql
//!
//! Persists hierarchy records in a single SQLite table. The primary key is
//! `(id, relative_depth)`; a covering index on `(ancestor_id, relative_depth,
//! id)` serves subtree queries. Paging is keyset-based: a page resumes strictly
//! after the continuation key, never by offset.
//!
//! # Database Connection Pattern
//!
//! Every operation opens its own connection with a busy timeout, so concurrent
//! sibling writes wait on the file lock instead of failing with `SQLITE_BUSY`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hierarchy_core::db::{LibsqlStore, RecordStore};
//! use hierarchy_core::models::{HierarchyRecord, Node, RecordKey};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = LibsqlStore::new(PathBuf::from("./data/hierarchy.db")).await?;
//!     store.put(HierarchyRecord::self_record(&Node::new("A", "Item A"))).await?;
//!     assert!(store.get(&RecordKey::self_key("A")).await?.is_some());
//!     Ok(())
//! }
//! ```

use crate::db::error::StoreError;
use crate::db::query::{Partition, QueryPage, RangeQuery, StartKey};
use crate::db::record_store::{BatchDeleteOutcome, RecordStore};
use crate::models::{HierarchyRecord, RecordKey};
use anyhow::Context;
use async_trait::async_trait;
use libsql::{Builder, Connection, Database, Row};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SELECT_COLUMNS: &str = "SELECT id, relative_depth, ancestor_id, name, parent_id FROM hierarchy_records";

/// libsql-backed record store
#[derive(Debug, Clone)]
pub struct LibsqlStore {
    db: Arc<Database>,
    db_path: PathBuf,
    page_size: Option<usize>,
}

impl LibsqlStore {
    /// Open (or create) the store at `db_path`
    ///
    /// Creates the parent directory if needed, then the table and index
    /// (`CREATE ... IF NOT EXISTS`, so reopening an existing file is safe).
    ///
    /// # Errors
    ///
    /// - `DirectoryCreationFailed` if the parent directory cannot be created
    /// - `ConnectionFailed` if the database cannot be opened
    /// - `LibsqlError` if schema creation fails
    pub async fn new(db_path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| StoreError::connection_failed(db_path.clone(), e))?;

        let store = Self {
            db: Arc::new(db),
            db_path,
            page_size: None,
        };
        store.initialize_schema().await?;

        tracing::debug!("Opened libsql record store at {}", store.db_path.display());
        Ok(store)
    }

    /// Limit every query page to `page_size` rows
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidConfig` for a page size of 0.
    pub fn with_page_size(mut self, page_size: usize) -> Result<Self, StoreError> {
        if page_size == 0 {
            return Err(StoreError::invalid_config("page_size must be greater than 0"));
        }
        self.page_size = Some(page_size);
        Ok(self)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn initialize_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect().await?;

        execute_pragma(&conn, "PRAGMA journal_mode = WAL").await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS hierarchy_records (
                id TEXT NOT NULL,
                relative_depth INTEGER NOT NULL,
                ancestor_id TEXT NOT NULL,
                name TEXT NOT NULL,
                parent_id TEXT,
                PRIMARY KEY (id, relative_depth)
            )",
            (),
        )
        .await?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_hierarchy_records_ancestor
             ON hierarchy_records(ancestor_id, relative_depth, id)",
            (),
        )
        .await?;

        Ok(())
    }

    /// Connection with a 5 second busy timeout
    async fn connect(&self) -> Result<Connection, StoreError> {
        let conn = self.db.connect()?;
        execute_pragma(&conn, "PRAGMA busy_timeout = 5000").await?;
        Ok(conn)
    }

    /// SQLite treats a negative LIMIT as no limit
    fn limit(&self) -> i64 {
        self.page_size.map(|size| size as i64).unwrap_or(-1)
    }

    async fn collect_rows(mut rows: libsql::Rows) -> Result<Vec<HierarchyRecord>, StoreError> {
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            let record = row_to_record(&row).map_err(|e| StoreError::decode(format!("{:#}", e)))?;
            records.push(record);
        }
        Ok(records)
    }
}

/// PRAGMA statements return rows, so they go through `query`
async fn execute_pragma(conn: &Connection, pragma: &str) -> Result<(), StoreError> {
    conn.query(pragma, ())
        .await
        .map_err(|e| StoreError::backend(format!("Failed to execute '{}': {}", pragma, e)))?;
    Ok(())
}

/// Convert a row into a record
///
/// Expected columns (in order): id, relative_depth, ancestor_id, name, parent_id
fn row_to_record(row: &Row) -> anyhow::Result<HierarchyRecord> {
    let id: String = row.get(0).context("Failed to get id")?;
    let relative_depth: i64 = row.get(1).context("Failed to get relative_depth")?;
    let ancestor_id: String = row.get(2).context("Failed to get ancestor_id")?;
    let name: String = row.get(3).context("Failed to get name")?;
    let parent_id: Option<String> = row.get(4).context("Failed to get parent_id")?;

    let relative_depth = u32::try_from(relative_depth)
        .with_context(|| format!("relative_depth {} out of range for '{}'", relative_depth, id))?;

    Ok(HierarchyRecord {
        id,
        relative_depth,
        ancestor_id,
        name,
        parent_id,
    })
}

#[async_trait]
impl RecordStore for LibsqlStore {
    async fn get(&self, key: &RecordKey) -> Result<Option<HierarchyRecord>, StoreError> {
        let conn = self.connect().await?;
        let rows = conn
            .query(
                &format!("{} WHERE id = ? AND relative_depth = ?", SELECT_COLUMNS),
                (key.id.as_str(), key.relative_depth as i64),
            )
            .await?;

        Ok(Self::collect_rows(rows).await?.into_iter().next())
    }

    async fn put(&self, record: HierarchyRecord) -> Result<(), StoreError> {
        let conn = self.connect().await?;
        conn.execute(
            "INSERT OR REPLACE INTO hierarchy_records (id, relative_depth, ancestor_id, name, parent_id)
             VALUES (?, ?, ?, ?, ?)",
            (
                record.id.as_str(),
                record.relative_depth as i64,
                record.ancestor_id.as_str(),
                record.name.as_str(),
                record.parent_id.as_deref(),
            ),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &RecordKey) -> Result<(), StoreError> {
        let conn = self.connect().await?;
        conn.execute(
            "DELETE FROM hierarchy_records WHERE id = ? AND relative_depth = ?",
            (key.id.as_str(), key.relative_depth as i64),
        )
        .await?;
        Ok(())
    }

    async fn query(
        &self,
        query: &RangeQuery,
        exclusive_start_key: Option<&StartKey>,
    ) -> Result<QueryPage, StoreError> {
        let conn = self.connect().await?;
        let min = query.depths.min as i64;
        let max = query.depths.max as i64;
        let limit = self.limit();

        let rows = match (&query.partition, exclusive_start_key) {
            (Partition::Primary(id), None) => {
                conn.query(
                    &format!(
                        "{} WHERE id = ? AND relative_depth >= ? AND relative_depth <= ?
                         ORDER BY relative_depth LIMIT ?",
                        SELECT_COLUMNS
                    ),
                    (id.as_str(), min, max, limit),
                )
                .await?
            }
            (Partition::Primary(id), Some(start)) => {
                conn.query(
                    &format!(
                        "{} WHERE id = ? AND relative_depth > ? AND relative_depth <= ?
                         ORDER BY relative_depth LIMIT ?",
                        SELECT_COLUMNS
                    ),
                    (id.as_str(), start.relative_depth as i64, max, limit),
                )
                .await?
            }
            (Partition::Ancestor(ancestor_id), None) => {
                conn.query(
                    &format!(
                        "{} WHERE ancestor_id = ? AND relative_depth >= ? AND relative_depth <= ?
                         ORDER BY relative_depth, id LIMIT ?",
                        SELECT_COLUMNS
                    ),
                    (ancestor_id.as_str(), min, max, limit),
                )
                .await?
            }
            (Partition::Ancestor(ancestor_id), Some(start)) => {
                let start_depth = start.relative_depth as i64;
                conn.query(
                    &format!(
                        "{} WHERE ancestor_id = ? AND relative_depth <= ?
                         AND (relative_depth > ? OR (relative_depth = ? AND id > ?))
                         ORDER BY relative_depth, id LIMIT ?",
                        SELECT_COLUMNS
                    ),
                    (
                        ancestor_id.as_str(),
                        max,
                        start_depth,
                        start_depth,
                        start.id.as_str(),
                        limit,
                    ),
                )
                .await?
            }
        };

        let records = Self::collect_rows(rows).await?;
        let last_evaluated_key = match self.page_size {
            Some(size) if records.len() == size => records.last().map(StartKey::from),
            _ => None,
        };

        Ok(QueryPage {
            records,
            last_evaluated_key,
        })
    }

    async fn batch_delete(&self, keys: Vec<RecordKey>) -> Result<BatchDeleteOutcome, StoreError> {
        if keys.len() > self.max_batch_size() {
            return Err(StoreError::backend(format!(
                "batch of {} keys exceeds the limit of {}",
                keys.len(),
                self.max_batch_size()
            )));
        }

        let conn = self.connect().await?;
        let tx = conn.transaction().await?;
        for key in &keys {
            tx.execute(
                "DELETE FROM hierarchy_records WHERE id = ? AND relative_depth = ?",
                (key.id.as_str(), key.relative_depth as i64),
            )
            .await?;
        }
        tx.commit().await?;

        Ok(BatchDeleteOutcome::complete())
    }
}
