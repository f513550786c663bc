//! Store Layer
//!
//! This module holds everything between the hierarchy repository and the
//! physical key-value store:
//!
//! - `RecordStore` - The store seam: point get/put/delete, paginated range
//!   queries over the primary key or the ancestor index, bounded batch delete
//! - `query_all` - Exhaustive pagination over a range query
//! - `BatchDeleter` - Chunked batch deletes with retry of unprocessed keys
//! - `MemoryStore` - In-process backend with an optional page size
//! - `LibsqlStore` - Embedded SQLite backend via libsql
//!
//! # Architecture
//!
//! The repository never sees a backend type. It holds an `Arc<dyn RecordStore>`
//! and derives every hierarchy fact from range queries, so any store offering
//! a primary key, one secondary index and paginated range reads can host it.

mod batch;
mod error;
mod libsql_store;
mod memory_store;
mod query;
mod record_store;

pub use batch::BatchDeleter;
pub use error::StoreError;
pub use libsql_store::LibsqlStore;
pub use memory_store::MemoryStore;
pub use query::{query_all, Partition, QueryPage, RangeQuery, StartKey};
pub use record_store::{BatchDeleteOutcome, RecordStore, DEFAULT_MAX_BATCH_SIZE};
