//! Hierarchy Index Core
//!
//! This crate stores a tree as a materialized ancestor/descendant index in a
//! plain key-value store, so ancestor chains, subtrees and direct children are
//! each a single range query.
//!
//! # Architecture
//!
//! - **One record per (descendant, ancestor) pair**: keyed by `(id,
//!   relativeDepth)`, indexed by `(ancestorId, relativeDepth)`
//! - **Denormalized**: every record carries the descendant's name and parent
//! - **No transactions**: writes are idempotent overwrites of deterministic
//!   keys, so interrupted cascades converge on re-run
//! - **Pluggable stores**: in-memory and libsql backends behind one trait
//!
//! # Modules
//!
//! - [`models`] - Nodes, records, keys and depth ranges
//! - [`db`] - Store trait, backends, range query engine and batch deletes
//! - [`services`] - The hierarchy repository
//! - [`api`] - Transport-agnostic request handlers
//! - [`config`] - Repository and store configuration

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use api::{ApiError, ApiRequest, NodeHandlers};
pub use config::{BatchConfig, MemoryStoreConfig, RepositoryConfig};
pub use db::{LibsqlStore, MemoryStore, RecordStore, StoreError};
pub use models::*;
pub use services::*;
