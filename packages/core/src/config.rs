//! Configuration
//!
//! Tunables for the repository, the batch deletion helper and the in-memory
//! store. Every config deserializes from JSON with missing fields filled from
//! `Default`, and checks itself with `validate()`.

use crate::db::DEFAULT_MAX_BATCH_SIZE;
use serde::{Deserialize, Serialize};

/// Default number of sibling writes dispatched at once
pub const DEFAULT_WRITE_CONCURRENCY: usize = 16;

/// Repository configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepositoryConfig {
    /// Upper bound on in-flight store calls within one cascade step (default: 16)
    pub write_concurrency: usize,
    /// Batch deletion settings
    pub batch: BatchConfig,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            write_concurrency: DEFAULT_WRITE_CONCURRENCY,
            batch: BatchConfig::default(),
        }
    }
}

impl RepositoryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.write_concurrency == 0 {
            return Err("write_concurrency must be greater than 0".to_string());
        }
        self.batch.validate()
    }
}

/// Batch deletion configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchConfig {
    /// Keys per batch call, capped by the store's own limit (default: 25)
    pub max_batch_size: usize,
    /// Resubmissions of unprocessed keys before giving up (default: 8)
    pub max_retries: u32,
    /// Backoff before the first resubmission, doubled each time (default: 10ms)
    pub base_backoff_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_retries: 8,
            base_backoff_ms: 10,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_batch_size == 0 {
            return Err("max_batch_size must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// In-memory store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryStoreConfig {
    /// Records per query page; `None` returns every match in one page
    pub page_size: Option<usize>,
    /// Largest batch delete the store accepts (default: 25)
    pub max_batch_size: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            page_size: None,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl MemoryStoreConfig {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.page_size == Some(0) {
            return Err("page_size must be greater than 0".to_string());
        }
        if self.max_batch_size == 0 {
            return Err("max_batch_size must be greater than 0".to_string());
        }
        Ok(())
    }
}
