//! Batch Deletion Helper
//!
//! Deletes an unbounded set of keys through the store's bounded batch call.
//! Keys are split into chunks no larger than the store accepts; a chunk that
//! comes back with unprocessed keys is resubmitted with only those keys,
//! backing off exponentially between attempts.
//!
//! - **Retry on**: the unprocessed-items signal only
//! - **Backoff**: `base_backoff_ms * 2^attempt` (10ms, 20ms, 40ms, ... by default)
//! - **Other errors**: propagate immediately without retry
//! - **Exhaustion**: `StoreError::UnprocessedItems`; keys are never dropped silently

use crate::config::BatchConfig;
use crate::db::error::StoreError;
use crate::db::record_store::RecordStore;
use crate::models::RecordKey;
use tokio::time::Duration;

/// Chunks and retries batch deletes against one store
pub struct BatchDeleter<'a> {
    store: &'a dyn RecordStore,
    config: &'a BatchConfig,
}

impl<'a> BatchDeleter<'a> {
    pub fn new(store: &'a dyn RecordStore, config: &'a BatchConfig) -> Self {
        Self { store, config }
    }

    /// Effective chunk size: the smaller of the configured and the store limit
    pub fn chunk_size(&self) -> usize {
        self.config
            .max_batch_size
            .min(self.store.max_batch_size())
            .max(1)
    }

    /// Delete every key, returning how many were submitted
    pub async fn delete_all(&self, keys: Vec<RecordKey>) -> Result<usize, StoreError> {
        let total = keys.len();
        if total == 0 {
            return Ok(0);
        }

        let chunk_size = self.chunk_size();
        for chunk in keys.chunks(chunk_size) {
            self.delete_chunk(chunk.to_vec()).await?;
        }

        tracing::debug!(
            "Batch deleted {} record(s) in chunks of {}",
            total,
            chunk_size
        );
        Ok(total)
    }

    async fn delete_chunk(&self, chunk: Vec<RecordKey>) -> Result<(), StoreError> {
        let mut pending = chunk;
        let mut attempt: u32 = 0;

        loop {
            let outcome = self.store.batch_delete(pending).await?;
            if outcome.is_complete() {
                if attempt > 0 {
                    tracing::debug!("Batch delete completed after {} retry(ies)", attempt);
                }
                return Ok(());
            }

            pending = outcome.unprocessed;

            if attempt >= self.config.max_retries {
                tracing::warn!(
                    "Max retries ({}) exceeded with {} unprocessed key(s)",
                    self.config.max_retries,
                    pending.len()
                );
                return Err(StoreError::unprocessed_items(pending.len()));
            }

            tracing::debug!(
                "Batch delete attempt {}/{} left {} unprocessed key(s). Retrying...",
                attempt + 1,
                self.config.max_retries + 1,
                pending.len()
            );

            let backoff_ms = self
                .config
                .base_backoff_ms
                .saturating_mul(1u64 << attempt.min(20));
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;

            attempt += 1;
        }
    }
}
