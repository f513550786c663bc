//! Range Query Engine
//!
//! Stores answer range queries one page at a time. [`query_all`] follows the
//! continuation keys until the store says it is done, so callers always see
//! the complete result. A page-size limit says nothing about the total size of
//! the result and is never treated as one.

use crate::db::error::StoreError;
use crate::db::record_store::RecordStore;
use crate::models::{DepthRange, HierarchyRecord, IndexKey, RecordKey};
use std::fmt;

/// Which key a range query runs against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Partition {
    /// Primary key: all records of one descendant (its ancestor chain)
    Primary(String),
    /// Ancestor index: all records under one ancestor (its subtree)
    Ancestor(String),
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::Primary(id) => write!(f, "id={}", id),
            Partition::Ancestor(id) => write!(f, "ancestorId={}", id),
        }
    }
}

/// Equality on a partition key plus an inclusive range on relative depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    pub partition: Partition,
    pub depths: DepthRange,
}

impl RangeQuery {
    /// Records of `id` under each of its ancestors
    pub fn ancestors_of(id: impl Into<String>, depths: DepthRange) -> Self {
        Self {
            partition: Partition::Primary(id.into()),
            depths,
        }
    }

    /// Records of each descendant of `ancestor_id`
    pub fn descendants_of(ancestor_id: impl Into<String>, depths: DepthRange) -> Self {
        Self {
            partition: Partition::Ancestor(ancestor_id.into()),
            depths,
        }
    }

    pub fn uses_index(&self) -> bool {
        matches!(self.partition, Partition::Ancestor(_))
    }
}

/// Full key of the last record a page covered
///
/// Carries both the primary and the index key components so either kind of
/// query can resume from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartKey {
    pub id: String,
    pub relative_depth: u32,
    pub ancestor_id: String,
}

impl StartKey {
    pub fn record_key(&self) -> RecordKey {
        RecordKey::new(self.id.clone(), self.relative_depth)
    }

    pub fn index_key(&self) -> IndexKey {
        IndexKey::new(self.ancestor_id.clone(), self.relative_depth, self.id.clone())
    }
}

impl From<&HierarchyRecord> for StartKey {
    fn from(record: &HierarchyRecord) -> Self {
        Self {
            id: record.id.clone(),
            relative_depth: record.relative_depth,
            ancestor_id: record.ancestor_id.clone(),
        }
    }
}

impl fmt::Display for StartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.ancestor_id, self.id, self.relative_depth)
    }
}

/// One page of a range query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPage {
    pub records: Vec<HierarchyRecord>,
    /// Present when more pages may follow
    pub last_evaluated_key: Option<StartKey>,
}

impl QueryPage {
    /// A page that ends the query
    pub fn last(records: Vec<HierarchyRecord>) -> Self {
        Self {
            records,
            last_evaluated_key: None,
        }
    }
}

/// Run `query` to completion, concatenating every page in store order.
///
/// Store errors propagate unchanged. An empty result is `Ok(vec![])`.
pub async fn query_all(
    store: &dyn RecordStore,
    query: &RangeQuery,
) -> Result<Vec<HierarchyRecord>, StoreError> {
    let mut records = Vec::new();
    let mut start_key: Option<StartKey> = None;
    let mut pages = 0usize;

    loop {
        let page = store.query(query, start_key.as_ref()).await?;
        pages += 1;

        tracing::trace!(
            "Range query {} page {} returned {} record(s)",
            query.partition,
            pages,
            page.records.len()
        );

        records.extend(page.records);

        match page.last_evaluated_key {
            None => break,
            Some(next) => {
                if start_key.as_ref() == Some(&next) {
                    return Err(StoreError::pagination_stalled(next.to_string()));
                }
                start_key = Some(next);
            }
        }
    }

    Ok(records)
}
