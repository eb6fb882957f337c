//! Document store trait and related types.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::MedGraphResult;
use crate::types::{BatchOutcome, Document, EntitySchema, UpsertInstruction};

/// Core DocumentStore trait - every canonical store backend implements this.
///
/// The store is shared by the merge engine, the post-integration sweeps and
/// the exporter. Only one writer uses it at a time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create the unique key index and the secondary indexes of a collection.
    async fn ensure_indexes(&self, schema: &EntitySchema) -> MedGraphResult<()>;

    /// Apply a batch of upserts to one collection as a single unordered bulk write.
    ///
    /// Per-item failures are reported in the outcome and do not stop the
    /// remaining items. A returned error means the batch as a whole failed.
    async fn apply_batch(
        &self,
        collection: &str,
        instructions: &[UpsertInstruction],
    ) -> MedGraphResult<BatchOutcome>;

    /// List collection names.
    async fn list_collections(&self) -> MedGraphResult<Vec<String>>;

    /// Read every document of a collection, including bookkeeping fields.
    async fn find_all(&self, collection: &str) -> MedGraphResult<Vec<Document>>;

    /// Count the documents of a collection.
    async fn count(&self, collection: &str) -> MedGraphResult<u64>;

    /// Collect the distinct string values of a field.
    async fn distinct_strings(&self, collection: &str, field: &str) -> MedGraphResult<HashSet<String>>;

    /// Drop a collection.
    async fn drop_collection(&self, collection: &str) -> MedGraphResult<()>;

    /// Delete every document whose `field` equals one of `ids`. Returns the
    /// number of deleted documents.
    async fn delete_by_ids(&self, collection: &str, field: &str, ids: &[String]) -> MedGraphResult<u64>;

    /// Replace the first document matching `filter`, inserting if none does.
    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
    ) -> MedGraphResult<()>;
}

/// Store provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreProvider {
    #[default]
    Mongodb,
    /// Process-local store, used for tests and dry runs.
    Memory,
}
