//! Upsert instructions and bulk-write outcomes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::key::EntityKey;

/// A schemaless stored document.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// One idempotent merge of a partial record into its canonical document.
///
/// Maps onto a single upserting update: `set` overwrites, `add_to_set`
/// unions, `max`/`min` reduce, `created` is written on insert only and
/// `updated` on every application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertInstruction {
    pub collection: String,
    pub key: EntityKey,
    /// Node label or edge type, written on every application.
    pub label: String,
    pub set: BTreeMap<String, serde_json::Value>,
    pub add_to_set: BTreeMap<String, Vec<serde_json::Value>>,
    pub max: BTreeMap<String, serde_json::Value>,
    pub min: BTreeMap<String, serde_json::Value>,
    /// Written to `updated` always and to `created` on insert.
    pub timestamp: DateTime<Utc>,
}

impl UpsertInstruction {
    /// Create an instruction that only touches the system fields.
    pub fn new(
        collection: impl Into<String>,
        key: EntityKey,
        label: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            collection: collection.into(),
            key,
            label: label.into(),
            set: BTreeMap::new(),
            add_to_set: BTreeMap::new(),
            max: BTreeMap::new(),
            min: BTreeMap::new(),
            timestamp,
        }
    }
}

/// Set-union element equality. Numbers compare by value, so `1` and `1.0`
/// are one element as in MongoDB's `$addToSet`. Numbers nested in arrays or
/// objects still compare by representation.
pub fn same_element(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// A per-item failure inside an otherwise applied batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    /// Position of the failed instruction in the submitted batch.
    pub index: usize,
    pub message: String,
}

/// Result of one bulk write against one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Existing documents matched by a key.
    pub matched: u64,
    /// Matched documents that actually changed.
    pub modified: u64,
    /// Documents created for unseen keys.
    pub upserted: u64,
    pub write_errors: Vec<WriteFailure>,
}

impl BatchOutcome {
    /// Fold the outcome of a sub-batch into this one. Failure indices are
    /// mapped through `positions`, the index of each sub-batch item in the
    /// enclosing batch.
    pub fn absorb(&mut self, other: BatchOutcome, positions: &[usize]) {
        self.matched += other.matched;
        self.modified += other.modified;
        self.upserted += other.upserted;
        self.write_errors
            .extend(other.write_errors.into_iter().map(|mut f| {
                f.index = positions.get(f.index).copied().unwrap_or(f.index);
                f
            }));
    }
}
