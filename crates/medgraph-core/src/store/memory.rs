//! Process-local document store with the same upsert semantics as MongoDB.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{MedGraphError, MedGraphResult};
use crate::traits::DocumentStore;
use crate::types::{
    fields, same_element, BatchOutcome, Document, EntityKey, EntitySchema, UpsertInstruction, WriteFailure,
};

#[derive(Debug, Default)]
struct MemoryCollection {
    documents: Vec<Document>,
    by_key: HashMap<EntityKey, usize>,
}

/// In-memory [`DocumentStore`] for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<BTreeMap<String, MemoryCollection>>,
    next_id: AtomicU64,
}

enum Applied {
    Inserted,
    Matched { modified: bool },
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn object_id(&self) -> String {
        format!("{:024x}", self.next_id.fetch_add(1, AtomicOrdering::Relaxed) + 1)
    }

    /// Apply the update operators to a copy of `current`; the original is
    /// untouched when an operator fails.
    fn apply_operators(current: &Document, instruction: &UpsertInstruction) -> Result<Document, String> {
        let mut doc = current.clone();
        let timestamp = Value::String(instruction.timestamp.to_rfc3339());

        doc.insert(fields::TYPE.to_string(), Value::String(instruction.label.clone()));
        doc.insert(fields::UPDATED.to_string(), timestamp);
        for (name, value) in &instruction.set {
            doc.insert(name.clone(), value.clone());
        }

        for (name, values) in &instruction.add_to_set {
            let slot = doc
                .entry(name.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            let Value::Array(existing) = slot else {
                return Err(format!("cannot apply $addToSet to non-array field '{}'", name));
            };
            for value in values {
                if !existing.iter().any(|e| same_element(e, value)) {
                    existing.push(value.clone());
                }
            }
        }

        for (name, value) in &instruction.max {
            Self::reduce(&mut doc, name, value, Ordering::Greater)?;
        }
        for (name, value) in &instruction.min {
            Self::reduce(&mut doc, name, value, Ordering::Less)?;
        }

        Ok(doc)
    }

    fn reduce(doc: &mut Document, name: &str, value: &Value, wins: Ordering) -> Result<(), String> {
        let Some(incoming) = value.as_f64() else {
            return Err(format!("non-numeric value for '{}'", name));
        };
        let replace = match doc.get(name) {
            None | Some(Value::Null) => true,
            Some(existing) => {
                let Some(existing) = existing.as_f64() else {
                    return Err(format!("cannot compare non-numeric field '{}'", name));
                };
                incoming.partial_cmp(&existing) == Some(wins)
            }
        };
        if replace {
            doc.insert(name.to_string(), value.clone());
        }
        Ok(())
    }

    fn upsert(&self, collection: &mut MemoryCollection, instruction: &UpsertInstruction) -> Result<Applied, String> {
        match collection.by_key.get(&instruction.key) {
            Some(&index) => {
                let current = &collection.documents[index];
                let next = Self::apply_operators(current, instruction)?;
                let modified = &next != current;
                collection.documents[index] = next;
                Ok(Applied::Matched { modified })
            }
            None => {
                let mut seed = Document::new();
                seed.insert(fields::OBJECT_ID.to_string(), Value::String(self.object_id()));
                for (field, value) in instruction.key.fields() {
                    seed.insert(field.to_string(), Value::String(value.to_string()));
                }
                seed.insert(
                    fields::CREATED.to_string(),
                    Value::String(instruction.timestamp.to_rfc3339()),
                );
                let doc = Self::apply_operators(&seed, instruction)?;
                collection.documents.push(doc);
                collection
                    .by_key
                    .insert(instruction.key.clone(), collection.documents.len() - 1);
                Ok(Applied::Inserted)
            }
        }
    }

    fn matches(doc: &Document, filter: &Document) -> bool {
        filter.iter().all(|(k, v)| doc.get(k) == Some(v))
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn ensure_indexes(&self, schema: &EntitySchema) -> MedGraphResult<()> {
        self.collections
            .write()
            .await
            .entry(schema.collection.to_string())
            .or_default();
        Ok(())
    }

    async fn apply_batch(
        &self,
        collection: &str,
        instructions: &[UpsertInstruction],
    ) -> MedGraphResult<BatchOutcome> {
        let mut collections = self.collections.write().await;
        let target = collections.entry(collection.to_string()).or_default();

        let mut outcome = BatchOutcome::default();
        for (index, instruction) in instructions.iter().enumerate() {
            if instruction.collection != collection {
                outcome.write_errors.push(WriteFailure {
                    index,
                    message: format!(
                        "instruction for '{}' submitted to '{}'",
                        instruction.collection, collection
                    ),
                });
                continue;
            }
            match self.upsert(target, instruction) {
                Ok(Applied::Inserted) => outcome.upserted += 1,
                Ok(Applied::Matched { modified }) => {
                    outcome.matched += 1;
                    if modified {
                        outcome.modified += 1;
                    }
                }
                Err(message) => outcome.write_errors.push(WriteFailure { index, message }),
            }
        }
        Ok(outcome)
    }

    async fn list_collections(&self) -> MedGraphResult<Vec<String>> {
        Ok(self.collections.read().await.keys().cloned().collect())
    }

    async fn find_all(&self, collection: &str) -> MedGraphResult<Vec<Document>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default())
    }

    async fn count(&self, collection: &str) -> MedGraphResult<u64> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|c| c.documents.len() as u64)
            .unwrap_or(0))
    }

    async fn distinct_strings(&self, collection: &str, field: &str) -> MedGraphResult<HashSet<String>> {
        let collections = self.collections.read().await;
        let mut values = HashSet::new();
        let Some(target) = collections.get(collection) else {
            return Ok(values);
        };
        for doc in &target.documents {
            match doc.get(field) {
                Some(Value::String(s)) => {
                    values.insert(s.clone());
                }
                Some(Value::Array(items)) => {
                    values.extend(items.iter().filter_map(|v| v.as_str().map(str::to_string)));
                }
                _ => {}
            }
        }
        Ok(values)
    }

    async fn drop_collection(&self, collection: &str) -> MedGraphResult<()> {
        self.collections.write().await.remove(collection);
        Ok(())
    }

    async fn delete_by_ids(&self, collection: &str, field: &str, ids: &[String]) -> MedGraphResult<u64> {
        let mut collections = self.collections.write().await;
        let Some(target) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();

        let mut remap: Vec<Option<usize>> = Vec::with_capacity(target.documents.len());
        let mut kept = Vec::with_capacity(target.documents.len());
        for doc in target.documents.drain(..) {
            let delete = doc.get(field).and_then(Value::as_str).is_some_and(|v| ids.contains(v));
            if delete {
                remap.push(None);
            } else {
                remap.push(Some(kept.len()));
                kept.push(doc);
            }
        }
        let deleted = (remap.len() - kept.len()) as u64;
        target.documents = kept;
        target.by_key.retain(|_, index| match remap[*index] {
            Some(next) => {
                *index = next;
                true
            }
            None => false,
        });
        Ok(deleted)
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        mut replacement: Document,
    ) -> MedGraphResult<()> {
        if replacement.contains_key(fields::OBJECT_ID) {
            return Err(MedGraphError::store("replacement document must not carry _id"));
        }
        let mut collections = self.collections.write().await;
        let target = collections.entry(collection.to_string()).or_default();

        match target.documents.iter_mut().find(|d| Self::matches(d, &filter)) {
            Some(existing) => {
                if let Some(id) = existing.get(fields::OBJECT_ID).cloned() {
                    replacement.insert(fields::OBJECT_ID.to_string(), id);
                }
                *existing = replacement;
            }
            None => {
                replacement.insert(fields::OBJECT_ID.to_string(), Value::String(self.object_id()));
                target.documents.push(replacement);
            }
        }
        Ok(())
    }
}
