//! Batching merge engine over a [`DocumentStore`].

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::build::build_upsert_at;
use crate::config::MergeConfig;
use crate::error::{MedGraphError, MedGraphResult};
use crate::models::{self, Entity};
use crate::traits::DocumentStore;
use crate::types::{fields, BatchOutcome, EntitySchema, UpsertInstruction};

/// Counters for one [`MergeEngine::submit`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    /// Records handed to the engine.
    pub submitted: u64,
    /// Records rejected before reaching the store.
    pub rejected: u64,
    /// Bulk writes issued.
    pub batches: u64,
    pub matched: u64,
    pub modified: u64,
    pub upserted: u64,
    /// Items the store refused inside otherwise applied batches.
    pub write_errors: u64,
}

impl MergeStats {
    fn absorb(&mut self, outcome: &BatchOutcome) {
        self.batches += 1;
        self.matched += outcome.matched;
        self.modified += outcome.modified;
        self.upserted += outcome.upserted;
        self.write_errors += outcome.write_errors.len() as u64;
    }
}

/// Merges partial entity records into their canonical collections.
pub struct MergeEngine {
    store: Arc<dyn DocumentStore>,
    config: MergeConfig,
}

impl MergeEngine {
    /// Create an engine writing to `store`.
    pub fn new(store: Arc<dyn DocumentStore>, config: MergeConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size.max(1)
    }

    /// Create key and secondary indexes for the given collections.
    pub async fn ensure_indexes(&self, schemas: &[&EntitySchema]) -> MedGraphResult<()> {
        for schema in schemas {
            debug!(collection = schema.collection, "Ensuring indexes");
            self.store.ensure_indexes(schema).await?;
        }
        Ok(())
    }

    /// Create indexes for every catalogued collection.
    pub async fn ensure_all_indexes(&self) -> MedGraphResult<()> {
        let schemas: Vec<&EntitySchema> = models::all_schemas().collect();
        self.ensure_indexes(&schemas).await?;
        info!(collections = schemas.len(), "Indexes ensured");
        Ok(())
    }

    /// Apply prepared instructions, grouped per collection and chunked by
    /// the batch size.
    ///
    /// Failure indices in the returned outcome refer to positions in
    /// `instructions`. A store error aborts the remaining batches.
    pub async fn apply_batch(&self, instructions: Vec<UpsertInstruction>) -> MedGraphResult<BatchOutcome> {
        let mut groups: BTreeMap<String, Vec<(usize, UpsertInstruction)>> = BTreeMap::new();
        for (position, instruction) in instructions.into_iter().enumerate() {
            groups
                .entry(instruction.collection.clone())
                .or_default()
                .push((position, instruction));
        }

        let mut total = BatchOutcome::default();
        for (collection, items) in groups {
            for chunk in items.chunks(self.batch_size()) {
                let (positions, batch): (Vec<usize>, Vec<UpsertInstruction>) = chunk.iter().cloned().unzip();
                let outcome = self.write(&collection, &batch).await?;
                total.absorb(outcome, &positions);
            }
        }
        Ok(total)
    }

    /// Build and apply upserts for a stream of records of one entity type.
    ///
    /// Records failing validation are logged and skipped. Any other error,
    /// including a failed bulk write, aborts the submission.
    pub async fn submit<E, I>(&self, records: I) -> MedGraphResult<MergeStats>
    where
        E: Entity,
        I: IntoIterator<Item = E>,
    {
        let collection = E::SCHEMA.collection;
        let batch_size = self.batch_size();
        let mut stats = MergeStats::default();
        let mut pending: Vec<UpsertInstruction> = Vec::with_capacity(batch_size);

        for record in records {
            stats.submitted += 1;
            match build_upsert_at(&record, chrono::Utc::now()) {
                Ok(instruction) => pending.push(instruction),
                Err(e) if e.is_record_level() => {
                    stats.rejected += 1;
                    warn!(collection, error = %e, "Skipping invalid record");
                    continue;
                }
                Err(e) => return Err(e),
            }

            if pending.len() >= batch_size {
                let outcome = self.write(collection, &pending).await?;
                stats.absorb(&outcome);
                pending.clear();
            }
        }

        if !pending.is_empty() {
            let outcome = self.write(collection, &pending).await?;
            stats.absorb(&outcome);
        }

        info!(
            collection,
            submitted = stats.submitted,
            rejected = stats.rejected,
            upserted = stats.upserted,
            modified = stats.modified,
            write_errors = stats.write_errors,
            "Merge complete"
        );
        Ok(stats)
    }

    /// Primary domain identifiers already present in a node collection.
    ///
    /// Parsers use this to drop edges whose endpoints are unknown.
    pub async fn known_ids(&self, collection: &str) -> MedGraphResult<HashSet<String>> {
        if let Some(schema) = models::schema_for(collection) {
            if !schema.is_node() {
                return Err(MedGraphError::validation(format!(
                    "'{}' is an edge collection and has no primary identifiers",
                    collection
                )));
            }
        }
        self.store
            .distinct_strings(collection, fields::PRIMARY_DOMAIN_ID)
            .await
    }

    async fn write(&self, collection: &str, batch: &[UpsertInstruction]) -> MedGraphResult<BatchOutcome> {
        debug!(collection, size = batch.len(), "Applying bulk upsert");
        let outcome = self.store.apply_batch(collection, batch).await?;
        for failure in &outcome.write_errors {
            let key = batch.get(failure.index).map(|i| format!("{:?}", i.key));
            warn!(
                collection,
                index = failure.index,
                key = key.as_deref().unwrap_or("?"),
                message = %failure.message,
                "Upsert rejected by store"
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::models::{Gene, SideEffect, VariantAssociatedWithDisorder};
    use crate::store::MemoryDocumentStore;
    use crate::traits::MockDocumentStore;
    use crate::types::EntityKey;

    fn side_effect(id: &str, source: &str) -> SideEffect {
        SideEffect {
            primary_domain_id: id.to_string(),
            data_sources: vec![source.to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_submit_chunks_and_skips_invalid() {
        let store = Arc::new(MemoryDocumentStore::new());
        let engine = MergeEngine::new(store.clone(), MergeConfig::with_batch_size(2));

        let records = vec![
            side_effect("meddra.1", "sider"),
            side_effect("", "sider"),
            side_effect("meddra.2", "sider"),
            side_effect("meddra.3", "offsides"),
        ];
        let stats = engine.submit(records).await.unwrap();

        assert_eq!(stats.submitted, 4);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.batches, 2);
        assert_eq!(stats.upserted, 3);
        assert_eq!(store.count("side_effect").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_submit_rejects_edge_without_endpoints() {
        let store = Arc::new(MemoryDocumentStore::new());
        let engine = MergeEngine::new(store.clone(), MergeConfig::default());

        let stats = engine
            .submit(vec![
                VariantAssociatedWithDisorder {
                    accession: "VCV000012345".to_string(),
                    effects: vec!["pathogenic".to_string()],
                    ..Default::default()
                },
                VariantAssociatedWithDisorder {
                    accession: "VCV000012346".to_string(),
                    source_domain_id: Some("clinvar.12346".to_string()),
                    target_domain_id: Some("mondo.0007739".to_string()),
                    ..Default::default()
                },
            ])
            .await
            .unwrap();

        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.upserted, 1);
        assert_eq!(store.count("variant_associated_with_disorder").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_batch_level_error_surfaces() {
        let mut store = MockDocumentStore::new();
        store
            .expect_apply_batch()
            .times(1)
            .returning(|_, _| Err(MedGraphError::store("connection reset")));

        let engine = MergeEngine::new(Arc::new(store), MergeConfig::default());
        let err = engine
            .submit(vec![side_effect("meddra.1", "sider")])
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::StoreOperationFailed);
    }

    #[tokio::test]
    async fn test_apply_batch_maps_failure_positions() {
        let store = Arc::new(MemoryDocumentStore::new());
        let engine = MergeEngine::new(store.clone(), MergeConfig::default());
        let now = chrono::Utc::now();

        let gene = UpsertInstruction::new("gene", EntityKey::primary("entrez.1"), "Gene", now);
        let mut scalar = UpsertInstruction::new("side_effect", EntityKey::primary("meddra.1"), "SideEffect", now);
        scalar.set.insert("dataSources".to_string(), serde_json::json!("sider"));
        let mut union = UpsertInstruction::new("side_effect", EntityKey::primary("meddra.1"), "SideEffect", now);
        union
            .add_to_set
            .insert("dataSources".to_string(), vec![serde_json::json!("offsides")]);

        let outcome = engine.apply_batch(vec![scalar, gene, union]).await.unwrap();
        assert_eq!(outcome.upserted, 2);
        assert_eq!(outcome.write_errors.len(), 1);
        assert_eq!(outcome.write_errors[0].index, 2);
    }

    #[tokio::test]
    async fn test_known_ids() {
        let store = Arc::new(MemoryDocumentStore::new());
        let engine = MergeEngine::new(store, MergeConfig::default());
        engine
            .submit(vec![
                Gene {
                    primary_domain_id: "entrez.1".to_string(),
                    ..Default::default()
                },
                Gene {
                    primary_domain_id: "entrez.2".to_string(),
                    ..Default::default()
                },
            ])
            .await
            .unwrap();

        let ids = engine.known_ids("gene").await.unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("entrez.1"));
        assert!(engine.known_ids("drug_has_target").await.is_err());
    }

    #[tokio::test]
    async fn test_ensure_all_indexes() {
        let store = Arc::new(MemoryDocumentStore::new());
        let engine = MergeEngine::new(store.clone(), MergeConfig::default());
        engine.ensure_all_indexes().await.unwrap();
        assert_eq!(
            store.list_collections().await.unwrap().len(),
            models::node_schemas().len() + models::edge_schemas().len()
        );
    }
}
