//! Sweeps run once every source has been merged.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::MedGraphResult;
use crate::models::{GENE_EXPRESSED_IN_TISSUE, PROTEIN_EXPRESSED_IN_TISSUE, TISSUE};
use crate::traits::DocumentStore;
use crate::types::fields;

/// Delete tissues that no expression edge points at.
///
/// Tissue sources ship the whole anatomy ontology; only the terms used by
/// gene or protein expression are kept. Returns the deleted identifiers,
/// sorted.
pub async fn trim_unused_tissues(store: &dyn DocumentStore) -> MedGraphResult<Vec<String>> {
    let mut used: HashSet<String> = HashSet::new();
    for edges in [&GENE_EXPRESSED_IN_TISSUE, &PROTEIN_EXPRESSED_IN_TISSUE] {
        used.extend(
            store
                .distinct_strings(edges.collection, fields::TARGET_DOMAIN_ID)
                .await?,
        );
    }

    let mut unused: Vec<String> = store
        .distinct_strings(TISSUE.collection, fields::PRIMARY_DOMAIN_ID)
        .await?
        .into_iter()
        .filter(|id| !used.contains(id))
        .collect();
    unused.sort();

    let deleted = store
        .delete_by_ids(TISSUE.collection, fields::PRIMARY_DOMAIN_ID, &unused)
        .await?;
    debug!(referenced = used.len(), "Tissue references collected");
    info!(deleted, "Unused tissues trimmed");
    Ok(unused)
}

/// Drop every collection that holds no documents.
///
/// Returns the dropped collection names in listing order.
pub async fn drop_empty_collections(store: &dyn DocumentStore) -> MedGraphResult<Vec<String>> {
    let mut dropped = Vec::new();
    for collection in store.list_collections().await? {
        if store.count(&collection).await? == 0 {
            warn!(collection = %collection, "Dropping empty collection");
            store.drop_collection(&collection).await?;
            dropped.push(collection);
        }
    }
    info!(dropped = dropped.len(), "Empty collection sweep complete");
    Ok(dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::build_upsert;
    use crate::models::{GeneExpressedInTissue, ProteinExpressedInTissue, Tissue, GENE, PROTEIN};
    use crate::store::MemoryDocumentStore;
    use crate::types::{EntityKey, UpsertInstruction};

    fn tissue(id: &str) -> UpsertInstruction {
        build_upsert(&Tissue {
            primary_domain_id: id.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_unreferenced_tissues_trimmed() {
        let store = MemoryDocumentStore::new();
        store
            .apply_batch(
                "tissue",
                &[tissue("uberon.0000948"), tissue("uberon.0002107"), tissue("uberon.0001017")],
            )
            .await
            .unwrap();
        store
            .apply_batch(
                "gene_expressed_in_tissue",
                &[build_upsert(&GeneExpressedInTissue {
                    source_domain_id: "entrez.1".to_string(),
                    target_domain_id: "uberon.0000948".to_string(),
                    ..Default::default()
                })
                .unwrap()],
            )
            .await
            .unwrap();
        store
            .apply_batch(
                "protein_expressed_in_tissue",
                &[build_upsert(&ProteinExpressedInTissue {
                    source_domain_id: "uniprot.P1".to_string(),
                    target_domain_id: "uberon.0002107".to_string(),
                    ..Default::default()
                })
                .unwrap()],
            )
            .await
            .unwrap();

        let trimmed = trim_unused_tissues(&store).await.unwrap();
        assert_eq!(trimmed, vec!["uberon.0001017".to_string()]);

        let remaining = store.distinct_strings("tissue", "primaryDomainId").await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.contains("uberon.0000948"));
        assert!(remaining.contains("uberon.0002107"));
    }

    #[tokio::test]
    async fn test_all_tissues_trimmed_without_expression() {
        let store = MemoryDocumentStore::new();
        store.apply_batch("tissue", &[tissue("uberon.1")]).await.unwrap();

        assert_eq!(trim_unused_tissues(&store).await.unwrap().len(), 1);
        assert_eq!(store.count("tissue").await.unwrap(), 0);
        assert!(drop_empty_collections(&store).await.unwrap().contains(&"tissue".to_string()));
    }

    #[tokio::test]
    async fn test_only_empty_collections_dropped() {
        let store = MemoryDocumentStore::new();
        store.ensure_indexes(&GENE).await.unwrap();
        store.ensure_indexes(&PROTEIN).await.unwrap();
        store
            .apply_batch(
                "protein",
                &[UpsertInstruction::new(
                    "protein",
                    EntityKey::primary("uniprot.P1"),
                    "Protein",
                    chrono::Utc::now(),
                )],
            )
            .await
            .unwrap();

        let dropped = drop_empty_collections(&store).await.unwrap();
        assert_eq!(dropped, vec!["gene".to_string()]);
        assert_eq!(store.list_collections().await.unwrap(), vec!["protein".to_string()]);
    }
}
