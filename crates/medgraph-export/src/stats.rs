//! Collection statistics written to the `_collections` sidecar.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use medgraph_core::error::{MedGraphError, MedGraphResult};
use medgraph_core::traits::DocumentStore;
use medgraph_core::types::Document;
use medgraph_core::CollectionsConfig;

/// Collection the statistics are written to.
pub const STATS_COLLECTION: &str = "_collections";

/// Attribute usage of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionProfile {
    pub collection: String,
    pub document_count: u64,
    /// Top-level attributes in first-seen order.
    pub unique_attributes: Vec<String>,
    /// Number of documents carrying each attribute.
    pub attribute_counts: BTreeMap<String, u64>,
}

impl CollectionProfile {
    /// Profile a set of documents.
    pub fn from_documents(collection: impl Into<String>, docs: &[Document]) -> Self {
        let mut unique_attributes = Vec::new();
        let mut attribute_counts: BTreeMap<String, u64> = BTreeMap::new();
        for doc in docs {
            for key in doc.keys() {
                let count = attribute_counts.entry(key.clone()).or_insert(0);
                if *count == 0 {
                    unique_attributes.push(key.clone());
                }
                *count += 1;
            }
        }
        Self {
            collection: collection.into(),
            document_count: docs.len() as u64,
            unique_attributes,
            attribute_counts,
        }
    }
}

/// Profile every configured collection and upsert the results into
/// `_collections`, one document per collection.
///
/// Collections missing from the store are profiled as empty.
pub async fn profile_collections(
    store: &dyn DocumentStore,
    collections: &CollectionsConfig,
) -> MedGraphResult<Vec<CollectionProfile>> {
    let mut profiles = Vec::new();
    for collection in collections.all() {
        let docs = store.find_all(collection).await?;
        let profile = CollectionProfile::from_documents(collection, &docs);
        debug!(collection, documents = profile.document_count, "Profiled collection");

        let mut filter = Document::new();
        filter.insert("collection".to_string(), collection.into());
        let replacement = match serde_json::to_value(&profile)? {
            serde_json::Value::Object(map) => map,
            _ => return Err(MedGraphError::internal("collection profile serialized to a non-object")),
        };
        store.replace_one(STATS_COLLECTION, filter, replacement).await?;
        profiles.push(profile);
    }
    info!(collections = profiles.len(), "Collection statistics written");
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medgraph_core::store::MemoryDocumentStore;
    use serde_json::json;

    #[test]
    fn test_profile_counts_attributes() {
        let docs: Vec<Document> = vec![
            json!({"primaryDomainId": "a", "synonyms": []}),
            json!({"primaryDomainId": "b", "displayName": "B"}),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();

        let profile = CollectionProfile::from_documents("gene", &docs);
        assert_eq!(profile.document_count, 2);
        assert_eq!(profile.attribute_counts["primaryDomainId"], 2);
        assert_eq!(profile.attribute_counts["displayName"], 1);
        assert_eq!(profile.unique_attributes.len(), 3);
    }

    #[tokio::test]
    async fn test_profiles_upserted_by_collection() {
        let store = MemoryDocumentStore::new();
        let collections = CollectionsConfig {
            nodes: vec!["gene".to_string()],
            edges: vec!["protein_encoded_by_gene".to_string()],
        };

        profile_collections(&store, &collections).await.unwrap();
        let profiles = profile_collections(&store, &collections).await.unwrap();
        assert_eq!(profiles.len(), 2);

        let stored = store.find_all(STATS_COLLECTION).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|d| d["document_count"] == json!(0)));
    }
}
