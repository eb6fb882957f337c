//! Factory for creating document store providers.

use std::sync::Arc;

use medgraph_core::error::MedGraphResult;
use medgraph_core::store::MemoryDocumentStore;
use medgraph_core::traits::{DocumentStore, StoreProvider};
use medgraph_core::StoreConfig;
use tracing::info;

/// Factory for creating document store providers.
pub struct DocumentStoreFactory;

impl DocumentStoreFactory {
    /// Create a document store from the given configuration.
    pub async fn create(config: &StoreConfig) -> MedGraphResult<Arc<dyn DocumentStore>> {
        match config.provider {
            #[cfg(feature = "mongodb")]
            StoreProvider::Mongodb => {
                let store = crate::mongodb::MongoDocumentStore::new(config).await?;
                store.ping().await?;
                info!(database = %config.database, "Connected to MongoDB");
                Ok(Arc::new(store))
            }

            #[cfg(not(feature = "mongodb"))]
            StoreProvider::Mongodb => Err(medgraph_core::MedGraphError::UnsupportedProvider {
                provider: "mongodb (built without the `mongodb` feature)".to_string(),
            }),

            StoreProvider::Memory => {
                info!("Using in-memory document store");
                Ok(Arc::new(MemoryDocumentStore::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medgraph_core::MedGraphError;

    #[tokio::test]
    async fn test_create_memory_store() {
        let config = StoreConfig {
            provider: StoreProvider::Memory,
            ..Default::default()
        };
        let store = DocumentStoreFactory::create(&config).await.unwrap();
        assert!(store.list_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_mongodb_url() {
        let config = StoreConfig {
            provider: StoreProvider::Mongodb,
            url: "not-a-mongodb-url".to_string(),
            ..Default::default()
        };
        let result = DocumentStoreFactory::create(&config).await;
        assert!(matches!(
            result,
            Err(MedGraphError::Store { .. }) | Err(MedGraphError::UnsupportedProvider { .. })
        ));
    }
}
