//! medgraph-core - Core library for medgraph.
//!
//! This crate provides the entity models, the merge engine and the document
//! store trait used to assemble a biomedical knowledge graph from many
//! overlapping sources.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use medgraph_core::{MergeEngine, MedGraphConfig, models::SideEffect};
//! use medgraph_core::store::MemoryDocumentStore;
//!
//! let config = MedGraphConfig::default();
//! let engine = MergeEngine::new(Arc::new(MemoryDocumentStore::new()), config.merge);
//!
//! engine.ensure_all_indexes().await?;
//! let stats = engine.submit(vec![SideEffect {
//!     primary_domain_id: "meddra.10000001".to_string(),
//!     data_sources: vec!["sider".to_string()],
//!     ..Default::default()
//! }]).await?;
//! ```

pub mod config;
pub mod error;
pub mod merge;
pub mod metadata;
pub mod models;
pub mod post_integration;
pub mod store;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{
    CollectionsConfig, ExportConfig, LoaderConfig, MedGraphConfig, MergeConfig, StoreConfig,
};
pub use error::{ErrorCode, MedGraphError, MedGraphResult};
pub use merge::{build_upsert, build_upsert_at, MergeEngine, MergeStats};
pub use metadata::{BuildMetadata, SourceVersion, VersionPart};
pub use models::Entity;
pub use post_integration::{drop_empty_collections, trim_unused_tissues};
pub use traits::{DocumentStore, StoreProvider};
pub use types::{
    BatchOutcome, Document, EntityKey, EntityKind, EntitySchema, FieldSpec, KeyShape, MergeRule,
    UpsertInstruction, WriteFailure,
};
