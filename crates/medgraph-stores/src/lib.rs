//! medgraph-stores - Document store implementations for medgraph.
//!
//! # Supported Backends
//!
//! - **MongoDB** (feature: `mongodb`, default) - canonical store for production builds
//! - **Memory** - process-local store from `medgraph-core`, always available

mod factory;

#[cfg(feature = "mongodb")]
mod mongodb;

pub use factory::DocumentStoreFactory;

#[cfg(feature = "mongodb")]
pub use crate::mongodb::MongoDocumentStore;
