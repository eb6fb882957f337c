//! Entity merge engine.
//!
//! [`build_upsert`] turns a partial record into an idempotent upsert;
//! [`MergeEngine`] batches upserts into bulk writes against a
//! [`DocumentStore`](crate::traits::DocumentStore).

mod build;
mod engine;

pub use build::{build_upsert, build_upsert_at};
pub use engine::{MergeEngine, MergeStats};
