//! Core traits for medgraph backends.

mod document_store;

pub use document_store::*;
