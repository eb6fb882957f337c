//! Store implementations that live in the core crate.

mod memory;

pub use memory::MemoryDocumentStore;
