//! Core types for medgraph.

mod instruction;
mod key;
mod schema;

pub use instruction::*;
pub use key::{fields, EntityKey, KeyShape};
pub use schema::*;
