//! medgraph-export - Graph bulk export for medgraph.
//!
//! Reads the canonical collections, infers one type per column, writes one
//! CSV import file per collection and runs the graph store's bulk loader.
//!
//! # Example
//!
//! ```ignore
//! use medgraph_export::GraphExporter;
//!
//! let exporter = GraphExporter::new(store, config.export.clone(), config.collections.clone());
//! let report = exporter.export().await?;
//! println!("{} node files loaded", report.nodes.len());
//! ```

pub mod csv_writer;
pub mod exporter;
pub mod flatten;
pub mod inference;
pub mod loader;
pub mod stats;

pub use exporter::{CollectionExport, ExportReport, GraphExporter};
pub use inference::{
    infer_column_type, infer_schema, ColumnRole, ColumnType, DroppedColumn, ExportColumn,
    ExportSchema, ScalarType,
};
pub use loader::BulkLoader;
pub use stats::{profile_collections, CollectionProfile, STATS_COLLECTION};
