//! Store to graph export: one import file per collection, then the loader.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use medgraph_core::error::MedGraphResult;
use medgraph_core::models;
use medgraph_core::traits::DocumentStore;
use medgraph_core::types::{Document, EntityKind};
use medgraph_core::{CollectionsConfig, ExportConfig};

use crate::csv_writer::write_file;
use crate::flatten::flatten;
use crate::inference::{infer_schema, DroppedColumn};
use crate::loader::BulkLoader;

/// Result of exporting one collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionExport {
    pub collection: String,
    pub kind: EntityKind,
    pub path: PathBuf,
    pub rows: u64,
    pub headers: Vec<String>,
    pub dropped: Vec<DroppedColumn>,
}

/// Result of a full export.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    pub nodes: Vec<CollectionExport>,
    pub edges: Vec<CollectionExport>,
}

impl ExportReport {
    pub fn node_files(&self) -> Vec<PathBuf> {
        self.nodes.iter().map(|c| c.path.clone()).collect()
    }

    pub fn edge_files(&self) -> Vec<PathBuf> {
        self.edges.iter().map(|c| c.path.clone()).collect()
    }

    fn files(&self) -> impl Iterator<Item = &Path> {
        self.nodes.iter().chain(self.edges.iter()).map(|c| c.path.as_path())
    }
}

/// Removes generated files when dropped.
struct GeneratedFiles(Vec<PathBuf>);

impl Drop for GeneratedFiles {
    fn drop(&mut self) {
        for path in &self.0 {
            match std::fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "Removed import file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove import file"),
            }
        }
    }
}

/// Exports the canonical collections to bulk import files.
pub struct GraphExporter {
    store: Arc<dyn DocumentStore>,
    config: ExportConfig,
    collections: CollectionsConfig,
}

impl GraphExporter {
    pub fn new(store: Arc<dyn DocumentStore>, config: ExportConfig, collections: CollectionsConfig) -> Self {
        Self {
            store,
            config,
            collections,
        }
    }

    /// Write the import files and run the bulk loader.
    ///
    /// Generated files are removed afterwards whether or not the load
    /// succeeded.
    pub async fn export(&self) -> MedGraphResult<ExportReport> {
        let mut guard = GeneratedFiles(Vec::new());
        let report = self.write_files_tracked(&mut guard.0).await?;

        BulkLoader::new(self.config.loader.clone(), self.config.array_delimiter)
            .run(&report.node_files(), &report.edge_files())
            .await?;

        info!(
            nodes = report.nodes.len(),
            edges = report.edges.len(),
            "Graph export complete"
        );
        Ok(report)
    }

    /// Write the import files without loading them. The files are kept.
    pub async fn write_files(&self) -> MedGraphResult<ExportReport> {
        let mut guard = GeneratedFiles(Vec::new());
        let report = self.write_files_tracked(&mut guard.0).await?;
        guard.0.clear();
        Ok(report)
    }

    async fn write_files_tracked(&self, written: &mut Vec<PathBuf>) -> MedGraphResult<ExportReport> {
        std::fs::create_dir_all(&self.config.workdir)?;
        let existing: HashSet<String> = self.store.list_collections().await?.into_iter().collect();

        let mut report = ExportReport::default();
        for (names, kind) in [
            (&self.collections.nodes, EntityKind::Node),
            (&self.collections.edges, EntityKind::Edge),
        ] {
            for collection in names {
                if !existing.contains(collection) {
                    debug!(collection = %collection, "Collection absent, not exported");
                    continue;
                }
                let path = self.config.workdir.join(format!("{}.csv", collection));
                written.push(path.clone());
                let export = self.export_collection(collection, kind, path).await?;
                match kind {
                    EntityKind::Node => report.nodes.push(export),
                    EntityKind::Edge => report.edges.push(export),
                }
            }
        }
        debug!(files = report.files().count(), "Import files written");
        Ok(report)
    }

    async fn export_collection(
        &self,
        collection: &str,
        kind: EntityKind,
        path: PathBuf,
    ) -> MedGraphResult<CollectionExport> {
        let docs: Vec<Document> = self
            .store
            .find_all(collection)
            .await?
            .iter()
            .map(flatten)
            .collect();

        let default_label = models::schema_for(collection)
            .map(|s| s.label)
            .unwrap_or(collection);
        let schema = infer_schema(kind, &docs, default_label, self.config.include_label_property);
        let rows = write_file(&path, &schema, &docs, self.config.array_delimiter)?;

        info!(collection, rows, columns = schema.columns.len(), dropped = schema.dropped.len(), "Exported collection");
        Ok(CollectionExport {
            collection: collection.to_string(),
            kind,
            path,
            rows,
            headers: schema.headers(),
            dropped: schema.dropped,
        })
    }
}
