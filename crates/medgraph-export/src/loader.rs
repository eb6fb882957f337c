//! External bulk loader invocation.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info};

use medgraph_core::error::{MedGraphError, MedGraphResult};
use medgraph_core::LoaderConfig;

/// Runs the graph store's offline bulk importer over generated files.
#[derive(Debug, Clone)]
pub struct BulkLoader {
    config: LoaderConfig,
    array_delimiter: char,
}

impl BulkLoader {
    pub fn new(config: LoaderConfig, array_delimiter: char) -> Self {
        Self {
            config,
            array_delimiter,
        }
    }

    /// Path of a generated file as the loader sees it.
    fn loader_path(&self, file: &Path) -> String {
        match (&self.config.import_dir, file.file_name()) {
            (Some(dir), Some(name)) => dir.join(name).display().to_string(),
            _ => file.display().to_string(),
        }
    }

    /// Full argument list, after the program name.
    pub fn args(&self, nodes: &[PathBuf], edges: &[PathBuf]) -> Vec<String> {
        let mut args = self.config.args.clone();
        args.push(format!("--array-delimiter={}", self.array_delimiter));
        if self.config.multiline_fields {
            args.push("--multiline-fields=true".to_string());
        }
        for node in nodes {
            args.push("--nodes".to_string());
            args.push(self.loader_path(node));
        }
        for edge in edges {
            args.push("--relationships".to_string());
            args.push(self.loader_path(edge));
        }
        args
    }

    /// Run the loader and wait for it. A non-zero exit is an error.
    pub async fn run(&self, nodes: &[PathBuf], edges: &[PathBuf]) -> MedGraphResult<()> {
        let args = self.args(nodes, edges);
        debug!(program = %self.config.program, ?args, "Starting bulk loader");

        let status = Command::new(&self.config.program)
            .args(&args)
            .status()
            .await
            .map_err(|e| {
                MedGraphError::loader(format!("Failed to start {}: {}", self.config.program, e), None)
            })?;

        if !status.success() {
            return Err(MedGraphError::loader(
                format!("{} exited with {}", self.config.program, status),
                status.code(),
            ));
        }

        info!(nodes = nodes.len(), edges = edges.len(), "Bulk load complete");
        Ok(())
    }
}
