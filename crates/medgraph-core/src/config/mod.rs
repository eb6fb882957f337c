//! Configuration system for medgraph.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MedGraphError, MedGraphResult};
use crate::models;
use crate::traits::StoreProvider;

/// Canonical document store connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Provider type.
    pub provider: StoreProvider,
    /// Connection URL.
    pub url: String,
    /// Database name.
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: StoreProvider::Mongodb,
            url: "mongodb://localhost:27017".to_string(),
            database: "medgraph".to_string(),
        }
    }
}

/// Merge engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Upserts per bulk write. Bounds request size only.
    /// Default: 1000
    pub batch_size: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self { batch_size: 1_000 }
    }
}

impl MergeConfig {
    /// Create a merge config with a custom batch size.
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }
}

/// External bulk loader invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Program to run.
    pub program: String,
    /// Arguments placed before the generated ones, e.g. `["import"]` or a
    /// `docker exec` prefix.
    pub args: Vec<String>,
    /// Directory the loader sees the work directory as, when it runs in a
    /// container with the work directory mounted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_dir: Option<PathBuf>,
    /// Pass `--multiline-fields=true`.
    pub multiline_fields: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            program: "neo4j-admin".to_string(),
            args: vec!["import".to_string()],
            import_dir: None,
            multiline_fields: true,
        }
    }
}

/// Graph export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where the import files are written.
    pub workdir: PathBuf,
    /// Joins the elements of multi-valued columns. Never escaped.
    pub array_delimiter: char,
    /// Also emit the label as a `type:string` property column.
    pub include_label_property: bool,
    pub loader: LoaderConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            workdir: std::env::temp_dir(),
            array_delimiter: '|',
            include_label_property: false,
            loader: LoaderConfig::default(),
        }
    }
}

/// Collections taking part in export and profiling, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionsConfig {
    pub nodes: Vec<String>,
    pub edges: Vec<String>,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            nodes: models::node_schemas().iter().map(|s| s.collection.to_string()).collect(),
            edges: models::edge_schemas().iter().map(|s| s.collection.to_string()).collect(),
        }
    }
}

impl CollectionsConfig {
    /// Node collections followed by edge collections.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().chain(self.edges.iter()).map(String::as_str)
    }
}

/// Main medgraph configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MedGraphConfig {
    pub store: StoreConfig,
    pub merge: MergeConfig,
    pub export: ExportConfig,
    pub collections: CollectionsConfig,
}

impl MedGraphConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> MedGraphResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| MedGraphError::Configuration(e.to_string()))?
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| MedGraphError::Configuration(e.to_string()))?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| MedGraphError::Configuration(e.to_string()))?,
            _ => {
                return Err(MedGraphError::Configuration(
                    "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Override fields from `MEDGRAPH_*` environment variables.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("MEDGRAPH_STORE_URL") {
            self.store.url = url;
        }
        if let Ok(database) = std::env::var("MEDGRAPH_DATABASE") {
            self.store.database = database;
        }
        if let Ok(provider) = std::env::var("MEDGRAPH_STORE_PROVIDER") {
            self.store.provider = match provider.to_lowercase().as_str() {
                "memory" => StoreProvider::Memory,
                _ => StoreProvider::Mongodb,
            };
        }
        if let Some(batch_size) = std::env::var("MEDGRAPH_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            self.merge = MergeConfig::with_batch_size(batch_size);
        }
        if let Ok(dir) = std::env::var("MEDGRAPH_EXPORT_DIR") {
            self.export.workdir = PathBuf::from(dir);
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> MedGraphResult<()> {
        if self.merge.batch_size == 0 {
            return Err(MedGraphError::Configuration("merge.batch_size must be at least 1".to_string()));
        }
        if self.export.array_delimiter == ',' {
            return Err(MedGraphError::Configuration(
                "export.array_delimiter must differ from the field delimiter ','".to_string(),
            ));
        }
        if self.export.loader.program.trim().is_empty() {
            return Err(MedGraphError::Configuration("export.loader.program is empty".to_string()));
        }
        Ok(())
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> MedGraphConfigBuilder {
        MedGraphConfigBuilder::default()
    }
}

/// Builder for MedGraphConfig.
#[derive(Default)]
pub struct MedGraphConfigBuilder {
    config: MedGraphConfig,
}

impl MedGraphConfigBuilder {
    /// Set store configuration.
    pub fn store(mut self, config: StoreConfig) -> Self {
        self.config.store = config;
        self
    }

    /// Set the merge batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.merge = MergeConfig::with_batch_size(batch_size);
        self
    }

    /// Set export configuration.
    pub fn export(mut self, config: ExportConfig) -> Self {
        self.config.export = config;
        self
    }

    /// Set the export work directory.
    pub fn workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.config.export.workdir = workdir.into();
        self
    }

    /// Restrict the exported collections.
    pub fn collections(mut self, config: CollectionsConfig) -> Self {
        self.config.collections = config;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> MedGraphConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_cover_catalogue() {
        let config = MedGraphConfig::default();
        assert_eq!(config.merge.batch_size, 1_000);
        assert_eq!(config.export.array_delimiter, '|');
        assert!(config.collections.nodes.contains(&"protein".to_string()));
        assert!(config
            .collections
            .edges
            .contains(&"protein_interacts_with_protein".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[store]
url = "mongodb://db:27020"
database = "graph_dev"

[merge]
batch_size = 250

[export]
array_delimiter = ";"

[export.loader]
program = "docker"
args = ["exec", "-u", "neo4j", "graph_dev", "neo4j-admin", "import"]
import_dir = "/import"
"#
        )
        .unwrap();

        let config = MedGraphConfig::from_file(file.path()).unwrap();
        assert_eq!(config.store.url, "mongodb://db:27020");
        assert_eq!(config.store.database, "graph_dev");
        assert_eq!(config.merge.batch_size, 250);
        assert_eq!(config.export.array_delimiter, ';');
        assert_eq!(config.export.loader.program, "docker");
        assert_eq!(config.export.loader.import_dir, Some(PathBuf::from("/import")));
        assert!(config.export.loader.multiline_fields);
        assert!(!config.collections.nodes.is_empty());
    }

    #[test]
    fn test_comma_delimiter_rejected() {
        let mut config = MedGraphConfig::default();
        config.export.array_delimiter = ',';
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(
            MedGraphConfig::from_file(file.path()),
            Err(MedGraphError::Configuration(_))
        ));
    }

    #[test]
    fn test_builder() {
        let config = MedGraphConfig::builder().batch_size(0).workdir("/data/import").build();
        assert_eq!(config.merge.batch_size, 1);
        assert_eq!(config.export.workdir, PathBuf::from("/data/import"));
    }
}
