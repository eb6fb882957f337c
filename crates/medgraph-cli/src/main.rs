//! medgraph - build steps that run after the source parsers.
//!
//! # Configuration
//!
//! Settings are read from `--config`, else from
//! `<config dir>/medgraph/config.toml` when it exists, else defaults. The
//! `MEDGRAPH_*` environment variables (and a `.env` file) override them.
//!
//! # Usage
//!
//! ```text
//! medgraph indexes
//! medgraph trim-tissues
//! medgraph prune
//! medgraph bump-version --part minor --downloads /data/downloads
//! medgraph export
//! medgraph stats
//! medgraph finalize --downloads /data/downloads
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use medgraph_core::metadata::{self, BuildMetadata, VersionPart, DEFAULT_VERSION};
use medgraph_core::{
    drop_empty_collections, trim_unused_tissues, DocumentStore, MedGraphConfig, MergeEngine, StoreConfig,
};
use medgraph_export::{profile_collections, GraphExporter};
use medgraph_stores::DocumentStoreFactory;

#[derive(Parser)]
#[command(name = "medgraph", version, about = "Biomedical knowledge graph build steps")]
struct Cli {
    /// Configuration file (.toml, .json or .yaml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create key and secondary indexes on every catalogued collection.
    Indexes,

    /// Delete tissues no expression edge refers to.
    TrimTissues,

    /// Drop collections that ended up empty.
    Prune,

    /// Write import files for every collection and run the bulk loader.
    Export {
        /// Only write the import files; keep them and skip the loader.
        #[arg(long)]
        no_load: bool,
    },

    /// Write per-collection statistics to `_collections`.
    Stats,

    /// Bump the build version and record source download dates.
    BumpVersion {
        #[command(flatten)]
        version: VersionArgs,
    },

    /// Trim tissues, prune, bump the version, export and profile, in that order.
    Finalize {
        #[command(flatten)]
        version: VersionArgs,
    },
}

#[derive(clap::Args)]
struct VersionArgs {
    /// Version component to increment.
    #[arg(long, default_value = "minor")]
    part: VersionPart,

    /// Pre-release tag appended as `-<tag>`.
    #[arg(long)]
    pre_release: Option<String>,

    /// Build tag appended as `+<tag>`.
    #[arg(long)]
    build: Option<String>,

    /// Directory with one subdirectory of downloads per source.
    #[arg(long)]
    downloads: Option<PathBuf>,

    /// Read the current version from this store instead of the build store.
    #[arg(long)]
    live_url: Option<String>,
}

fn load_config(path: Option<&Path>) -> Result<MedGraphConfig> {
    let default_path = dirs::config_dir().map(|d| d.join("medgraph").join("config.toml"));
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| default_path.filter(|p| p.exists()));

    let mut config = match path {
        Some(path) => MedGraphConfig::from_file(&path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => MedGraphConfig::default(),
    };
    config.apply_env();
    config.validate()?;
    Ok(config)
}

async fn bump_version(
    store: &dyn DocumentStore,
    config: &MedGraphConfig,
    args: &VersionArgs,
) -> Result<String> {
    let current = match &args.live_url {
        Some(url) => {
            let live_config = StoreConfig {
                url: url.clone(),
                ..config.store.clone()
            };
            match DocumentStoreFactory::create(&live_config).await {
                Ok(live) => metadata::current_version(live.as_ref(), DEFAULT_VERSION).await?,
                Err(e) => {
                    info!(error = %e, "Live store unavailable, starting from {}", DEFAULT_VERSION);
                    DEFAULT_VERSION.to_string()
                }
            }
        }
        None => metadata::current_version(store, DEFAULT_VERSION).await?,
    };

    let next = metadata::next_version(
        &current,
        Some(args.part),
        args.pre_release.as_deref(),
        args.build.as_deref(),
    )?;

    let mut build = BuildMetadata::new(next.clone());
    if let Some(dir) = &args.downloads {
        build.source_databases = metadata::source_dates(dir)
            .with_context(|| format!("failed to read downloads in {}", dir.display()))?;
    }
    metadata::write_metadata(store, &build).await?;
    info!(from = %current, to = %next, "Version bumped");
    Ok(next)
}

async fn export(store: Arc<dyn DocumentStore>, config: &MedGraphConfig, no_load: bool) -> Result<()> {
    let exporter = GraphExporter::new(store, config.export.clone(), config.collections.clone());
    let report = if no_load {
        exporter.write_files().await?
    } else {
        exporter.export().await?
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let store = DocumentStoreFactory::create(&config.store).await?;

    match cli.command {
        Commands::Indexes => {
            MergeEngine::new(store.clone(), config.merge.clone())
                .ensure_all_indexes()
                .await?;
        }
        Commands::TrimTissues => {
            let trimmed = trim_unused_tissues(store.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&trimmed)?);
        }
        Commands::Prune => {
            let dropped = drop_empty_collections(store.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&dropped)?);
        }
        Commands::Export { no_load } => export(store, &config, no_load).await?,
        Commands::Stats => {
            let profiles = profile_collections(store.as_ref(), &config.collections).await?;
            println!("{}", serde_json::to_string_pretty(&profiles)?);
        }
        Commands::BumpVersion { version } => {
            let next = bump_version(store.as_ref(), &config, &version).await?;
            println!("{}", next);
        }
        Commands::Finalize { version } => {
            trim_unused_tissues(store.as_ref()).await?;
            drop_empty_collections(store.as_ref()).await?;
            bump_version(store.as_ref(), &config, &version).await?;
            export(store.clone(), &config, false).await?;
            profile_collections(store.as_ref(), &config.collections).await?;
            info!("Build finalized");
        }
    }

    Ok(())
}
