//! Build metadata: the graph version and the age of each source download.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::error::{MedGraphError, MedGraphResult};
use crate::traits::DocumentStore;
use crate::types::{fields, Document};

/// Collection holding the single metadata document.
pub const METADATA_COLLECTION: &str = "metadata";

/// Version used when no metadata document exists yet.
pub const DEFAULT_VERSION: &str = "2.0.0";

/// Which component of `major.minor.patch` to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VersionPart {
    Major,
    Minor,
    Patch,
}

/// Where one source's files came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceVersion {
    /// Upstream release, when the source publishes one.
    pub version: Option<String>,
    /// Date of the oldest downloaded file, `YYYY-MM-DD`.
    pub date: String,
}

/// The single document of the `metadata` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMetadata {
    pub version: String,
    pub source_databases: BTreeMap<String, SourceVersion>,
}

impl BuildMetadata {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            source_databases: BTreeMap::new(),
        }
    }
}

/// Bump `current` and attach optional pre-release and build tags.
///
/// Existing tags on `current` are discarded. `part = None` keeps the numbers.
///
/// ```ignore
/// assert_eq!(next_version("2.0.0", Some(VersionPart::Minor), None, None)?, "2.1.0");
/// assert_eq!(next_version("2.1.3", Some(VersionPart::Major), Some("rc1"), Some("42"))?, "3.0.0-rc1+42");
/// ```
pub fn next_version(
    current: &str,
    part: Option<VersionPart>,
    pre_release: Option<&str>,
    build: Option<&str>,
) -> MedGraphResult<String> {
    let core = current
        .split(['-', '+'])
        .next()
        .unwrap_or_default();
    let numbers: Vec<u64> = core
        .split('.')
        .map(|n| n.parse::<u64>())
        .collect::<Result<_, _>>()
        .map_err(|_| MedGraphError::validation(format!("invalid version '{}'", current)))?;
    let [mut major, mut minor, mut patch] = numbers[..] else {
        return Err(MedGraphError::validation(format!(
            "version '{}' is not major.minor.patch",
            current
        )));
    };

    match part {
        Some(VersionPart::Major) => {
            major += 1;
            minor = 0;
            patch = 0;
        }
        Some(VersionPart::Minor) => {
            minor += 1;
            patch = 0;
        }
        Some(VersionPart::Patch) => patch += 1,
        None => {}
    }

    let mut version = format!("{}.{}.{}", major, minor, patch);
    if let Some(pre) = pre_release.filter(|p| !p.is_empty()) {
        version.push('-');
        version.push_str(pre);
    }
    if let Some(build) = build.filter(|b| !b.is_empty()) {
        version.push('+');
        version.push_str(build);
    }
    Ok(version)
}

/// Read the stored version, or `default` when there is no metadata yet.
pub async fn current_version(store: &dyn DocumentStore, default: &str) -> MedGraphResult<String> {
    let docs = store.find_all(METADATA_COLLECTION).await?;
    match docs.as_slice() {
        [] => Ok(default.to_string()),
        [doc] => doc
            .get("version")
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| MedGraphError::validation("metadata document does not have a version")),
        _ => Err(MedGraphError::validation(
            "metadata collection has more than one document in it",
        )),
    }
}

/// Replace the metadata document.
pub async fn write_metadata(store: &dyn DocumentStore, metadata: &BuildMetadata) -> MedGraphResult<()> {
    let mut replacement: Document = match serde_json::to_value(metadata)? {
        serde_json::Value::Object(map) => map,
        _ => return Err(MedGraphError::internal("metadata serialized to a non-object")),
    };
    replacement.remove(fields::OBJECT_ID);
    store
        .replace_one(METADATA_COLLECTION, Document::new(), replacement)
        .await?;
    debug!(version = %metadata.version, "Metadata written");
    Ok(())
}

/// Date each source directory under `download_dir` by its oldest file.
///
/// Every immediate subdirectory is one source. Directories without files
/// are skipped.
pub fn source_dates(download_dir: impl AsRef<Path>) -> MedGraphResult<BTreeMap<String, SourceVersion>> {
    let mut sources = BTreeMap::new();
    for entry in std::fs::read_dir(download_dir.as_ref())? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let mut earliest: Option<NaiveDate> = None;
        for file in std::fs::read_dir(entry.path())? {
            let file = file?;
            if !file.file_type()?.is_file() {
                continue;
            }
            let modified: DateTime<Local> = file.metadata()?.modified()?.into();
            let date = modified.date_naive();
            earliest = Some(earliest.map_or(date, |e| e.min(date)));
        }
        if let Some(date) = earliest {
            sources.insert(
                entry.file_name().to_string_lossy().into_owned(),
                SourceVersion {
                    version: None,
                    date: date.format("%Y-%m-%d").to_string(),
                },
            );
        }
    }
    Ok(sources)
}
