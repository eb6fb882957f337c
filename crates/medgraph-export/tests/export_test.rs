//! Integration tests for the graph export.
//!
//! Populates an in-memory store through the merge engine and checks the
//! generated import files and the loader handling.

use std::sync::Arc;

use medgraph_core::models::{Protein, ProteinInteractsWithProtein};
use medgraph_core::store::MemoryDocumentStore;
use medgraph_core::types::{EntityKey, UpsertInstruction};
use medgraph_core::{
    CollectionsConfig, DocumentStore, ExportConfig, LoaderConfig, MedGraphError, MergeConfig, MergeEngine,
};
use medgraph_export::GraphExporter;
use serde_json::json;

async fn populated_store() -> Arc<MemoryDocumentStore> {
    let store = Arc::new(MemoryDocumentStore::new());
    let engine = MergeEngine::new(store.clone(), MergeConfig::default());

    engine
        .submit(vec![
            Protein {
                primary_domain_id: "uniprot.P1".to_string(),
                display_name: Some("AATM_RABIT".to_string()),
                synonyms: vec!["a".to_string(), "b".to_string()],
                ..Default::default()
            },
            Protein {
                primary_domain_id: "uniprot.P2".to_string(),
                ..Default::default()
            },
        ])
        .await
        .unwrap();

    engine
        .submit(vec![ProteinInteractsWithProtein {
            member_one: "uniprot.P2".to_string(),
            member_two: "uniprot.P1".to_string(),
            methods: vec!["two hybrid".to_string()],
            ..Default::default()
        }])
        .await
        .unwrap();

    store
}

fn collections() -> CollectionsConfig {
    CollectionsConfig {
        nodes: vec!["protein".to_string(), "gene".to_string()],
        edges: vec!["protein_interacts_with_protein".to_string()],
    }
}

fn export_config(dir: &std::path::Path, program: &str) -> ExportConfig {
    ExportConfig {
        workdir: dir.to_path_buf(),
        loader: LoaderConfig {
            program: program.to_string(),
            args: vec![],
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_import_files() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = GraphExporter::new(populated_store().await, export_config(dir.path(), "true"), collections());

    let report = exporter.write_files().await.unwrap();
    assert_eq!(report.nodes.len(), 1, "absent collections are skipped");
    assert_eq!(report.edges.len(), 1);

    let nodes = std::fs::read_to_string(dir.path().join("protein.csv")).unwrap();
    let lines: Vec<&str> = nodes.lines().collect();
    assert_eq!(lines[0], "primaryDomainId:ID,:LABEL,displayName:string,synonyms:string[]");
    assert_eq!(lines[1], "uniprot.P1,Protein,AATM_RABIT,a|b");
    assert_eq!(lines[2], "uniprot.P2,Protein,,");

    let edges = std::fs::read_to_string(dir.path().join("protein_interacts_with_protein.csv")).unwrap();
    let lines: Vec<&str> = edges.lines().collect();
    assert_eq!(lines[0], "memberOne:START_ID,memberTwo:END_ID,methods:string[],:TYPE");
    assert_eq!(lines[1], "uniprot.P1,uniprot.P2,two hybrid,ProteinInteractsWithProtein");
}

#[tokio::test]
async fn test_inconsistent_column_dropped() {
    let store = populated_store().await;
    let now = chrono::Utc::now();
    let mut first = UpsertInstruction::new("protein", EntityKey::primary("uniprot.P1"), "Protein", now);
    first.set.insert("score".to_string(), json!(1));
    let mut second = UpsertInstruction::new("protein", EntityKey::primary("uniprot.P2"), "Protein", now);
    second.set.insert("score".to_string(), json!(2.5));
    store.apply_batch("protein", &[first, second]).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let exporter = GraphExporter::new(store, export_config(dir.path(), "true"), collections());
    let report = exporter.write_files().await.unwrap();

    assert_eq!(report.nodes[0].dropped.len(), 1);
    assert_eq!(report.nodes[0].dropped[0].name, "score");
    assert!(!report.nodes[0].headers.iter().any(|h| h.starts_with("score")));
}

#[cfg(unix)]
#[tokio::test]
async fn test_files_removed_after_load() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = GraphExporter::new(populated_store().await, export_config(dir.path(), "true"), collections());

    let report = exporter.export().await.unwrap();
    assert_eq!(report.nodes[0].rows, 2);
    assert!(!dir.path().join("protein.csv").exists());
    assert!(!dir.path().join("protein_interacts_with_protein.csv").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_files_removed_after_failed_load() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = GraphExporter::new(populated_store().await, export_config(dir.path(), "false"), collections());

    let err = exporter.export().await.unwrap_err();
    assert!(matches!(err, MedGraphError::Loader { .. }));
    assert!(!dir.path().join("protein.csv").exists());
}
