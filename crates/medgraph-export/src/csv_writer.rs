//! Serialization of flattened documents against an [`ExportSchema`].

use std::io::Write;
use std::path::Path;

use serde_json::Value;

use medgraph_core::error::{MedGraphError, MedGraphResult};
use medgraph_core::types::{fields, Document};

use crate::inference::{ColumnRole, ExportSchema};

/// Render one cell. Lists are joined with `array_delimiter`, unescaped.
pub fn render_cell(value: Option<&Value>, array_delimiter: char) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| render_cell(Some(v), array_delimiter))
            .collect::<Vec<_>>()
            .join(&array_delimiter.to_string()),
        Some(other) => other.to_string(),
    }
}

fn row(schema: &ExportSchema, doc: &Document, array_delimiter: char) -> Vec<String> {
    schema
        .columns
        .iter()
        .map(|column| match column.role {
            ColumnRole::Label | ColumnRole::Type | ColumnRole::LabelProperty => doc
                .get(fields::TYPE)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or(&schema.default_label)
                .to_string(),
            _ => render_cell(doc.get(&column.name), array_delimiter),
        })
        .collect()
}

/// Write a header row and one row per document. Returns the row count.
pub fn write_documents<W: Write>(
    writer: W,
    schema: &ExportSchema,
    docs: &[Document],
    array_delimiter: char,
) -> MedGraphResult<u64> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(schema.headers())
        .map_err(|e| MedGraphError::export_with_source("Failed to write header", e))?;

    let mut rows = 0;
    for doc in docs {
        csv.write_record(row(schema, doc, array_delimiter))
            .map_err(|e| MedGraphError::export_with_source("Failed to write row", e))?;
        rows += 1;
    }
    csv.flush()?;
    Ok(rows)
}

/// Write an import file at `path`.
pub fn write_file(
    path: impl AsRef<Path>,
    schema: &ExportSchema,
    docs: &[Document],
    array_delimiter: char,
) -> MedGraphResult<u64> {
    let file = std::fs::File::create(path.as_ref()).map_err(|e| {
        MedGraphError::export_with_source(format!("Failed to create {}", path.as_ref().display()), e)
    })?;
    write_documents(std::io::BufWriter::new(file), schema, docs, array_delimiter)
}
