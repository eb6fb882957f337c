//! Column type inference for bulk import files.
//!
//! Every value of a column is scanned and must agree on one type. Columns
//! that cannot be typed are dropped; the rest of the export goes on.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::warn;

use medgraph_core::error::{MedGraphError, MedGraphResult};
use medgraph_core::types::{fields, Document, EntityKind};

/// Scalar type tags understood by the bulk loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Boolean,
    Int,
    Double,
    String,
}

impl ScalarType {
    /// Classify a non-null scalar value.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(_) => Some(Self::Boolean),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Self::Int),
            Value::Number(_) => Some(Self::Double),
            Value::String(_) => Some(Self::String),
            _ => None,
        }
    }
}

/// A scalar type, optionally multi-valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnType {
    pub scalar: ScalarType,
    pub array: bool,
}

impl ColumnType {
    pub fn scalar(scalar: ScalarType) -> Self {
        Self { scalar, array: false }
    }

    pub fn array(scalar: ScalarType) -> Self {
        Self { scalar, array: true }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.array {
            write!(f, "{}[]", self.scalar)
        } else {
            write!(f, "{}", self.scalar)
        }
    }
}

/// What a column means to the bulk loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnRole {
    /// Node identifier.
    Id,
    /// Node label.
    Label,
    /// Edge start node.
    StartId,
    /// Edge end node.
    EndId,
    /// Edge type.
    Type,
    /// Copy of the label kept as a `type:string` property.
    LabelProperty,
    /// Typed property.
    Property(ColumnType),
}

/// One column of an import file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportColumn {
    /// Flattened source field name.
    pub name: String,
    pub role: ColumnRole,
}

impl ExportColumn {
    /// Header cell for the import file.
    pub fn header(&self) -> String {
        match self.role {
            ColumnRole::Id => format!("{}:ID", self.name),
            ColumnRole::Label => ":LABEL".to_string(),
            ColumnRole::StartId => format!("{}:START_ID", self.name),
            ColumnRole::EndId => format!("{}:END_ID", self.name),
            ColumnRole::Type => ":TYPE".to_string(),
            ColumnRole::LabelProperty => format!("{}:string", fields::TYPE),
            ColumnRole::Property(ty) => format!("{}:{}", self.name, ty),
        }
    }
}

/// A column left out of the import file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedColumn {
    pub name: String,
    pub reason: String,
}

/// Column layout of one collection's import file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSchema {
    pub kind: EntityKind,
    /// Label written when a document carries no `type`.
    pub default_label: String,
    pub columns: Vec<ExportColumn>,
    /// Columns with conflicting types. Columns without values are not listed.
    pub dropped: Vec<DroppedColumn>,
}

impl ExportSchema {
    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(ExportColumn::header).collect()
    }

    /// Identifier roles the bulk loader needs but no column provides.
    pub fn missing_roles(&self) -> Vec<ColumnRole> {
        let required: &[ColumnRole] = match self.kind {
            EntityKind::Node => &[ColumnRole::Id],
            EntityKind::Edge => &[ColumnRole::StartId, ColumnRole::EndId],
        };
        required
            .iter()
            .filter(|role| !self.columns.iter().any(|c| c.role == **role))
            .copied()
            .collect()
    }
}

/// Fields never exported.
const EXCLUDED: [&str; 4] = [fields::OBJECT_ID, fields::CLASS, fields::CREATED, fields::UPDATED];

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Infer the single type of a column from all of its values.
///
/// Returns `Ok(None)` when every value is empty, and a type inconsistency
/// error when values disagree or a list mixes element types.
pub fn infer_column_type<'a, I>(column: &str, values: I) -> MedGraphResult<Option<ColumnType>>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut inferred: Option<ColumnType> = None;

    for value in values.into_iter().filter(|v| !is_empty(v)) {
        let ty = match value {
            Value::Array(items) => {
                let elements: BTreeSet<Option<ScalarType>> = items
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(ScalarType::of)
                    .collect();
                let mut elements = elements.into_iter();
                match (elements.next(), elements.next()) {
                    (Some(Some(scalar)), None) => ColumnType::array(scalar),
                    (None, _) => continue,
                    _ => {
                        return Err(MedGraphError::type_inconsistency(
                            column,
                            format!("list elements of mixed or unsupported types: {}", value),
                        ))
                    }
                }
            }
            other => match ScalarType::of(other) {
                Some(scalar) => ColumnType::scalar(scalar),
                None => {
                    return Err(MedGraphError::type_inconsistency(
                        column,
                        format!("unsupported value {}", other),
                    ))
                }
            },
        };
        seen.insert(ty.to_string());
        inferred = Some(ty);
    }

    if seen.len() > 1 {
        return Err(MedGraphError::type_inconsistency(
            column,
            format!("values of several types: {}", seen.into_iter().collect::<Vec<_>>().join(", ")),
        ));
    }
    Ok(inferred)
}

fn reserved_role(kind: EntityKind, name: &str) -> Option<ColumnRole> {
    match (kind, name) {
        (EntityKind::Node, fields::PRIMARY_DOMAIN_ID) => Some(ColumnRole::Id),
        (EntityKind::Node, fields::TYPE) => Some(ColumnRole::Label),
        (EntityKind::Edge, fields::SOURCE_DOMAIN_ID | fields::MEMBER_ONE) => Some(ColumnRole::StartId),
        (EntityKind::Edge, fields::TARGET_DOMAIN_ID | fields::MEMBER_TWO) => Some(ColumnRole::EndId),
        (EntityKind::Edge, fields::TYPE) => Some(ColumnRole::Type),
        _ => None,
    }
}

fn role_rank(role: ColumnRole) -> u8 {
    match role {
        ColumnRole::Id | ColumnRole::StartId => 0,
        ColumnRole::Label | ColumnRole::EndId => 1,
        ColumnRole::LabelProperty => 2,
        ColumnRole::Property(_) => 3,
        ColumnRole::Type => 4,
    }
}

/// Infer the import file layout of a collection from its flattened documents.
///
/// Identifier and label columns come first, then properties by name; the
/// edge type column is always last. The label column is emitted even when no
/// document carries `type`, using `default_label`.
pub fn infer_schema(
    kind: EntityKind,
    docs: &[Document],
    default_label: &str,
    include_label_property: bool,
) -> ExportSchema {
    let names: BTreeSet<&str> = docs
        .iter()
        .flat_map(|d| d.keys().map(String::as_str))
        .filter(|k| !EXCLUDED.contains(k))
        .collect();

    let mut columns = Vec::new();
    let mut dropped = Vec::new();

    for name in names {
        if let Some(role) = reserved_role(kind, name) {
            columns.push(ExportColumn {
                name: name.to_string(),
                role,
            });
            continue;
        }
        match infer_column_type(name, docs.iter().filter_map(|d| d.get(name))) {
            Ok(Some(ty)) => columns.push(ExportColumn {
                name: name.to_string(),
                role: ColumnRole::Property(ty),
            }),
            Ok(None) => {}
            Err(e) => {
                warn!(column = name, error = %e, "Dropping column");
                dropped.push(DroppedColumn {
                    name: name.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let label_role = match kind {
        EntityKind::Node => ColumnRole::Label,
        EntityKind::Edge => ColumnRole::Type,
    };
    if !columns.iter().any(|c| c.role == label_role) {
        columns.push(ExportColumn {
            name: fields::TYPE.to_string(),
            role: label_role,
        });
    }
    if include_label_property {
        columns.push(ExportColumn {
            name: fields::TYPE.to_string(),
            role: ColumnRole::LabelProperty,
        });
    }

    columns.sort_by_key(|c| role_rank(c.role));

    let schema = ExportSchema {
        kind,
        default_label: default_label.to_string(),
        columns,
        dropped,
    };
    let missing = schema.missing_roles();
    if !docs.is_empty() && !missing.is_empty() {
        warn!(
            label = default_label,
            missing = ?missing,
            "Import file lacks identifier columns; the bulk loader will reject it"
        );
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docs(values: Vec<Value>) -> Vec<Document> {
        values
            .into_iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_list_column() {
        let values = [json!(["a", "b"]), json!(["c"])];
        assert_eq!(
            infer_column_type("synonyms", values.iter()).unwrap(),
            Some(ColumnType::array(ScalarType::String))
        );
        assert_eq!(ColumnType::array(ScalarType::String).to_string(), "string[]");
    }

    #[test]
    fn test_int_and_double_conflict() {
        let values = [json!(1), json!(2.5)];
        let err = infer_column_type("score", values.iter()).unwrap_err();
        assert!(matches!(err, MedGraphError::TypeInconsistency { .. }));

        let mixed = [json!([1, 2.5])];
        assert!(infer_column_type("score", mixed.iter()).is_err());
    }

    #[test]
    fn test_empty_values_ignored() {
        let values = [json!(null), json!(""), json!([]), json!({}), json!("x")];
        assert_eq!(
            infer_column_type("name", values.iter()).unwrap(),
            Some(ColumnType::scalar(ScalarType::String))
        );

        let empty = [json!(null), json!("")];
        assert_eq!(infer_column_type("name", empty.iter()).unwrap(), None);
    }

    #[test]
    fn test_zero_and_false_are_values() {
        let values = [json!(0), json!(false)];
        assert!(infer_column_type("flag", values.iter()).is_err());
        assert_eq!(
            infer_column_type("flag", [json!(false)].iter()).unwrap(),
            Some(ColumnType::scalar(ScalarType::Boolean))
        );
    }

    #[test]
    fn test_node_schema_layout() {
        let docs = docs(vec![
            json!({"_id": "1", "primaryDomainId": "uniprot.P1", "type": "Protein",
                   "displayName": "X", "synonyms": ["a", "b"], "created": "t", "comments": ""}),
            json!({"_id": "2", "primaryDomainId": "uniprot.P2", "type": "Protein",
                   "synonyms": ["c"], "taxid": 9606, "score": 0.5}),
            json!({"_id": "3", "primaryDomainId": "uniprot.P3", "type": "Protein", "score": 1}),
        ]);

        let schema = infer_schema(EntityKind::Node, &docs, "Protein", false);
        assert_eq!(
            schema.headers(),
            vec![
                "primaryDomainId:ID",
                ":LABEL",
                "displayName:string",
                "synonyms:string[]",
                "taxid:int"
            ]
        );
        assert_eq!(schema.dropped.len(), 1);
        assert_eq!(schema.dropped[0].name, "score");
    }

    #[test]
    fn test_edge_schema_type_last() {
        let docs = docs(vec![json!({
            "type": "ProteinInteractsWithProtein",
            "memberOne": "uniprot.P1",
            "memberTwo": "uniprot.P2",
            "methods": ["two hybrid"],
            "_cls": "Edge"
        })]);

        let schema = infer_schema(EntityKind::Edge, &docs, "ProteinInteractsWithProtein", true);
        assert_eq!(
            schema.headers(),
            vec![
                "memberOne:START_ID",
                "memberTwo:END_ID",
                "type:string",
                "methods:string[]",
                ":TYPE"
            ]
        );
    }

    #[test]
    fn test_edge_without_endpoints_reports_missing_roles() {
        let docs = docs(vec![json!({
            "type": "VariantAssociatedWithDisorder",
            "accession": "VCV000012345",
            "effects": ["pathogenic"]
        })]);

        let schema = infer_schema(EntityKind::Edge, &docs, "VariantAssociatedWithDisorder", false);
        assert_eq!(schema.missing_roles(), vec![ColumnRole::StartId, ColumnRole::EndId]);
        assert_eq!(schema.headers(), vec!["accession:string", "effects:string[]", ":TYPE"]);

        let complete = docs_with_endpoints();
        let schema = infer_schema(EntityKind::Edge, &complete, "VariantAssociatedWithDisorder", false);
        assert!(schema.missing_roles().is_empty());
    }

    fn docs_with_endpoints() -> Vec<Document> {
        docs(vec![json!({
            "accession": "VCV000012345",
            "sourceDomainId": "clinvar.12345",
            "targetDomainId": "mondo.0007739"
        })])
    }

    #[test]
    fn test_missing_label_column_added() {
        let docs = docs(vec![json!({"primaryDomainId": "go.1"})]);
        let schema = infer_schema(EntityKind::Node, &docs, "GO", false);
        assert_eq!(schema.headers(), vec!["primaryDomainId:ID", ":LABEL"]);
        assert!(schema.missing_roles().is_empty());
    }
}
