//! Drug records: a shared base payload plus a variant-specific payload.
//!
//! Biotech and small-molecule drugs share one `drug` collection. The variant
//! selects both the label written to `type` and the extra attributes merged
//! into the document.

use serde::{Deserialize, Serialize};

use super::Entity;
use crate::error::{MedGraphError, MedGraphResult};
use crate::types::{Document, EntityKey, EntityKind, EntitySchema, FieldSpec, KeyShape};

pub const DRUG: EntitySchema = EntitySchema {
    collection: "drug",
    label: "Drug",
    kind: EntityKind::Node,
    key: KeyShape::Primary,
    fields: &[
        FieldSpec::union("domainIds"),
        FieldSpec::overwrite("primaryDataset"),
        FieldSpec::union("allDatasets"),
        FieldSpec::overwrite("displayName"),
        FieldSpec::union("synonyms"),
        FieldSpec::overwrite("description"),
        FieldSpec::union("drugCategories"),
        FieldSpec::union("drugGroups"),
        FieldSpec::overwrite("casNumber"),
        FieldSpec::overwrite("indication"),
        // Biotech
        FieldSpec::union("sequences"),
        // Small molecule
        FieldSpec::overwrite("iupacName"),
        FieldSpec::overwrite("smiles"),
        FieldSpec::overwrite("inchi"),
        FieldSpec::overwrite("molecularFormula"),
    ],
    required: &[],
    indexes: &["domainIds"],
};

/// Attributes every drug carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrugBase {
    pub primary_domain_id: String,
    pub domain_ids: Vec<String>,
    pub primary_dataset: Option<String>,
    pub all_datasets: Vec<String>,
    pub display_name: Option<String>,
    pub synonyms: Vec<String>,
    pub description: Option<String>,
    pub drug_categories: Vec<String>,
    pub drug_groups: Vec<String>,
    pub cas_number: Option<String>,
    pub indication: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiotechDetails {
    #[serde(default)]
    pub sequences: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmallMoleculeDetails {
    pub iupac_name: Option<String>,
    pub smiles: Option<String>,
    pub inchi: Option<String>,
    pub molecular_formula: Option<String>,
}

/// Variant-specific drug payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DrugVariant {
    #[serde(rename = "BiotechDrug")]
    Biotech(BiotechDetails),
    #[serde(rename = "SmallMoleculeDrug")]
    SmallMolecule(SmallMoleculeDetails),
}

impl DrugVariant {
    /// Label written to the document's `type` field.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Biotech(_) => "BiotechDrug",
            Self::SmallMolecule(_) => "SmallMoleculeDrug",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drug {
    #[serde(flatten)]
    pub base: DrugBase,
    #[serde(flatten)]
    pub variant: DrugVariant,
}

impl Drug {
    pub fn biotech(base: DrugBase, sequences: Vec<String>) -> Self {
        Self {
            base,
            variant: DrugVariant::Biotech(BiotechDetails { sequences }),
        }
    }

    pub fn small_molecule(base: DrugBase, details: SmallMoleculeDetails) -> Self {
        Self {
            base,
            variant: DrugVariant::SmallMolecule(details),
        }
    }
}

fn object(value: serde_json::Value) -> MedGraphResult<Document> {
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(MedGraphError::internal(format!(
            "drug payload serialized to a non-object: {}",
            other
        ))),
    }
}

impl Entity for Drug {
    const SCHEMA: &'static EntitySchema = &DRUG;

    fn key(&self) -> EntityKey {
        EntityKey::primary(&self.base.primary_domain_id)
    }

    fn label(&self) -> &'static str {
        self.variant.label()
    }

    fn attributes(&self) -> MedGraphResult<Document> {
        let mut attributes = object(serde_json::to_value(&self.base)?)?;
        let details = match &self.variant {
            DrugVariant::Biotech(details) => serde_json::to_value(details)?,
            DrugVariant::SmallMolecule(details) => serde_json::to_value(details)?,
        };
        attributes.extend(object(details)?);
        Ok(attributes)
    }
}
