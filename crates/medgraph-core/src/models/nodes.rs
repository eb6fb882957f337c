//! Node records. Drugs live in [`super::drug`].

use serde::{Deserialize, Serialize};

use super::Entity;
use crate::types::{EntityKey, EntityKind, EntitySchema, FieldSpec, KeyShape};

const fn node(
    collection: &'static str,
    label: &'static str,
    fields: &'static [FieldSpec],
    indexes: &'static [&'static str],
) -> EntitySchema {
    EntitySchema {
        collection,
        label,
        kind: EntityKind::Node,
        key: KeyShape::Primary,
        fields,
        required: &[],
        indexes,
    }
}

pub const DISORDER: EntitySchema = node(
    "disorder",
    "Disorder",
    &[
        FieldSpec::union("domainIds"),
        FieldSpec::overwrite("displayName"),
        FieldSpec::union("synonyms"),
        FieldSpec::union("icd10"),
        FieldSpec::overwrite("description"),
    ],
    &["domainIds"],
);

pub const GENE: EntitySchema = node(
    "gene",
    "Gene",
    &[
        FieldSpec::union("domainIds"),
        FieldSpec::overwrite("displayName"),
        FieldSpec::union("synonyms"),
        FieldSpec::overwrite("approvedSymbol"),
        FieldSpec::union("symbols"),
        FieldSpec::overwrite("description"),
        FieldSpec::overwrite("chromosome"),
        FieldSpec::overwrite("mapLocation"),
        FieldSpec::overwrite("geneType"),
    ],
    &["domainIds", "approvedSymbol", "symbols"],
);

pub const GENOMIC_VARIANT: EntitySchema = node(
    "genomic_variant",
    "GenomicVariant",
    &[
        FieldSpec::union("domainIds"),
        FieldSpec::overwrite("chromosome"),
        FieldSpec::overwrite("position"),
        FieldSpec::union("clinicalSignificance"),
        FieldSpec::overwrite("referenceSequence"),
        FieldSpec::overwrite("alternativeSequence"),
    ],
    &["domainIds"],
);

pub const GO: EntitySchema = node(
    "go",
    "GO",
    &[
        FieldSpec::union("domainIds"),
        FieldSpec::overwrite("displayName"),
        FieldSpec::union("synonyms"),
        FieldSpec::overwrite("description"),
    ],
    &["domainIds"],
);

pub const PATHWAY: EntitySchema = node(
    "pathway",
    "Pathway",
    &[
        FieldSpec::union("domainIds"),
        FieldSpec::overwrite("displayName"),
        FieldSpec::overwrite("species"),
    ],
    &["domainIds"],
);

pub const PHENOTYPE: EntitySchema = node(
    "phenotype",
    "Phenotype",
    &[
        FieldSpec::union("domainIds"),
        FieldSpec::overwrite("displayName"),
        FieldSpec::union("synonyms"),
        FieldSpec::overwrite("description"),
    ],
    &["domainIds"],
);

pub const PROTEIN: EntitySchema = node(
    "protein",
    "Protein",
    &[
        FieldSpec::union("domainIds"),
        FieldSpec::overwrite("displayName"),
        FieldSpec::union("synonyms"),
        FieldSpec::overwrite("comments"),
        FieldSpec::overwrite("geneName"),
        FieldSpec::overwrite("taxid"),
        FieldSpec::overwrite("sequence"),
    ],
    &["domainIds", "taxid"],
);

pub const SIDE_EFFECT: EntitySchema = node(
    "side_effect",
    "SideEffect",
    &[
        FieldSpec::union("domainIds"),
        FieldSpec::overwrite("displayName"),
        FieldSpec::union("dataSources"),
    ],
    &["domainIds"],
);

pub const SIGNATURE: EntitySchema = node(
    "signature",
    "Signature",
    &[
        FieldSpec::overwrite("displayName"),
        FieldSpec::overwrite("database"),
        FieldSpec::overwrite("description"),
    ],
    &[],
);

pub const TISSUE: EntitySchema = node(
    "tissue",
    "Tissue",
    &[
        FieldSpec::union("domainIds"),
        FieldSpec::overwrite("displayName"),
        FieldSpec::overwrite("organ"),
        FieldSpec::union("dataSources"),
    ],
    &["domainIds"],
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Disorder {
    pub primary_domain_id: String,
    pub domain_ids: Vec<String>,
    pub display_name: Option<String>,
    pub synonyms: Vec<String>,
    pub icd10: Vec<String>,
    pub description: Option<String>,
}

impl Entity for Disorder {
    const SCHEMA: &'static EntitySchema = &DISORDER;

    fn key(&self) -> EntityKey {
        EntityKey::primary(&self.primary_domain_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Gene {
    pub primary_domain_id: String,
    pub domain_ids: Vec<String>,
    pub display_name: Option<String>,
    pub synonyms: Vec<String>,
    pub approved_symbol: Option<String>,
    pub symbols: Vec<String>,
    pub description: Option<String>,
    pub chromosome: Option<String>,
    pub map_location: Option<String>,
    pub gene_type: Option<String>,
}

impl Entity for Gene {
    const SCHEMA: &'static EntitySchema = &GENE;

    fn key(&self) -> EntityKey {
        EntityKey::primary(&self.primary_domain_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenomicVariant {
    pub primary_domain_id: String,
    pub domain_ids: Vec<String>,
    pub chromosome: Option<String>,
    pub position: Option<i64>,
    pub clinical_significance: Vec<String>,
    pub reference_sequence: Option<String>,
    pub alternative_sequence: Option<String>,
}

impl Entity for GenomicVariant {
    const SCHEMA: &'static EntitySchema = &GENOMIC_VARIANT;

    fn key(&self) -> EntityKey {
        EntityKey::primary(&self.primary_domain_id)
    }
}

/// Gene Ontology term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoTerm {
    pub primary_domain_id: String,
    pub domain_ids: Vec<String>,
    pub display_name: Option<String>,
    pub synonyms: Vec<String>,
    pub description: Option<String>,
}

impl Entity for GoTerm {
    const SCHEMA: &'static EntitySchema = &GO;

    fn key(&self) -> EntityKey {
        EntityKey::primary(&self.primary_domain_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pathway {
    pub primary_domain_id: String,
    pub domain_ids: Vec<String>,
    pub display_name: Option<String>,
    pub species: Option<String>,
}

impl Entity for Pathway {
    const SCHEMA: &'static EntitySchema = &PATHWAY;

    fn key(&self) -> EntityKey {
        EntityKey::primary(&self.primary_domain_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Phenotype {
    pub primary_domain_id: String,
    pub domain_ids: Vec<String>,
    pub display_name: Option<String>,
    pub synonyms: Vec<String>,
    pub description: Option<String>,
}

impl Entity for Phenotype {
    const SCHEMA: &'static EntitySchema = &PHENOTYPE;

    fn key(&self) -> EntityKey {
        EntityKey::primary(&self.primary_domain_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Protein {
    pub primary_domain_id: String,
    pub domain_ids: Vec<String>,
    pub display_name: Option<String>,
    pub synonyms: Vec<String>,
    pub comments: Option<String>,
    pub gene_name: Option<String>,
    /// NCBI taxonomy id.
    pub taxid: Option<i64>,
    pub sequence: Option<String>,
}

impl Entity for Protein {
    const SCHEMA: &'static EntitySchema = &PROTEIN;

    fn key(&self) -> EntityKey {
        EntityKey::primary(&self.primary_domain_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SideEffect {
    pub primary_domain_id: String,
    pub domain_ids: Vec<String>,
    pub display_name: Option<String>,
    pub data_sources: Vec<String>,
}

impl Entity for SideEffect {
    const SCHEMA: &'static EntitySchema = &SIDE_EFFECT;

    fn key(&self) -> EntityKey {
        EntityKey::primary(&self.primary_domain_id)
    }
}

/// Protein family/domain signature (InterPro, Pfam, PROSITE...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Signature {
    pub primary_domain_id: String,
    pub display_name: Option<String>,
    pub database: Option<String>,
    pub description: Option<String>,
}

impl Entity for Signature {
    const SCHEMA: &'static EntitySchema = &SIGNATURE;

    fn key(&self) -> EntityKey {
        EntityKey::primary(&self.primary_domain_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tissue {
    pub primary_domain_id: String,
    pub domain_ids: Vec<String>,
    pub display_name: Option<String>,
    pub organ: Option<String>,
    pub data_sources: Vec<String>,
}

impl Entity for Tissue {
    const SCHEMA: &'static EntitySchema = &TISSUE;

    fn key(&self) -> EntityKey {
        EntityKey::primary(&self.primary_domain_id)
    }
}
