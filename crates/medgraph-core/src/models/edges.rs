//! Edge records.
//!
//! Directed edges are keyed by `(sourceDomainId, targetDomainId)`. Protein
//! interactions are undirected and keyed by the sorted member pair. Variant
//! to disorder associations are keyed by their ClinVar accession.

use serde::{Deserialize, Serialize};

use super::Entity;
use crate::types::{EntityKey, EntityKind, EntitySchema, FieldSpec, KeyShape};

const fn directed(
    collection: &'static str,
    label: &'static str,
    fields: &'static [FieldSpec],
) -> EntitySchema {
    EntitySchema {
        collection,
        label,
        kind: EntityKind::Edge,
        key: KeyShape::Directed,
        fields,
        required: &[],
        indexes: &["sourceDomainId", "targetDomainId"],
    }
}

pub const DISORDER_IS_SUBTYPE_OF_DISORDER: EntitySchema = directed(
    "disorder_is_subtype_of_disorder",
    "DisorderIsSubtypeOfDisorder",
    &[FieldSpec::union("dataSources")],
);

pub const DRUG_HAS_CONTRAINDICATION: EntitySchema =
    directed("drug_has_contraindication", "DrugHasContraindication", &[]);

pub const DRUG_HAS_INDICATION: EntitySchema = directed(
    "drug_has_indication",
    "DrugHasIndication",
    &[FieldSpec::union("assertedBy")],
);

pub const DRUG_HAS_SIDE_EFFECT: EntitySchema = directed(
    "drug_has_side_effect",
    "DrugHasSideEffect",
    &[
        FieldSpec::max("maximum_frequency"),
        FieldSpec::min("minimum_frequency"),
        FieldSpec::union("assertedBy"),
    ],
);

pub const DRUG_HAS_TARGET: EntitySchema = directed(
    "drug_has_target",
    "DrugHasTarget",
    &[FieldSpec::union("actions"), FieldSpec::union("databases")],
);

pub const GENE_ASSOCIATED_WITH_DISORDER: EntitySchema = directed(
    "gene_associated_with_disorder",
    "GeneAssociatedWithDisorder",
    &[FieldSpec::union("assertedBy"), FieldSpec::overwrite("score")],
);

pub const GENE_EXPRESSED_IN_TISSUE: EntitySchema = directed(
    "gene_expressed_in_tissue",
    "GeneExpressedInTissue",
    &[
        FieldSpec::overwrite("TPM"),
        FieldSpec::overwrite("nTPM"),
        FieldSpec::overwrite("pTPM"),
    ],
);

pub const GO_IS_SUBTYPE_OF_GO: EntitySchema = directed("go_is_subtype_of_go", "GOIsSubtypeOfGO", &[]);

pub const PROTEIN_ENCODED_BY_GENE: EntitySchema =
    directed("protein_encoded_by_gene", "ProteinEncodedByGene", &[]);

pub const PROTEIN_EXPRESSED_IN_TISSUE: EntitySchema = directed(
    "protein_expressed_in_tissue",
    "ProteinExpressedInTissue",
    &[FieldSpec::overwrite("level")],
);

pub const PROTEIN_HAS_GO_ANNOTATION: EntitySchema = directed(
    "protein_has_go_annotation",
    "ProteinHasGOAnnotation",
    &[FieldSpec::union("qualifiers"), FieldSpec::union("dataSources")],
);

pub const PROTEIN_HAS_SIGNATURE: EntitySchema =
    directed("protein_has_signature", "ProteinHasSignature", &[]);

pub const PROTEIN_IN_PATHWAY: EntitySchema = directed("protein_in_pathway", "ProteinInPathway", &[]);

pub const PROTEIN_INTERACTS_WITH_PROTEIN: EntitySchema = EntitySchema {
    collection: "protein_interacts_with_protein",
    label: "ProteinInteractsWithProtein",
    kind: EntityKind::Edge,
    key: KeyShape::Undirected,
    fields: &[
        FieldSpec::union("evidenceTypes"),
        FieldSpec::union("methods"),
        FieldSpec::union("databases"),
    ],
    required: &[],
    indexes: &["memberOne", "memberTwo"],
};

pub const SIDE_EFFECT_SAME_AS_PHENOTYPE: EntitySchema = directed(
    "side_effect_same_as_phenotype",
    "SideEffectSameAsPhenotype",
    &[FieldSpec::union("assertedBy")],
);

pub const VARIANT_AFFECTS_GENE: EntitySchema = directed("variant_affects_gene", "VariantAffectsGene", &[]);

pub const VARIANT_ASSOCIATED_WITH_DISORDER: EntitySchema = EntitySchema {
    collection: "variant_associated_with_disorder",
    label: "VariantAssociatedWithDisorder",
    kind: EntityKind::Edge,
    key: KeyShape::Accession,
    fields: &[
        FieldSpec::overwrite("sourceDomainId"),
        FieldSpec::overwrite("targetDomainId"),
        FieldSpec::overwrite("reviewStatus"),
        FieldSpec::union("effects"),
    ],
    required: &["sourceDomainId", "targetDomainId"],
    indexes: &["sourceDomainId", "targetDomainId"],
};

/// Implements [`Entity`] for an edge keyed by `(source_domain_id, target_domain_id)`.
macro_rules! directed_entity {
    ($ty:ty, $schema:expr) => {
        impl Entity for $ty {
            const SCHEMA: &'static EntitySchema = &$schema;

            fn key(&self) -> EntityKey {
                EntityKey::directed(&self.source_domain_id, &self.target_domain_id)
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisorderIsSubtypeOfDisorder {
    pub source_domain_id: String,
    pub target_domain_id: String,
    pub data_sources: Vec<String>,
}
directed_entity!(DisorderIsSubtypeOfDisorder, DISORDER_IS_SUBTYPE_OF_DISORDER);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrugHasContraindication {
    pub source_domain_id: String,
    pub target_domain_id: String,
}
directed_entity!(DrugHasContraindication, DRUG_HAS_CONTRAINDICATION);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrugHasIndication {
    pub source_domain_id: String,
    pub target_domain_id: String,
    pub asserted_by: Vec<String>,
}
directed_entity!(DrugHasIndication, DRUG_HAS_INDICATION);

/// Drug side effect with the observed frequency range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrugHasSideEffect {
    pub source_domain_id: String,
    pub target_domain_id: String,
    #[serde(rename = "maximum_frequency")]
    pub maximum_frequency: Option<f64>,
    #[serde(rename = "minimum_frequency")]
    pub minimum_frequency: Option<f64>,
    pub asserted_by: Vec<String>,
}
directed_entity!(DrugHasSideEffect, DRUG_HAS_SIDE_EFFECT);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrugHasTarget {
    pub source_domain_id: String,
    pub target_domain_id: String,
    pub actions: Vec<String>,
    pub databases: Vec<String>,
}
directed_entity!(DrugHasTarget, DRUG_HAS_TARGET);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneAssociatedWithDisorder {
    pub source_domain_id: String,
    pub target_domain_id: String,
    pub asserted_by: Vec<String>,
    pub score: Option<f64>,
}
directed_entity!(GeneAssociatedWithDisorder, GENE_ASSOCIATED_WITH_DISORDER);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneExpressedInTissue {
    pub source_domain_id: String,
    pub target_domain_id: String,
    #[serde(rename = "TPM")]
    pub tpm: Option<f64>,
    #[serde(rename = "nTPM")]
    pub n_tpm: Option<f64>,
    #[serde(rename = "pTPM")]
    pub p_tpm: Option<f64>,
}
directed_entity!(GeneExpressedInTissue, GENE_EXPRESSED_IN_TISSUE);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoIsSubtypeOfGo {
    pub source_domain_id: String,
    pub target_domain_id: String,
}
directed_entity!(GoIsSubtypeOfGo, GO_IS_SUBTYPE_OF_GO);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProteinEncodedByGene {
    pub source_domain_id: String,
    pub target_domain_id: String,
}
directed_entity!(ProteinEncodedByGene, PROTEIN_ENCODED_BY_GENE);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProteinExpressedInTissue {
    pub source_domain_id: String,
    pub target_domain_id: String,
    pub level: Option<String>,
}
directed_entity!(ProteinExpressedInTissue, PROTEIN_EXPRESSED_IN_TISSUE);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProteinHasGoAnnotation {
    pub source_domain_id: String,
    pub target_domain_id: String,
    pub qualifiers: Vec<String>,
    pub data_sources: Vec<String>,
}
directed_entity!(ProteinHasGoAnnotation, PROTEIN_HAS_GO_ANNOTATION);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProteinHasSignature {
    pub source_domain_id: String,
    pub target_domain_id: String,
}
directed_entity!(ProteinHasSignature, PROTEIN_HAS_SIGNATURE);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProteinInPathway {
    pub source_domain_id: String,
    pub target_domain_id: String,
}
directed_entity!(ProteinInPathway, PROTEIN_IN_PATHWAY);

/// Physical protein-protein interaction. Undirected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProteinInteractsWithProtein {
    pub member_one: String,
    pub member_two: String,
    pub evidence_types: Vec<String>,
    pub methods: Vec<String>,
    pub databases: Vec<String>,
}

impl Entity for ProteinInteractsWithProtein {
    const SCHEMA: &'static EntitySchema = &PROTEIN_INTERACTS_WITH_PROTEIN;

    fn key(&self) -> EntityKey {
        EntityKey::undirected(&self.member_one, &self.member_two)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SideEffectSameAsPhenotype {
    pub source_domain_id: String,
    pub target_domain_id: String,
    pub asserted_by: Vec<String>,
}
directed_entity!(SideEffectSameAsPhenotype, SIDE_EFFECT_SAME_AS_PHENOTYPE);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariantAffectsGene {
    pub source_domain_id: String,
    pub target_domain_id: String,
}
directed_entity!(VariantAffectsGene, VARIANT_AFFECTS_GENE);

/// ClinVar variant-disorder assertion. The endpoints are attributes, but a
/// record without both is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariantAssociatedWithDisorder {
    pub accession: String,
    pub source_domain_id: Option<String>,
    pub target_domain_id: Option<String>,
    pub review_status: Option<String>,
    pub effects: Vec<String>,
}

impl Entity for VariantAssociatedWithDisorder {
    const SCHEMA: &'static EntitySchema = &VARIANT_ASSOCIATED_WITH_DISORDER;

    fn key(&self) -> EntityKey {
        EntityKey::accession(&self.accession)
    }
}
