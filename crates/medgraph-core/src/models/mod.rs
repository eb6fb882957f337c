//! Entity models for the canonical collections.
//!
//! Each record type is bound to a static [`EntitySchema`] naming its
//! collection, key shape and the merge rule of every attribute. Parsers fill
//! records; the merge engine turns them into upserts.
//!
//! # Example
//!
//! ```ignore
//! use medgraph_core::models::{Entity, Protein};
//!
//! let protein = Protein {
//!     primary_domain_id: "uniprot.P12345".to_string(),
//!     synonyms: vec!["AATM_RABIT".to_string()],
//!     ..Default::default()
//! };
//! let instruction = medgraph_core::build_upsert(&protein)?;
//! ```

mod drug;
mod edges;
mod nodes;

use serde::Serialize;

use crate::error::{MedGraphError, MedGraphResult};
use crate::types::{Document, EntityKey, EntitySchema};

pub use drug::*;
pub use edges::*;
pub use nodes::*;

/// A record that merges into one canonical collection.
pub trait Entity: Serialize {
    /// Collection, key shape and merge rules.
    const SCHEMA: &'static EntitySchema;

    /// Identity of the record within its collection.
    fn key(&self) -> EntityKey;

    /// Node label or edge type.
    fn label(&self) -> &'static str {
        Self::SCHEMA.label
    }

    /// Attribute values by stored field name. Key fields may be included;
    /// the merge engine removes them.
    fn attributes(&self) -> MedGraphResult<Document> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(MedGraphError::internal(format!(
                "{} record serialized to a non-object: {}",
                Self::SCHEMA.collection,
                other
            ))),
        }
    }
}

static NODE_SCHEMAS: [&EntitySchema; 11] = [
    &DISORDER,
    &DRUG,
    &GENE,
    &GENOMIC_VARIANT,
    &GO,
    &PATHWAY,
    &PHENOTYPE,
    &PROTEIN,
    &SIDE_EFFECT,
    &SIGNATURE,
    &TISSUE,
];

static EDGE_SCHEMAS: [&EntitySchema; 17] = [
    &DISORDER_IS_SUBTYPE_OF_DISORDER,
    &DRUG_HAS_CONTRAINDICATION,
    &DRUG_HAS_INDICATION,
    &DRUG_HAS_SIDE_EFFECT,
    &DRUG_HAS_TARGET,
    &GENE_ASSOCIATED_WITH_DISORDER,
    &GENE_EXPRESSED_IN_TISSUE,
    &GO_IS_SUBTYPE_OF_GO,
    &PROTEIN_ENCODED_BY_GENE,
    &PROTEIN_EXPRESSED_IN_TISSUE,
    &PROTEIN_HAS_GO_ANNOTATION,
    &PROTEIN_HAS_SIGNATURE,
    &PROTEIN_IN_PATHWAY,
    &PROTEIN_INTERACTS_WITH_PROTEIN,
    &SIDE_EFFECT_SAME_AS_PHENOTYPE,
    &VARIANT_AFFECTS_GENE,
    &VARIANT_ASSOCIATED_WITH_DISORDER,
];

/// Schemas of every node collection.
pub fn node_schemas() -> &'static [&'static EntitySchema] {
    &NODE_SCHEMAS
}

/// Schemas of every edge collection.
pub fn edge_schemas() -> &'static [&'static EntitySchema] {
    &EDGE_SCHEMAS
}

/// Node schemas followed by edge schemas.
pub fn all_schemas() -> impl Iterator<Item = &'static EntitySchema> {
    NODE_SCHEMAS.iter().chain(EDGE_SCHEMAS.iter()).copied()
}

/// Find the schema of a collection.
pub fn schema_for(collection: &str) -> Option<&'static EntitySchema> {
    all_schemas().find(|s| s.collection == collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn undeclared<E: Entity>(record: &E) -> Vec<String> {
        let key_fields: HashSet<&str> = E::SCHEMA.key_fields().iter().copied().collect();
        record
            .attributes()
            .unwrap()
            .keys()
            .filter(|k| !key_fields.contains(k.as_str()) && E::SCHEMA.rule(k).is_none())
            .cloned()
            .collect()
    }

    #[test]
    fn test_collections_are_unique() {
        let names: HashSet<_> = all_schemas().map(|s| s.collection).collect();
        assert_eq!(names.len(), NODE_SCHEMAS.len() + EDGE_SCHEMAS.len());
        assert!(node_schemas().iter().all(|s| s.is_node()));
        assert!(edge_schemas().iter().all(|s| !s.is_node()));
    }

    #[test]
    fn test_schema_lookup() {
        assert_eq!(schema_for("protein").map(|s| s.label), Some("Protein"));
        assert_eq!(
            schema_for("protein_interacts_with_protein").map(|s| s.key),
            Some(crate::types::KeyShape::Undirected)
        );
        assert!(schema_for("_collections").is_none());
    }

    #[test]
    fn test_required_fields_are_declared() {
        for schema in all_schemas() {
            for field in schema.required {
                assert!(schema.rule(field).is_some(), "{}.{}", schema.collection, field);
            }
        }
        assert_eq!(
            schema_for("variant_associated_with_disorder").map(|s| s.required),
            Some(&["sourceDomainId", "targetDomainId"][..])
        );
    }

    #[test]
    fn test_every_serialized_field_is_declared() {
        assert!(undeclared(&Disorder::default()).is_empty());
        assert!(undeclared(&Gene::default()).is_empty());
        assert!(undeclared(&GenomicVariant::default()).is_empty());
        assert!(undeclared(&GoTerm::default()).is_empty());
        assert!(undeclared(&Pathway::default()).is_empty());
        assert!(undeclared(&Phenotype::default()).is_empty());
        assert!(undeclared(&Protein::default()).is_empty());
        assert!(undeclared(&SideEffect::default()).is_empty());
        assert!(undeclared(&Signature::default()).is_empty());
        assert!(undeclared(&Tissue::default()).is_empty());
        assert!(undeclared(&Drug::biotech(DrugBase::default(), vec![])).is_empty());
        assert!(undeclared(&Drug::small_molecule(DrugBase::default(), SmallMoleculeDetails::default())).is_empty());

        assert!(undeclared(&DisorderIsSubtypeOfDisorder::default()).is_empty());
        assert!(undeclared(&DrugHasContraindication::default()).is_empty());
        assert!(undeclared(&DrugHasIndication::default()).is_empty());
        assert!(undeclared(&DrugHasSideEffect::default()).is_empty());
        assert!(undeclared(&DrugHasTarget::default()).is_empty());
        assert!(undeclared(&GeneAssociatedWithDisorder::default()).is_empty());
        assert!(undeclared(&GeneExpressedInTissue::default()).is_empty());
        assert!(undeclared(&GoIsSubtypeOfGo::default()).is_empty());
        assert!(undeclared(&ProteinEncodedByGene::default()).is_empty());
        assert!(undeclared(&ProteinExpressedInTissue::default()).is_empty());
        assert!(undeclared(&ProteinHasGoAnnotation::default()).is_empty());
        assert!(undeclared(&ProteinHasSignature::default()).is_empty());
        assert!(undeclared(&ProteinInPathway::default()).is_empty());
        assert!(undeclared(&ProteinInteractsWithProtein::default()).is_empty());
        assert!(undeclared(&SideEffectSameAsPhenotype::default()).is_empty());
        assert!(undeclared(&VariantAffectsGene::default()).is_empty());
        assert!(undeclared(&VariantAssociatedWithDisorder::default()).is_empty());
    }
}
