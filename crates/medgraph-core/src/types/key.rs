//! Entity identity: the fields a record is matched on in its collection.

use serde::{Deserialize, Serialize};

use crate::error::{MedGraphError, MedGraphResult};

/// Reserved field names shared by the store, the merge engine and the exporter.
pub mod fields {
    pub const PRIMARY_DOMAIN_ID: &str = "primaryDomainId";
    pub const SOURCE_DOMAIN_ID: &str = "sourceDomainId";
    pub const TARGET_DOMAIN_ID: &str = "targetDomainId";
    pub const MEMBER_ONE: &str = "memberOne";
    pub const MEMBER_TWO: &str = "memberTwo";
    pub const ACCESSION: &str = "accession";
    pub const TYPE: &str = "type";
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";
    pub const OBJECT_ID: &str = "_id";
    pub const CLASS: &str = "_cls";
}

/// How an entity type is keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyShape {
    /// Single primary domain identifier (nodes).
    Primary,
    /// Ordered (source, target) pair.
    Directed,
    /// Unordered pair, stored sorted as (memberOne, memberTwo).
    Undirected,
    /// The edge's own accession.
    Accession,
}

impl KeyShape {
    /// Field names that make up the key, in filter order.
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            Self::Primary => &[fields::PRIMARY_DOMAIN_ID],
            Self::Directed => &[fields::SOURCE_DOMAIN_ID, fields::TARGET_DOMAIN_ID],
            Self::Undirected => &[fields::MEMBER_ONE, fields::MEMBER_TWO],
            Self::Accession => &[fields::ACCESSION],
        }
    }
}

/// The identity of one entity within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKey {
    Primary(String),
    Directed { source: String, target: String },
    /// Always holds `member_one <= member_two`; build through [`EntityKey::undirected`].
    Undirected { member_one: String, member_two: String },
    Accession(String),
}

impl EntityKey {
    pub fn primary(id: impl Into<String>) -> Self {
        Self::Primary(id.into())
    }

    pub fn directed(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Directed {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Build an undirected key; members are sorted so (B, A) and (A, B) match.
    pub fn undirected(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        let (member_one, member_two) = if a <= b { (a, b) } else { (b, a) };
        Self::Undirected {
            member_one,
            member_two,
        }
    }

    pub fn accession(accession: impl Into<String>) -> Self {
        Self::Accession(accession.into())
    }

    /// The shape of this key.
    pub fn shape(&self) -> KeyShape {
        match self {
            Self::Primary(_) => KeyShape::Primary,
            Self::Directed { .. } => KeyShape::Directed,
            Self::Undirected { .. } => KeyShape::Undirected,
            Self::Accession(_) => KeyShape::Accession,
        }
    }

    /// Re-sort undirected members in case the key was built by hand.
    pub fn canonical(self) -> Self {
        match self {
            Self::Undirected {
                member_one,
                member_two,
            } => Self::undirected(member_one, member_two),
            other => other,
        }
    }

    /// (field, value) pairs used as the match filter.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Primary(id) => vec![(fields::PRIMARY_DOMAIN_ID, id.as_str())],
            Self::Directed { source, target } => vec![
                (fields::SOURCE_DOMAIN_ID, source.as_str()),
                (fields::TARGET_DOMAIN_ID, target.as_str()),
            ],
            Self::Undirected {
                member_one,
                member_two,
            } => vec![
                (fields::MEMBER_ONE, member_one.as_str()),
                (fields::MEMBER_TWO, member_two.as_str()),
            ],
            Self::Accession(accession) => vec![(fields::ACCESSION, accession.as_str())],
        }
    }

    /// Reject keys with an empty component.
    pub fn validate(&self, collection: &str) -> MedGraphResult<()> {
        for (field, value) in self.fields() {
            if value.trim().is_empty() {
                return Err(MedGraphError::missing_key(collection, field));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undirected_key_is_sorted() {
        let ab = EntityKey::undirected("uniprot.A", "uniprot.B");
        let ba = EntityKey::undirected("uniprot.B", "uniprot.A");
        assert_eq!(ab, ba);
        assert_eq!(
            ab.fields(),
            vec![(fields::MEMBER_ONE, "uniprot.A"), (fields::MEMBER_TWO, "uniprot.B")]
        );
    }

    #[test]
    fn test_canonical_resorts_hand_built_key() {
        let key = EntityKey::Undirected {
            member_one: "z".to_string(),
            member_two: "a".to_string(),
        };
        assert_eq!(key.canonical(), EntityKey::undirected("a", "z"));
    }

    #[test]
    fn test_empty_key_component_rejected() {
        let key = EntityKey::directed("drugbank.DB00001", "");
        let err = key.validate("drug_has_target").unwrap_err();
        assert!(err.to_string().contains(fields::TARGET_DOMAIN_ID));

        assert!(EntityKey::primary("  ").validate("gene").is_err());
        assert!(EntityKey::primary("entrez.1").validate("gene").is_ok());
    }

    #[test]
    fn test_shape_field_names_match_key_fields() {
        let key = EntityKey::accession("VCV000012345");
        let names: Vec<_> = key.fields().into_iter().map(|(f, _)| f).collect();
        assert_eq!(names, key.shape().field_names());
    }
}
