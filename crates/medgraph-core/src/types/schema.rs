//! Per-entity-type schemas: collection, key shape and field merge rules.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::key::KeyShape;

/// How contributions to one field are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MergeRule {
    /// Last writer wins.
    Overwrite,
    /// Set union; never shrinks.
    Union,
    /// Running maximum.
    Max,
    /// Running minimum.
    Min,
}

/// Whether a collection holds nodes or edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Node,
    Edge,
}

/// A declared attribute and its merge rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rule: MergeRule,
}

impl FieldSpec {
    pub const fn overwrite(name: &'static str) -> Self {
        Self {
            name,
            rule: MergeRule::Overwrite,
        }
    }

    pub const fn union(name: &'static str) -> Self {
        Self {
            name,
            rule: MergeRule::Union,
        }
    }

    pub const fn max(name: &'static str) -> Self {
        Self {
            name,
            rule: MergeRule::Max,
        }
    }

    pub const fn min(name: &'static str) -> Self {
        Self {
            name,
            rule: MergeRule::Min,
        }
    }
}

/// Static description of one canonical collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    /// Collection name in the document store.
    pub collection: &'static str,
    /// Default node label / edge type.
    pub label: &'static str,
    pub kind: EntityKind,
    pub key: KeyShape,
    pub fields: &'static [FieldSpec],
    /// Declared fields every record must carry with a non-empty value.
    pub required: &'static [&'static str],
    /// Secondary (non-unique) single-field indexes.
    pub indexes: &'static [&'static str],
}

impl EntitySchema {
    /// Look up the merge rule of a declared field.
    pub fn rule(&self, field: &str) -> Option<MergeRule> {
        self.fields.iter().find(|f| f.name == field).map(|f| f.rule)
    }

    /// Fields forming the unique key.
    pub fn key_fields(&self) -> &'static [&'static str] {
        self.key.field_names()
    }

    pub fn is_node(&self) -> bool {
        self.kind == EntityKind::Node
    }
}
