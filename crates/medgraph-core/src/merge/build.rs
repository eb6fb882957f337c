//! Pure translation of a partial record into an upsert instruction.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{MedGraphError, MedGraphResult};
use crate::models::Entity;
use crate::types::{fields, same_element, MergeRule, UpsertInstruction};

/// Build the upsert for a record, stamped with the current time.
pub fn build_upsert<E: Entity>(record: &E) -> MedGraphResult<UpsertInstruction> {
    build_upsert_at(record, Utc::now())
}

/// Build the upsert for a record with an explicit timestamp.
///
/// Applying the result twice leaves the document as after the first
/// application, apart from `updated`. Instructions for the same key commute
/// on union and extremal fields.
pub fn build_upsert_at<E: Entity>(record: &E, timestamp: DateTime<Utc>) -> MedGraphResult<UpsertInstruction> {
    let schema = E::SCHEMA;
    let key = record.key().canonical();
    if key.shape() != schema.key {
        return Err(MedGraphError::internal(format!(
            "{} expects a {:?} key, record produced {:?}",
            schema.collection,
            schema.key,
            key.shape()
        )));
    }
    key.validate(schema.collection)?;

    let mut attributes = record.attributes()?;
    for field in schema.key_fields() {
        attributes.remove(*field);
    }
    attributes.remove(fields::TYPE);

    for field in schema.required {
        let present = match attributes.get(*field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(MedGraphError::missing_key(schema.collection, field));
        }
    }

    let mut instruction = UpsertInstruction::new(schema.collection, key, record.label(), timestamp);

    for (name, value) in attributes {
        let rule = schema
            .rule(&name)
            .ok_or_else(|| MedGraphError::unknown_field(schema.collection, &name))?;

        match rule {
            MergeRule::Overwrite => {
                if !value.is_null() {
                    instruction.set.insert(name, value);
                }
            }
            MergeRule::Union => {
                let elements = match value {
                    Value::Null => Vec::new(),
                    Value::Array(items) => items,
                    other => {
                        return Err(MedGraphError::invalid_value(
                            schema.collection,
                            format!("{} must be a list, got {}", name, other),
                        ))
                    }
                };
                let mut unique: Vec<Value> = Vec::with_capacity(elements.len());
                for element in elements.into_iter().filter(|e| !e.is_null()) {
                    if !unique.iter().any(|u| same_element(u, &element)) {
                        unique.push(element);
                    }
                }
                instruction.add_to_set.insert(name, unique);
            }
            MergeRule::Max | MergeRule::Min => {
                if value.is_null() {
                    continue;
                }
                if !value.is_number() {
                    return Err(MedGraphError::invalid_value(
                        schema.collection,
                        format!("{} must be numeric, got {}", name, value),
                    ));
                }
                if rule == MergeRule::Max {
                    instruction.max.insert(name, value);
                } else {
                    instruction.min.insert(name, value);
                }
            }
        }
    }

    Ok(instruction)
}
