//! Flattening of nested documents into dotted column names.

use serde_json::Value;

use medgraph_core::types::Document;

/// Separator between parent and child keys.
pub const SEPARATOR: char = '.';

/// Flatten nested objects so `{"a": {"b": 1}}` becomes `{"a.b": 1}`.
///
/// Arrays are kept as values. An empty nested object contributes no column.
pub fn flatten(doc: &Document) -> Document {
    let mut out = Document::new();
    flatten_into(&mut out, None, doc);
    out
}

fn flatten_into(out: &mut Document, parent: Option<&str>, doc: &Document) {
    for (key, value) in doc {
        let name = match parent {
            Some(parent) => format!("{}{}{}", parent, SEPARATOR, key),
            None => key.clone(),
        };
        match value {
            Value::Object(child) => flatten_into(out, Some(&name), child),
            other => {
                out.insert(name, other.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_nested_keys_joined() {
        let flat = flatten(&doc(json!({
            "primaryDomainId": "uniprot.P1",
            "expression": {"level": "high", "source": {"name": "hpa"}},
            "synonyms": ["a", "b"],
            "empty": {}
        })));

        assert_eq!(flat["expression.level"], "high");
        assert_eq!(flat["expression.source.name"], "hpa");
        assert_eq!(flat["synonyms"], json!(["a", "b"]));
        assert!(!flat.contains_key("expression"));
        assert!(!flat.contains_key("empty"));
    }
}
