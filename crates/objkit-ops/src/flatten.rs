use serde_json::{Map, Value};

use crate::error::{OpsError, OpsResult};

/// Collapse nested mappings into one level with dot-joined keys.
///
/// Sequences and scalars are leaves. An empty nested mapping contributes no
/// keys at all.
pub fn flatten(record: &Value) -> OpsResult<Map<String, Value>> {
    let Value::Object(map) = record else {
        return Err(OpsError::NotAnObject {
            role: "Original object",
        });
    };

    let mut flat = Map::new();
    flatten_into(map, None, &mut flat);
    Ok(flat)
}

fn flatten_into(map: &Map<String, Value>, prefix: Option<&str>, flat: &mut Map<String, Value>) {
    for (key, value) in map {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(nested, Some(&path), flat),
            leaf => {
                flat.insert(path, leaf.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flat_record_is_unchanged() {
        let record = json!({"a": 1, "b": "two", "c": true});
        assert_eq!(Value::Object(flatten(&record).unwrap()), record);
    }

    #[test]
    fn nested_keys_are_joined() {
        let record = json!({
            "user": {"name": "John", "address": {"city": "NYC", "zip": "10001"}},
            "active": true
        });
        assert_eq!(
            Value::Object(flatten(&record).unwrap()),
            json!({
                "user.name": "John",
                "user.address.city": "NYC",
                "user.address.zip": "10001",
                "active": true
            })
        );
    }

    #[test]
    fn sequences_and_nulls_are_leaves() {
        let record = json!({"tags": ["a", "b"], "data": {"list": [{"x": 1}], "none": null}});
        assert_eq!(
            Value::Object(flatten(&record).unwrap()),
            json!({"tags": ["a", "b"], "data.list": [{"x": 1}], "data.none": null})
        );
    }

    #[test]
    fn empty_mappings_vanish() {
        let record = json!({"a": {}, "b": {"c": {}}, "d": 1});
        assert_eq!(Value::Object(flatten(&record).unwrap()), json!({"d": 1}));
        assert!(flatten(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn keeps_insertion_order() {
        let record = json!({"z": 1, "a": {"y": 2, "b": 3}});
        let flat = flatten(&record).unwrap();
        assert_eq!(flat.keys().collect::<Vec<_>>(), ["z", "a.y", "a.b"]);
    }

    #[test]
    fn root_must_be_a_mapping() {
        for bad in [json!([1, 2]), json!(null), json!("s")] {
            assert_eq!(
                flatten(&bad).unwrap_err().to_string(),
                "Original object must be a non-null object."
            );
        }
    }
}
