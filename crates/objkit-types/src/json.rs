//! Bridge between [`serde_json::Value`] trees and the graph.
//!
//! Export follows the usual JSON stringification rules so that the output
//! can double as a canonical form:
//!
//! - `undefined` and function fields are dropped from mappings and written
//!   as `null` inside sequences;
//! - dates become RFC 3339 strings with millisecond precision;
//! - integral numbers are written without a fraction, non-finite numbers as
//!   `null`;
//! - opaque atoms become `{}`;
//! - mapping keys keep insertion order (no sorting), so two mappings with
//!   the same fields in a different order have different canonical forms.
//!
//! A node reached again while it is still being written is a cycle and
//! fails with [`GraphError::CircularStructure`]. Shared, acyclic references
//! are written once per occurrence.

use std::collections::HashSet;

use chrono::SecondsFormat;
use serde_json::{Map, Number};

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::node::{Node, NodeId};
use crate::value::{Atom, Value};

/// Largest integer that a double represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl Graph {
    /// Copy a JSON tree into the arena and return the root value.
    ///
    /// Arrays become sequences, objects become mappings; every container
    /// gets a fresh node.
    pub fn ingest(&mut self, json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                let values: Vec<Value> = items.iter().map(|item| self.ingest(item)).collect();
                Value::Node(self.sequence_from(values))
            }
            serde_json::Value::Object(map) => {
                let entries: Vec<(String, Value)> = map
                    .iter()
                    .map(|(key, item)| (key.clone(), self.ingest(item)))
                    .collect();
                Value::Node(self.mapping_from(entries))
            }
        }
    }

    /// Export `value` as a JSON tree.
    ///
    /// A top-level `undefined` or function has no JSON form and exports as
    /// `null`; use [`Graph::canonical_string`] to tell those apart.
    pub fn to_json(&self, value: &Value) -> GraphResult<serde_json::Value> {
        let mut on_path = HashSet::new();
        Ok(self.export(value, &mut on_path)?.unwrap_or(serde_json::Value::Null))
    }

    /// Canonical serialized form of `value`, or `None` for values that have
    /// no serialized form (`undefined`, functions).
    pub fn canonical_string(&self, value: &Value) -> GraphResult<Option<String>> {
        let mut on_path = HashSet::new();
        match self.export(value, &mut on_path)? {
            Some(json) => serde_json::to_string(&json)
                .map(Some)
                .map_err(|e| GraphError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    fn export(
        &self,
        value: &Value,
        on_path: &mut HashSet<NodeId>,
    ) -> GraphResult<Option<serde_json::Value>> {
        let json = match value {
            Value::Undefined | Value::Atom(Atom::Function(_)) => return Ok(None),
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Atom(Atom::Date(date)) => {
                serde_json::Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::Atom(Atom::Opaque(_)) => serde_json::Value::Object(Map::new()),
            Value::Node(id) => self.export_node(*id, on_path)?,
        };
        Ok(Some(json))
    }

    fn export_node(
        &self,
        id: NodeId,
        on_path: &mut HashSet<NodeId>,
    ) -> GraphResult<serde_json::Value> {
        if !on_path.insert(id) {
            return Err(GraphError::CircularStructure(id));
        }

        let json = match self.node(id)? {
            Node::Mapping(map) => {
                let mut out = Map::new();
                for (key, item) in map {
                    if let Some(json) = self.export(item, on_path)? {
                        out.insert(key.clone(), json);
                    }
                }
                serde_json::Value::Object(out)
            }
            Node::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(
                        self.export(item, on_path)?
                            .unwrap_or(serde_json::Value::Null),
                    );
                }
                serde_json::Value::Array(out)
            }
        };

        on_path.remove(&id);
        Ok(json)
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        // Exact: |n| is below 2^53.
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::value::{Function, Opaque};

    #[test]
    fn ingest_builds_nodes_for_containers() {
        let mut graph = Graph::new();
        let root = graph.ingest(&json!({"a": [1, {"b": null}], "c": "x"}));

        assert_eq!(graph.len(), 3);
        assert!(graph.is_mapping(&root));
        assert!(graph.is_sequence(graph.resolve(&root, &["a"]).unwrap()));
        assert_eq!(graph.resolve(&root, &["a", "0"]), Some(&Value::from(1)));
        assert_eq!(graph.resolve(&root, &["a", "1", "b"]), Some(&Value::Null));
    }

    #[test]
    fn export_keeps_insertion_order() {
        let mut graph = Graph::new();
        let root = graph.mapping_from([("z", Value::from(1)), ("a", Value::from(2))]);
        let text = graph.canonical_string(&Value::Node(root)).unwrap();
        assert_eq!(text.as_deref(), Some(r#"{"z":1,"a":2}"#));
    }

    #[test]
    fn export_follows_stringify_rules() {
        let mut graph = Graph::new();
        let func = Value::from(Function::new("f", |_| Value::Null));
        let date = Value::from(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        let seq = graph.sequence_from([Value::Undefined, func.clone(), Value::from(1.5)]);
        let root = graph.mapping_from([
            ("gone", Value::Undefined),
            ("fn", func),
            ("when", date),
            ("list", Value::Node(seq)),
            ("nan", Value::Number(f64::NAN)),
            ("obj", Value::Atom(Atom::Opaque(Opaque::new(7u8)))),
        ]);

        let json = graph.to_json(&Value::Node(root)).unwrap();
        assert_eq!(
            json,
            json!({
                "when": "2023-01-01T00:00:00.000Z",
                "list": [null, null, 1.5],
                "nan": null,
                "obj": {}
            })
        );
    }

    #[test]
    fn canonical_string_has_no_form_for_undefined_or_functions() {
        let graph = Graph::new();
        assert_eq!(graph.canonical_string(&Value::Undefined).unwrap(), None);
        let func = Value::from(Function::new("f", |_| Value::Null));
        assert_eq!(graph.canonical_string(&func).unwrap(), None);
        assert_eq!(
            graph.canonical_string(&Value::from("hi")).unwrap().as_deref(),
            Some("\"hi\"")
        );
    }

    #[test]
    fn integral_numbers_have_no_fraction() {
        let graph = Graph::new();
        assert_eq!(
            graph.canonical_string(&Value::from(3)).unwrap().as_deref(),
            Some("3")
        );
        assert_eq!(
            graph.canonical_string(&Value::Number(-0.0)).unwrap().as_deref(),
            Some("0")
        );
    }

    #[test]
    fn cycles_are_rejected() {
        let mut graph = Graph::new();
        let root = graph.mapping();
        graph.set(root, "self", Value::Node(root)).unwrap();

        assert_eq!(
            graph.to_json(&Value::Node(root)),
            Err(GraphError::CircularStructure(root))
        );
    }

    #[test]
    fn shared_acyclic_references_are_written_twice() {
        let mut graph = Graph::new();
        let shared = graph.mapping_from([("v", Value::from(1))]);
        let root = graph.mapping_from([("a", Value::Node(shared)), ("b", Value::Node(shared))]);

        let json = graph.to_json(&Value::Node(root)).unwrap();
        assert_eq!(json, json!({"a": {"v": 1}, "b": {"v": 1}}));
    }

    fn arb_json() -> impl Strategy<Value = serde_json::Value> {
        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::Bool),
            (-1_000_000i64..1_000_000).prop_map(|n| json!(n)),
            "[a-z]{0,6}".prop_map(serde_json::Value::String),
        ];
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::Array),
                prop::collection::vec(("[a-z]{1,4}", inner), 0..4).prop_map(|entries| {
                    serde_json::Value::Object(entries.into_iter().collect())
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn ingest_then_export_preserves_json(input in arb_json()) {
            let mut graph = Graph::new();
            let value = graph.ingest(&input);
            prop_assert_eq!(graph.to_json(&value).unwrap(), input);
        }
    }
}
