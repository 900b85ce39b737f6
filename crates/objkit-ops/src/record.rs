//! Read-only view over a JSON value used as a record.

use serde_json::{Map, Value};

use crate::error::{OpsError, OpsResult};

/// A mapping, or a sequence addressed by decimal index keys.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Record<'a> {
    Map(&'a Map<String, Value>),
    List(&'a [Value]),
}

impl<'a> Record<'a> {
    /// View `value` as a record, or fail naming it as `role`.
    pub(crate) fn of(value: &'a Value, role: &'static str) -> OpsResult<Self> {
        match value {
            Value::Object(map) => Ok(Record::Map(map)),
            Value::Array(items) => Ok(Record::List(items)),
            _ => Err(OpsError::NotAnObject { role }),
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        match self {
            Record::Map(map) => map.get(key),
            Record::List(items) => index_of(key).and_then(|i| items.get(i)),
        }
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Own keys and values, in insertion or index order.
    pub(crate) fn entries(&self) -> Vec<(String, &'a Value)> {
        match self {
            Record::Map(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Record::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        }
    }

    /// Shallow copy as a mapping.
    pub(crate) fn to_map(&self) -> Map<String, Value> {
        self.entries()
            .into_iter()
            .map(|(k, v)| (k, v.clone()))
            .collect()
    }
}

fn index_of(key: &str) -> Option<usize> {
    let canonical = key == "0" || (!key.starts_with('0') && key.bytes().all(|b| b.is_ascii_digit()));
    if canonical {
        key.parse().ok()
    } else {
        None
    }
}

/// Type name in the loose sense: `null`, `array`, `object`, `string`,
/// `number`, `boolean`, or `undefined` for an absent value.
pub(crate) fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}
