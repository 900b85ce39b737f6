//! Schema validation producing a report of every mismatch.
//!
//! A [`Schema`] maps field names to [`Rule`]s. Rules are type names, nested
//! schemas, per-item rules for sequences, or custom predicates. Validation
//! never stops at the first problem: every mismatch becomes a
//! [`ValidationIssue`] in the returned [`ValidationReport`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{OpsError, OpsResult};
use crate::record::{type_name, Record};

type PredicateFn = dyn Fn(Option<&Value>, &str) -> Result<bool, String> + Send + Sync;

/// Custom check: receives the value (absent for a missing field) and its
/// path.
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>, &str) -> Result<bool, String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// A check applied to one value.
#[derive(Clone, Debug)]
pub enum Rule {
    /// Lower-cased type name: `string`, `number`, `boolean`, `object`,
    /// `array`, `null`, `undefined` or `any`.
    Type(String),
    /// The value must be a record whose fields satisfy the schema.
    Nested(Schema),
    /// The value must be a sequence; every item must satisfy the rule.
    Each(Box<Rule>),
    /// The value must be a sequence; items are not checked.
    Sequence,
    Custom(Predicate),
}

impl Rule {
    pub fn of_type(name: &str) -> Self {
        Rule::Type(name.to_lowercase())
    }

    pub fn each(rule: Rule) -> Self {
        Rule::Each(Box::new(rule))
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>, &str) -> Result<bool, String> + Send + Sync + 'static,
    {
        Rule::Custom(Predicate::new(f))
    }

    fn from_json(rule: &Value, path: &str) -> OpsResult<Self> {
        match rule {
            Value::String(name) => Ok(Rule::of_type(name)),
            Value::Object(_) => Schema::from_json_at(rule, path).map(Rule::Nested),
            Value::Array(items) => match items.as_slice() {
                [item] => Ok(Rule::each(Rule::from_json(item, &format!("{path}[]"))?)),
                _ => Ok(Rule::Sequence),
            },
            other => Err(OpsError::InvalidSchema {
                path: path.to_string(),
                reason: format!("a rule cannot be {}", type_name(Some(other))),
            }),
        }
    }
}

/// Ordered field rules.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: Vec<(String, Rule)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the rule for `key`.
    pub fn field(mut self, key: impl Into<String>, rule: Rule) -> Self {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = rule,
            None => self.fields.push((key, rule)),
        }
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a schema from a JSON document.
    ///
    /// Strings are type names, mappings nested schemas, one-element
    /// sequences per-item rules and other sequences plain sequence checks.
    /// Custom predicates have no JSON form.
    pub fn from_json(schema: &Value) -> OpsResult<Self> {
        if !schema.is_object() {
            return Err(OpsError::NotAnObject { role: "Schema" });
        }
        Self::from_json_at(schema, "")
    }

    fn from_json_at(schema: &Value, path: &str) -> OpsResult<Self> {
        let Value::Object(map) = schema else {
            return Err(OpsError::NotAnObject { role: "Schema" });
        };
        let mut fields = Vec::with_capacity(map.len());
        for (key, rule) in map {
            let nested = join(path, key);
            fields.push((key.clone(), Rule::from_json(rule, &nested)?));
        }
        Ok(Self { fields })
    }
}

/// Options for [`validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateOptions {
    /// Report schema fields the record lacks.
    pub strict: bool,
    /// Accept record fields the schema does not name.
    pub allow_extra: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            strict: false,
            allow_extra: true,
        }
    }
}

/// One mismatch found during validation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Outcome of [`validate`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Check `record` against `schema`.
///
/// Fields the record lacks are skipped unless `strict` is set. The record
/// must be a mapping or sequence; everything else is reported in the
/// returned [`ValidationReport`].
pub fn validate(
    record: &Value,
    schema: &Schema,
    options: &ValidateOptions,
) -> OpsResult<ValidationReport> {
    let record = Record::of(record, "Object to validate")?;
    let mut errors = Vec::new();

    for (key, rule) in &schema.fields {
        match record.get(key) {
            Some(value) => check(Some(value), rule, key, &mut errors),
            None if options.strict => errors.push(ValidationIssue {
                path: key.clone(),
                message: format!("Required property '{key}' is missing"),
                expected: Some("property to exist".into()),
                actual: Some("property missing".into()),
                value: None,
            }),
            None => {}
        }
    }

    if !options.allow_extra {
        for (key, value) in record.entries() {
            if !schema.contains(&key) {
                errors.push(ValidationIssue {
                    message: format!("Extra property '{key}' is not allowed"),
                    path: key,
                    expected: Some("property not to exist".into()),
                    actual: Some("extra property".into()),
                    value: Some(value.clone()),
                });
            }
        }
    }

    debug!(rules = schema.len(), errors = errors.len(), "validated record");
    Ok(ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    })
}

fn check(value: Option<&Value>, rule: &Rule, path: &str, errors: &mut Vec<ValidationIssue>) {
    let actual = type_name(value);
    let mismatch = |expected: &str| ValidationIssue {
        path: path.to_string(),
        message: format!("Expected {expected} but got {actual}"),
        expected: Some(expected.to_string()),
        actual: Some(actual.to_string()),
        value: value.cloned(),
    };

    match rule {
        Rule::Type(expected) => {
            if expected != "any" && expected != actual {
                errors.push(mismatch(expected));
            }
        }
        Rule::Custom(predicate) => {
            let message = match (predicate.0)(value, path) {
                Ok(true) => return,
                Ok(false) => "Custom validation failed".to_string(),
                Err(reason) => format!("Custom validation error: {reason}"),
            };
            errors.push(ValidationIssue {
                path: path.to_string(),
                message,
                expected: None,
                actual: None,
                value: value.cloned(),
            });
        }
        Rule::Nested(schema) => match value.map(|v| Record::of(v, "Nested value")) {
            Some(Ok(nested)) => {
                for (key, rule) in &schema.fields {
                    check(nested.get(key), rule, &join(path, key), errors);
                }
            }
            _ => errors.push(mismatch("object")),
        },
        Rule::Each(item_rule) => match value {
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    check(Some(item), item_rule, &format!("{path}[{i}]"), errors);
                }
            }
            _ => errors.push(mismatch("array")),
        },
        Rule::Sequence => {
            if !matches!(value, Some(Value::Array(_))) {
                errors.push(mismatch("array"));
            }
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
