//! Value transformation with per-key, wildcard or catch-all mappers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{OpsError, OpsResult};
use crate::record::Record;

/// Key that matches every field without its own mapper.
pub const WILDCARD: &str = "*";

type MapFn = dyn Fn(&Value, &str) -> Result<Value, String> + Send + Sync;

/// A value mapper: receives the value and its key.
#[derive(Clone)]
pub struct Mapper(Arc<MapFn>);

impl Mapper {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &str) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Mapper that cannot fail.
    pub fn infallible<F>(f: F) -> Self
    where
        F: Fn(&Value, &str) -> Value + Send + Sync + 'static,
    {
        Self::new(move |value, key| Ok(f(value, key)))
    }

    fn apply(&self, value: &Value, key: &str) -> OpsResult<Value> {
        (self.0)(value, key).map_err(OpsError::MapperFailed)
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mapper(..)")
    }
}

/// Mappers for [`transform`].
#[derive(Clone, Debug)]
pub enum Mappers {
    /// One mapper per key, with [`WILDCARD`] as a fallback.
    PerKey(HashMap<String, Mapper>),
    /// One mapper for every key.
    All(Mapper),
}

impl Mappers {
    pub fn per_key<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Mapper)>,
    {
        Mappers::PerKey(entries.into_iter().map(|(k, m)| (k.into(), m)).collect())
    }

    /// The mapper for `key`: its own, then the wildcard, then the catch-all.
    fn lookup(&self, key: &str) -> Option<&Mapper> {
        match self {
            Mappers::PerKey(map) => map.get(key).or_else(|| map.get(WILDCARD)),
            Mappers::All(mapper) => Some(mapper),
        }
    }
}

/// Options for [`transform`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Fail on a key that has no mapper.
    pub strict: bool,
    /// Recurse into nested mappings that have no mapper of their own.
    pub deep: bool,
    /// Only transform these keys.
    pub include_keys: Option<Vec<String>>,
    /// Transform every key but these.
    pub exclude_keys: Option<Vec<String>>,
}

impl TransformOptions {
    fn selects(&self, key: &str) -> bool {
        let listed = |keys: &[String]| keys.iter().any(|k| k == key);
        match (&self.include_keys, &self.exclude_keys) {
            (Some(include), _) => listed(include),
            (None, Some(exclude)) => !listed(exclude),
            (None, None) => true,
        }
    }
}

/// New mapping with each value of `record` passed through its mapper.
///
/// Keys left out by `include_keys`/`exclude_keys` keep their values, though
/// with `deep` their nested mappings are still transformed. A failure is
/// reported with the key it happened under.
pub fn transform(
    record: &Value,
    mappers: &Mappers,
    options: &TransformOptions,
) -> OpsResult<Map<String, Value>> {
    let record = Record::of(record, "Original object")?;
    if options.include_keys.is_some() && options.exclude_keys.is_some() {
        return Err(OpsError::ConflictingKeyFilters);
    }

    let mut result = Map::new();
    for (key, value) in record.entries() {
        let mapped = transform_value(value, &key, mappers, options).map_err(|source| {
            debug!(key = %key, error = %source, "transform failed");
            OpsError::Transform {
                key: key.clone(),
                source: Box::new(source),
            }
        })?;
        result.insert(key, mapped);
    }
    Ok(result)
}

fn transform_value(
    value: &Value,
    key: &str,
    mappers: &Mappers,
    options: &TransformOptions,
) -> OpsResult<Value> {
    let nested = || transform(value, mappers, options).map(Value::Object);

    if !options.selects(key) {
        return match value {
            Value::Object(_) if options.deep => nested(),
            _ => Ok(value.clone()),
        };
    }

    if let Some(mapper) = mappers.lookup(key) {
        return mapper.apply(value, key);
    }
    match value {
        Value::Object(_) if options.deep => nested(),
        _ if options.strict => Err(OpsError::MissingMapper {
            key: key.to_string(),
        }),
        _ => Ok(value.clone()),
    }
}
