use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{OpsError, OpsResult};
use crate::record::Record;

/// Options for [`omit`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OmitOptions {
    /// Fail when a key is missing from a mapping being omitted from.
    pub strict: bool,
    /// Also drop the keys from every nested mapping.
    pub deep: bool,
}

/// New mapping with every field of `record` except `keys`.
///
/// With `deep`, nested mappings are rebuilt with the same keys removed at
/// every level, and `strict` holds each of them to the same check as the
/// top level. Sequences are kept as they are.
pub fn omit<K: AsRef<str>>(
    record: &Value,
    keys: &[K],
    options: &OmitOptions,
) -> OpsResult<Map<String, Value>> {
    let original = Record::of(record, "Original object")?;
    let omitted: Vec<&str> = keys.iter().map(AsRef::as_ref).collect();
    without(original, &omitted, options)
}

fn without(
    record: Record<'_>,
    omitted: &[&str],
    options: &OmitOptions,
) -> OpsResult<Map<String, Value>> {
    if options.strict {
        if let Some(missing) = omitted.iter().find(|key| !record.contains_key(key)) {
            return Err(OpsError::MissingKey {
                key: missing.to_string(),
            });
        }
    }

    record
        .entries()
        .into_iter()
        .filter(|(key, _)| !omitted.contains(&key.as_str()))
        .map(|(key, value)| {
            let value = match value {
                Value::Object(nested) if options.deep => {
                    Value::Object(without(Record::Map(nested), omitted, options)?)
                }
                other => other.clone(),
            };
            Ok((key, value))
        })
        .collect()
}
