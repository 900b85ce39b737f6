use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{OpsError, OpsResult};
use crate::record::Record;

/// Options for [`pick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickOptions {
    /// Fail on a key the record does not have.
    pub strict: bool,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// New mapping holding only `keys` of `record`, in the order given.
///
/// Keys are literal: a dot is part of the key, not a path separator.
pub fn pick<K: AsRef<str>>(
    record: &Value,
    keys: &[K],
    options: &PickOptions,
) -> OpsResult<Map<String, Value>> {
    let record = Record::of(record, "Original object")?;

    let mut picked = Map::new();
    for key in keys {
        let key = key.as_ref();
        match record.get(key) {
            Some(value) => {
                picked.insert(key.to_string(), value.clone());
            }
            None if options.strict => {
                return Err(OpsError::MissingKey {
                    key: key.to_string(),
                })
            }
            None => trace!(key, "skipping missing key"),
        }
    }
    Ok(picked)
}
