use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{OpsError, OpsResult};
use crate::record::Record;

/// What [`modify`] does to the copy.
#[derive(Clone, Debug, PartialEq)]
pub enum Modification {
    /// Insert or overwrite each field.
    Patch(Map<String, Value>),
    /// Remove each key; absent keys are ignored.
    Erase(Vec<String>),
}

/// Options for [`modify`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifyOptions {
    /// In patch mode, only allow keys the record already has.
    pub strict: bool,
}

/// Shallow copy of `record` with `modification` applied.
pub fn modify(
    record: &Value,
    modification: &Modification,
    options: &ModifyOptions,
) -> OpsResult<Map<String, Value>> {
    let original = Record::of(record, "Original object")?;
    let mut result = original.to_map();

    match modification {
        Modification::Patch(patch) => {
            for (key, value) in patch {
                if options.strict && !original.contains_key(key) {
                    return Err(OpsError::MissingKey { key: key.clone() });
                }
                result.insert(key.clone(), value.clone());
            }
        }
        Modification::Erase(keys) => {
            for key in keys {
                result.shift_remove(key);
            }
        }
    }
    Ok(result)
}
