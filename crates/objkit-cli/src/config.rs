use std::path::Path;

use anyhow::Context;
use objkit_merge::MergeOptions;
use objkit_ops::{OmitOptions, PickOptions, ValidateOptions};
use serde::{Deserialize, Serialize};

/// Per-command defaults, read from a TOML file.
///
/// ```toml
/// [merge]
/// arrays = true
/// strategy = "unique"
///
/// [validate]
/// allow_extra = false
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub merge: MergeOptions,
    pub pick: PickOptions,
    pub omit: OmitOptions,
    pub validate: ValidateOptions,
}

impl Config {
    /// Load `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
