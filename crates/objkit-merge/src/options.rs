use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MergeError;

/// How two sequences under the same key are combined when array merging is
/// enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayStrategy {
    /// Target elements followed by source elements.
    Concat,
    /// Source sequence wins wholesale.
    #[default]
    Replace,
    /// Concatenate, then keep only the first occurrence of each element.
    Unique,
}

impl ArrayStrategy {
    /// Every supported strategy, in the order used by error messages.
    pub const ALL: [ArrayStrategy; 3] = [
        ArrayStrategy::Concat,
        ArrayStrategy::Replace,
        ArrayStrategy::Unique,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArrayStrategy::Concat => "concat",
            ArrayStrategy::Replace => "replace",
            ArrayStrategy::Unique => "unique",
        }
    }
}

impl fmt::Display for ArrayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArrayStrategy {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| MergeError::InvalidStrategy {
                found: format!("{s:?}"),
            })
    }
}

/// Options controlling a merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Merge nested mappings key by key instead of replacing them.
    pub deep: bool,
    /// Combine sequences with [`MergeOptions::strategy`] instead of
    /// replacing them. Only takes effect when `deep` is set.
    pub arrays: bool,
    /// Sequence combination strategy.
    pub strategy: ArrayStrategy,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            deep: true,
            arrays: false,
            strategy: ArrayStrategy::Replace,
        }
    }
}

impl MergeOptions {
    /// Top-level merge only: nested mappings are replaced wholesale.
    pub fn shallow() -> Self {
        Self {
            deep: false,
            ..Default::default()
        }
    }

    /// Deep merge that combines sequences with `strategy`.
    pub fn with_arrays(strategy: ArrayStrategy) -> Self {
        Self {
            arrays: true,
            strategy,
            ..Default::default()
        }
    }

    /// Whether sequences under the same key are combined rather than
    /// replaced.
    pub fn combines_sequences(&self) -> bool {
        self.deep && self.arrays
    }
}
