//! Variadic argument handling: `target, sources..., options?`.
//!
//! Callers that receive merge arguments as one flat list (the way they
//! arrive from a dynamic host) hand them to [`merge_args`]. The list is
//! split once, at the boundary, into a target, the sources and an optional
//! trailing options mapping; the merge itself only ever sees typed
//! [`MergeOptions`].

use objkit_types::{Graph, Value};

use crate::error::{MergeError, MergeResult};
use crate::merge::{merge_with, validate};
use crate::options::{ArrayStrategy, MergeOptions};

/// Raw option values taken from a trailing options mapping.
///
/// A key that is absent, or present with an undefined value, leaves the
/// corresponding default in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptionOverrides {
    pub deep: Option<Value>,
    pub arrays: Option<Value>,
    pub strategy: Option<Value>,
}

impl OptionOverrides {
    /// Read the recognised keys of `value`.
    ///
    /// Returns `None` unless `value` is a mapping with at least one
    /// recognised key holding a defined value.
    pub fn from_value(graph: &Graph, value: &Value) -> Option<Self> {
        let id = value.as_node()?;
        let fields = graph.fields(id).ok()?;
        let lookup = |key: &str| fields.get(key).filter(|v| !v.is_undefined()).cloned();

        let overrides = Self {
            deep: lookup("deep"),
            arrays: lookup("arrays"),
            strategy: lookup("strategy"),
        };
        (!overrides.is_empty()).then_some(overrides)
    }

    pub fn is_empty(&self) -> bool {
        self.deep.is_none() && self.arrays.is_none() && self.strategy.is_none()
    }

    /// Lay the overrides over `base`.
    ///
    /// `deep` and `arrays` take the truthiness of their values. `strategy`
    /// must be a string naming an [`ArrayStrategy`].
    pub fn apply(&self, graph: &Graph, base: MergeOptions) -> MergeResult<MergeOptions> {
        let mut options = base;
        if let Some(deep) = &self.deep {
            options.deep = deep.is_truthy();
        }
        if let Some(arrays) = &self.arrays {
            options.arrays = arrays.is_truthy();
        }
        if let Some(strategy) = &self.strategy {
            options.strategy = match strategy {
                Value::String(name) => name.parse::<ArrayStrategy>()?,
                other => {
                    return Err(MergeError::InvalidStrategy {
                        found: graph.describe(other).to_string(),
                    })
                }
            };
        }
        Ok(options)
    }
}

/// A flat argument list split into its parts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeArgs {
    pub target: Option<Value>,
    pub sources: Vec<Value>,
    pub overrides: OptionOverrides,
}

impl MergeArgs {
    /// Split `args` into target, sources and trailing options.
    ///
    /// The last argument after the target is taken as options when it is a
    /// mapping carrying `deep`, `arrays` or `strategy`; otherwise it is a source.
    pub fn split(graph: &Graph, args: &[Value]) -> Self {
        let Some((target, rest)) = args.split_first() else {
            return Self::default();
        };

        let trailing = rest
            .split_last()
            .and_then(|(last, init)| Some((OptionOverrides::from_value(graph, last)?, init)));
        let (overrides, sources) = match trailing {
            Some((overrides, init)) => (overrides, init),
            None => (OptionOverrides::default(), rest),
        };

        Self {
            target: Some(target.clone()),
            sources: sources.to_vec(),
            overrides,
        }
    }

    /// Default options with the overrides applied.
    pub fn options(&self, graph: &Graph) -> MergeResult<MergeOptions> {
        self.overrides.apply(graph, MergeOptions::default())
    }
}

/// Merge a flat `target, sources..., options?` argument list.
///
/// Errors are reported in argument order: the target first, then each
/// source, then the options. Nothing is allocated when any of them is
/// invalid.
///
/// # Examples
///
/// ```
/// use objkit_merge::merge_args;
/// use objkit_types::Graph;
/// use serde_json::json;
///
/// let mut graph = Graph::new();
/// let args = [
///     graph.ingest(&json!({"a": {"x": 1, "y": 2}, "b": 1})),
///     graph.ingest(&json!({"a": {"z": 3}, "c": 2})),
///     graph.ingest(&json!({"deep": false})),
/// ];
///
/// let merged = merge_args(&mut graph, &args).unwrap();
/// assert_eq!(graph.to_json(&merged).unwrap(), json!({"a": {"z": 3}, "b": 1, "c": 2}));
/// ```
pub fn merge_args(graph: &mut Graph, args: &[Value]) -> MergeResult<Value> {
    let split = MergeArgs::split(graph, args);
    let target = split.target.as_ref().ok_or(MergeError::MissingTarget)?;
    validate(graph, target, &split.sources)?;
    let options = split.options(graph)?;
    merge_with(graph, target, &split.sources, &options)
}
