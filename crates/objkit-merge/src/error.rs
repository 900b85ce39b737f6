//! Error types for the merge engine.

use objkit_types::GraphError;

/// Errors that can occur while merging.
///
/// Argument errors (`MissingTarget`, `InvalidTarget`, `InvalidSource`,
/// `InvalidStrategy`, `NonIndexKey`, `IndexOutOfReach`) are raised before
/// any node is allocated.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The argument list was empty.
    #[error("merge requires a target")]
    MissingTarget,

    /// The target is not a mapping or sequence.
    #[error("Target must be a non-null object (got {found}).")]
    InvalidTarget {
        /// Type name of the rejected target.
        found: &'static str,
    },

    /// The source at `index` is not a mapping or sequence.
    #[error("Source at index {index} must be a non-null object (got {found}).")]
    InvalidSource {
        /// Position of the source among the sources.
        index: usize,
        /// Type name of the rejected source.
        found: &'static str,
    },

    /// The array strategy is not one of the supported names.
    #[error("Strategy must be one of: concat, replace, unique (got {found}).")]
    InvalidStrategy {
        /// The rejected strategy, as given.
        found: String,
    },

    /// A mapping source carries a field a sequence target cannot hold.
    #[error("Source at index {index} has key {key:?}, which a sequence target cannot hold.")]
    NonIndexKey {
        /// Position of the source among the sources.
        index: usize,
        /// The first key that is not an array index.
        key: String,
    },

    /// A mapping source addresses a sequence target too far past its end.
    #[error("Source at index {index} has key {key:?}, past the reach of a sequence of length {len}.")]
    IndexOutOfReach {
        /// Position of the source among the sources.
        index: usize,
        /// The offending index key.
        key: String,
        /// Length the sequence would have when the source is applied.
        len: usize,
    },

    /// An element could not be serialized for the `unique` comparison.
    #[error("cannot compare elements under key {key:?}: {source}")]
    UnserializableElement {
        /// The field holding the sequences being combined.
        key: String,
        /// Why serialization failed.
        #[source]
        source: GraphError,
    },

    /// Underlying graph access failed.
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
