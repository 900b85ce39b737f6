//! Error types for graph operations.

use thiserror::Error;

use crate::node::{NodeId, NodeKind};

/// Errors produced by [`Graph`](crate::Graph) operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A handle does not point at a node of this graph.
    #[error("dangling node handle: {0:?}")]
    DanglingNode(NodeId),

    /// The node exists but is of the wrong kind for the operation.
    #[error("node {node:?} is a {found}, expected a {expected}")]
    KindMismatch {
        /// The node that was addressed.
        node: NodeId,
        /// The kind the operation needs.
        expected: NodeKind,
        /// The node's actual kind.
        found: NodeKind,
    },

    /// A sequence was addressed with a key that is not an array index.
    #[error("sequence {node:?} cannot hold non-index key {key:?}")]
    NonIndexKey {
        /// The sequence that was addressed.
        node: NodeId,
        /// The rejected key.
        key: String,
    },

    /// A sequence index lies too far past the end to pad up to it.
    #[error("sequence {node:?} of length {len} cannot grow to index {index}")]
    IndexOutOfReach {
        /// The sequence that was addressed.
        node: NodeId,
        /// The requested index.
        index: usize,
        /// The sequence length at the time of the assignment.
        len: usize,
    },

    /// Serialization reached a node that is already on the current path.
    #[error("converting circular structure to JSON (cycle through {0:?})")]
    CircularStructure(NodeId),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for graph results.
pub type GraphResult<T> = Result<T, GraphError>;
