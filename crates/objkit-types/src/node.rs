//! Heap nodes of an object graph.
//!
//! A [`Node`] is either a [`Node::Mapping`] (string keys in insertion order)
//! or a [`Node::Sequence`] (index-addressed values). Nodes live in a
//! [`Graph`](crate::Graph) arena and are referenced by [`NodeId`] handles, so
//! a node may appear under several parents or inside itself.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Handle to a node stored in a [`Graph`](crate::Graph).
///
/// Handle equality is node identity: two values are the same object iff they
/// carry the same `NodeId`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        // The arena never grows past u32::MAX nodes on supported targets.
        Self(index as u32)
    }

    /// Position of the node inside its arena.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId(#{})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two container shapes a node can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Mapping,
    Sequence,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Mapping => write!(f, "mapping"),
            NodeKind::Sequence => write!(f, "sequence"),
        }
    }
}

/// A container node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Plain object: named fields in insertion order.
    Mapping(IndexMap<String, Value>),
    /// Array: ordered, index-addressed values.
    Sequence(Vec<Value>),
}

impl Node {
    /// An empty node of the given kind.
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Mapping => Node::Mapping(IndexMap::new()),
            NodeKind::Sequence => Node::Sequence(Vec::new()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Mapping(_) => NodeKind::Mapping,
            Node::Sequence(_) => NodeKind::Sequence,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Node::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Node::Sequence(_))
    }

    /// Number of own entries (fields or elements).
    pub fn len(&self) -> usize {
        match self {
            Node::Mapping(map) => map.len(),
            Node::Sequence(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Own enumerable keys: field names for mappings, decimal indices for
    /// sequences.
    pub fn keys(&self) -> Vec<String> {
        match self {
            Node::Mapping(map) => map.keys().cloned().collect(),
            Node::Sequence(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        }
    }

    /// Value stored under an own key, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Node::Mapping(map) => map.get(key),
            Node::Sequence(items) => parse_index(key).and_then(|i| items.get(i)),
        }
    }

    /// All child values in key order.
    pub fn values(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Node::Mapping(map) => Box::new(map.values()),
            Node::Sequence(items) => Box::new(items.iter()),
        }
    }
}

/// Parse a canonical array index (`"0"`, `"17"`; no sign, no leading zeros).
pub fn parse_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse().ok()
}
