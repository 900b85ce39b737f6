//! The node arena.
//!
//! [`Graph`] owns every container node and hands out [`NodeId`] handles.
//! Nodes are only ever appended; nothing in this crate removes a node, so a
//! handle stays valid for the lifetime of the graph. Operations that build
//! new structure (cloning, merging) allocate fresh nodes and leave existing
//! ones untouched.
//!
//! # Invariants
//!
//! - Every `Value::Node` stored in the graph refers to a node of the same
//!   graph.
//! - Sequences hold no holes: slots past the old end are filled with
//!   `Value::Undefined` when a larger index is assigned.
//! - An assignment may pad a sequence by at most [`MAX_SEQUENCE_GAP`] slots.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;

use crate::error::{GraphError, GraphResult};
use crate::node::{parse_index, Node, NodeId, NodeKind};
use crate::value::Value;

/// Largest number of `Undefined` slots a single index assignment may add.
pub const MAX_SEQUENCE_GAP: usize = 1 << 16;

/// Whether assigning `index` to a sequence of `len` items stays within
/// [`MAX_SEQUENCE_GAP`].
pub fn index_in_reach(index: usize, len: usize) -> bool {
    index - index.min(len) <= MAX_SEQUENCE_GAP
}

/// Arena of mapping and sequence nodes.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Total number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ---------------------------------------------------------------
    // Allocation
    // ---------------------------------------------------------------

    /// Append a node and return its handle.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Allocate an empty node of `kind`.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.insert(Node::empty(kind))
    }

    /// Allocate an empty mapping.
    pub fn mapping(&mut self) -> NodeId {
        self.alloc(NodeKind::Mapping)
    }

    /// Allocate an empty sequence.
    pub fn sequence(&mut self) -> NodeId {
        self.alloc(NodeKind::Sequence)
    }

    /// Allocate a mapping holding `entries` in order. Later duplicates
    /// overwrite earlier ones in place.
    pub fn mapping_from<K, I>(&mut self, entries: I) -> NodeId
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let map: IndexMap<String, Value> =
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.insert(Node::Mapping(map))
    }

    /// Allocate a sequence holding `items` in order.
    pub fn sequence_from<I>(&mut self, items: I) -> NodeId
    where
        I: IntoIterator<Item = Value>,
    {
        self.insert(Node::Sequence(items.into_iter().collect()))
    }

    // ---------------------------------------------------------------
    // Access
    // ---------------------------------------------------------------

    /// Returns `true` if `id` belongs to this graph.
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> GraphResult<&Node> {
        self.nodes
            .get(id.index())
            .ok_or(GraphError::DanglingNode(id))
    }

    /// Mutably borrow a node.
    pub fn node_mut(&mut self, id: NodeId) -> GraphResult<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .ok_or(GraphError::DanglingNode(id))
    }

    /// Iterate over every node with its handle.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::from_index(i), node))
    }

    /// Kind of the node behind `id`.
    pub fn kind(&self, id: NodeId) -> GraphResult<NodeKind> {
        self.node(id).map(Node::kind)
    }

    /// Node kind of a value, or `None` for primitives and atoms.
    pub fn node_kind(&self, value: &Value) -> Option<NodeKind> {
        value.as_node().and_then(|id| self.kind(id).ok())
    }

    /// Returns `true` if `value` references a mapping.
    pub fn is_mapping(&self, value: &Value) -> bool {
        self.node_kind(value) == Some(NodeKind::Mapping)
    }

    /// Returns `true` if `value` references a sequence.
    pub fn is_sequence(&self, value: &Value) -> bool {
        self.node_kind(value) == Some(NodeKind::Sequence)
    }

    /// Type name for messages: `"mapping"` / `"sequence"` for nodes, the
    /// value's own type name otherwise.
    pub fn describe(&self, value: &Value) -> &'static str {
        match self.node_kind(value) {
            Some(NodeKind::Mapping) => "mapping",
            Some(NodeKind::Sequence) => "sequence",
            None => value.type_name(),
        }
    }

    /// Own enumerable keys of a node.
    pub fn keys(&self, id: NodeId) -> GraphResult<Vec<String>> {
        self.node(id).map(Node::keys)
    }

    /// Value stored under `key`, if present.
    pub fn get(&self, id: NodeId, key: &str) -> GraphResult<Option<&Value>> {
        self.node(id).map(|node| node.get(key))
    }

    /// Follow `path` (field names or indices) starting at `from`.
    ///
    /// Returns `None` when a step leaves the graph or names a missing key.
    pub fn resolve<'a>(&'a self, from: &'a Value, path: &[&str]) -> Option<&'a Value> {
        let mut current = from;
        for key in path {
            let id = current.as_node()?;
            current = self.node(id).ok()?.get(key)?;
        }
        Some(current)
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Store `value` under `key`.
    ///
    /// Mappings insert or overwrite (an existing key keeps its position).
    /// Sequences accept canonical indices only and grow with `Undefined`
    /// padding when the index is past the end, up to [`MAX_SEQUENCE_GAP`]
    /// slots.
    pub fn set(&mut self, id: NodeId, key: &str, value: Value) -> GraphResult<()> {
        match self.node_mut(id)? {
            Node::Mapping(map) => {
                map.insert(key.to_string(), value);
                Ok(())
            }
            Node::Sequence(items) => {
                let index = parse_index(key).ok_or_else(|| GraphError::NonIndexKey {
                    node: id,
                    key: key.to_string(),
                })?;
                if !index_in_reach(index, items.len()) {
                    return Err(GraphError::IndexOutOfReach {
                        node: id,
                        index,
                        len: items.len(),
                    });
                }
                if index >= items.len() {
                    items.resize(index + 1, Value::Undefined);
                }
                items[index] = value;
                Ok(())
            }
        }
    }

    /// Append `value` to a sequence.
    pub fn push(&mut self, id: NodeId, value: Value) -> GraphResult<()> {
        match self.node_mut(id)? {
            Node::Sequence(items) => {
                items.push(value);
                Ok(())
            }
            Node::Mapping(_) => Err(GraphError::KindMismatch {
                node: id,
                expected: NodeKind::Sequence,
                found: NodeKind::Mapping,
            }),
        }
    }

    /// Borrow the elements of a sequence.
    pub fn items(&self, id: NodeId) -> GraphResult<&[Value]> {
        match self.node(id)? {
            Node::Sequence(items) => Ok(items),
            Node::Mapping(_) => Err(GraphError::KindMismatch {
                node: id,
                expected: NodeKind::Sequence,
                found: NodeKind::Mapping,
            }),
        }
    }

    /// Borrow the fields of a mapping.
    pub fn fields(&self, id: NodeId) -> GraphResult<&IndexMap<String, Value>> {
        match self.node(id)? {
            Node::Mapping(map) => Ok(map),
            Node::Sequence(_) => Err(GraphError::KindMismatch {
                node: id,
                expected: NodeKind::Mapping,
                found: NodeKind::Sequence,
            }),
        }
    }

    // ---------------------------------------------------------------
    // Traversal
    // ---------------------------------------------------------------

    /// All nodes reachable from `root` (including `root` itself when it is
    /// a node), in breadth-first order. Each node is reported once, so cyclic
    /// structures terminate.
    pub fn reachable(&self, root: &Value) -> Vec<NodeId> {
        let Some(start) = root.as_node() else {
            return Vec::new();
        };

        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let Ok(node) = self.node(current) else {
                continue;
            };
            order.push(current);
            for child in node.values().filter_map(Value::as_node) {
                if visited.insert(child) {
                    queue.push_back(child);
                }
            }
        }

        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_hands_out_sequential_ids() {
        let mut graph = Graph::new();
        let a = graph.mapping();
        let b = graph.sequence();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.kind(a).unwrap(), NodeKind::Mapping);
        assert_eq!(graph.kind(b).unwrap(), NodeKind::Sequence);
    }

    #[test]
    fn dangling_handle_is_an_error() {
        let mut other = Graph::new();
        other.mapping();
        let stray = other.mapping();

        let graph = Graph::new();
        assert!(!graph.contains(stray));
        assert_eq!(graph.node(stray), Err(GraphError::DanglingNode(stray)));
    }

    #[test]
    fn mapping_set_overwrites_in_place() {
        let mut graph = Graph::new();
        let id = graph.mapping_from([("a", Value::from(1)), ("b", Value::from(2))]);
        graph.set(id, "a", Value::from(10)).unwrap();
        graph.set(id, "c", Value::from(3)).unwrap();

        assert_eq!(graph.keys(id).unwrap(), vec!["a", "b", "c"]);
        assert_eq!(graph.get(id, "a").unwrap(), Some(&Value::from(10)));
    }

    #[test]
    fn sequence_set_pads_with_undefined() {
        let mut graph = Graph::new();
        let id = graph.sequence_from([Value::from(1)]);
        graph.set(id, "3", Value::from(4)).unwrap();

        assert_eq!(
            graph.items(id).unwrap(),
            &[
                Value::from(1),
                Value::Undefined,
                Value::Undefined,
                Value::from(4)
            ]
        );
    }

    #[test]
    fn sequence_refuses_to_grow_too_far() {
        let mut graph = Graph::new();
        let id = graph.sequence_from([Value::from(1)]);

        let far = (1 + MAX_SEQUENCE_GAP + 1).to_string();
        assert_eq!(
            graph.set(id, &far, Value::Null),
            Err(GraphError::IndexOutOfReach {
                node: id,
                index: MAX_SEQUENCE_GAP + 2,
                len: 1
            })
        );
        assert!(graph.set(id, "18446744073709551614", Value::Null).is_err());
        assert_eq!(graph.items(id).unwrap().len(), 1);

        let edge = (1 + MAX_SEQUENCE_GAP).to_string();
        graph.set(id, &edge, Value::Null).unwrap();
        assert_eq!(graph.items(id).unwrap().len(), MAX_SEQUENCE_GAP + 2);
    }

    #[test]
    fn index_reach_is_relative_to_length() {
        assert!(index_in_reach(0, 0));
        assert!(index_in_reach(5, 10));
        assert!(index_in_reach(10 + MAX_SEQUENCE_GAP, 10));
        assert!(!index_in_reach(11 + MAX_SEQUENCE_GAP, 10));
        assert!(!index_in_reach(usize::MAX, 0));
    }

    #[test]
    fn sequence_rejects_named_keys() {
        let mut graph = Graph::new();
        let id = graph.sequence();
        let err = graph.set(id, "name", Value::Null).unwrap_err();
        assert_eq!(
            err,
            GraphError::NonIndexKey {
                node: id,
                key: "name".into()
            }
        );
    }

    #[test]
    fn push_requires_sequence() {
        let mut graph = Graph::new();
        let map = graph.mapping();
        assert!(matches!(
            graph.push(map, Value::Null),
            Err(GraphError::KindMismatch { .. })
        ));
    }

    #[test]
    fn resolve_follows_paths_through_cycles() {
        let mut graph = Graph::new();
        let root = graph.mapping_from([("name", Value::from("root"))]);
        graph.set(root, "self", Value::Node(root)).unwrap();
        let list = graph.sequence_from([Value::Node(root)]);
        graph.set(root, "list", Value::Node(list)).unwrap();

        let root_value = Value::Node(root);
        assert_eq!(
            graph.resolve(&root_value, &["self", "self", "name"]),
            Some(&Value::from("root"))
        );
        assert_eq!(
            graph.resolve(&root_value, &["list", "0"]),
            Some(&root_value)
        );
        assert_eq!(graph.resolve(&root_value, &[]), Some(&root_value));
        assert_eq!(graph.resolve(&root_value, &["missing"]), None);
        assert_eq!(graph.resolve(&root_value, &["name", "x"]), None);
    }

    #[test]
    fn reachable_visits_each_node_once() {
        let mut graph = Graph::new();
        let a = graph.mapping();
        let b = graph.mapping_from([("back", Value::Node(a))]);
        graph.set(a, "next", Value::Node(b)).unwrap();
        graph.set(a, "again", Value::Node(b)).unwrap();
        let _unrelated = graph.mapping();

        assert_eq!(graph.reachable(&Value::Node(a)), vec![a, b]);
        assert!(graph.reachable(&Value::from(1)).is_empty());
    }

    #[test]
    fn describe_distinguishes_node_kinds() {
        let mut graph = Graph::new();
        let map = Value::Node(graph.mapping());
        let seq = Value::Node(graph.sequence());
        assert_eq!(graph.describe(&map), "mapping");
        assert_eq!(graph.describe(&seq), "sequence");
        assert_eq!(graph.describe(&Value::Null), "null");
        assert!(graph.is_mapping(&map));
        assert!(graph.is_sequence(&seq));
    }
}
