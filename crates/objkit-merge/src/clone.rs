//! Cycle-safe deep cloning.
//!
//! [`Cloner`] copies the nodes reachable from a value into fresh nodes of
//! the same graph. A [`SubstitutionMap`] remembers which clone stands for
//! which original, and a clone's shell is registered *before* its children
//! are visited, so a child that refers back to an ancestor (or to the node
//! itself) resolves to the clone under construction instead of recursing
//! forever.
//!
//! Only originals are keys of the map. Cloning a clone again yields another
//! fresh copy; [`SubstitutionMap::origin`] links every copy back to the
//! node it was first taken from.

use std::collections::HashMap;

use objkit_types::{Graph, GraphResult, Node, NodeId, Value};
use tracing::trace;

/// Original node -> clone node, scoped to one clone or merge invocation.
#[derive(Clone, Debug, Default)]
pub struct SubstitutionMap {
    clones: HashMap<NodeId, NodeId>,
    /// Clone -> the node its chain of copies started from.
    origins: HashMap<NodeId, NodeId>,
}

impl SubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The clone registered for `original`, if any.
    pub fn get(&self, original: NodeId) -> Option<NodeId> {
        self.clones.get(&original).copied()
    }

    pub fn contains(&self, original: NodeId) -> bool {
        self.clones.contains_key(&original)
    }

    /// Record `clone` as the substitute for `original`.
    pub fn register(&mut self, original: NodeId, clone: NodeId) {
        let origin = self.origin(original);
        self.clones.insert(original, clone);
        self.origins.insert(clone, origin);
    }

    /// The node `id` was copied from, following copies of copies back to the
    /// first. A node that is not a clone is its own origin.
    pub fn origin(&self, id: NodeId) -> NodeId {
        self.origins.get(&id).copied().unwrap_or(id)
    }

    /// Number of registered originals.
    pub fn len(&self) -> usize {
        self.clones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clones.is_empty()
    }
}

/// Deep cloner sharing one [`SubstitutionMap`] across calls.
///
/// Primitives and atoms are returned as-is. Mapping and sequence nodes are
/// copied into new nodes; repeated and cyclic references to the same
/// original resolve to the same clone.
#[derive(Debug, Default)]
pub struct Cloner {
    substitutions: SubstitutionMap,
}

impl Cloner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn substitutions(&self) -> &SubstitutionMap {
        &self.substitutions
    }

    /// Deep clone `value` into `graph`.
    pub fn clone_value(&mut self, graph: &mut Graph, value: &Value) -> GraphResult<Value> {
        match value {
            Value::Node(id) => self.clone_node(graph, *id).map(Value::Node),
            other => Ok(other.clone()),
        }
    }

    /// Deep clone the node behind `id`, returning the clone's handle.
    pub fn clone_node(&mut self, graph: &mut Graph, id: NodeId) -> GraphResult<NodeId> {
        if let Some(existing) = self.substitutions.get(id) {
            trace!(original = %id, clone = %existing, "substitution hit");
            return Ok(existing);
        }

        // Snapshot the children before allocating: the arena may reallocate.
        let original = graph.node(id)?.clone();
        let shell = graph.alloc(original.kind());
        self.substitutions.register(id, shell);

        match original {
            Node::Mapping(fields) => {
                for (key, child) in &fields {
                    let cloned = self.clone_value(graph, child)?;
                    graph.set(shell, key, cloned)?;
                }
            }
            Node::Sequence(items) => {
                for child in &items {
                    let cloned = self.clone_value(graph, child)?;
                    graph.push(shell, cloned)?;
                }
            }
        }

        Ok(shell)
    }
}

/// Deep clone `value` with a fresh substitution map.
///
/// # Examples
///
/// ```
/// use objkit_merge::deep_clone;
/// use objkit_types::{Graph, Value};
///
/// let mut graph = Graph::new();
/// let original = graph.mapping_from([("a", Value::from(1))]);
/// graph.set(original, "self", Value::Node(original)).unwrap();
///
/// let copy = deep_clone(&mut graph, &Value::Node(original)).unwrap();
/// assert_ne!(copy, Value::Node(original));
/// assert_eq!(graph.resolve(&copy, &["self"]), Some(&copy));
/// ```
pub fn deep_clone(graph: &mut Graph, value: &Value) -> GraphResult<Value> {
    Cloner::new().clone_value(graph, value)
}
