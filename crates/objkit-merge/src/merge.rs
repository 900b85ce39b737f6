//! Recursive merge of sources into a clone of a target.

use std::collections::HashMap;

use objkit_types::{
    index_in_reach, parse_index, Graph, GraphResult, NodeId, NodeKind, Value,
};
use tracing::{debug, trace};

use crate::clone::Cloner;
use crate::error::{MergeError, MergeResult};
use crate::options::{ArrayStrategy, MergeOptions};

/// Folds sources into a clone of a target, one source at a time.
///
/// Every merge step starts from a fresh clone of the node it merges into,
/// taken with one [`Cloner`] shared across the whole call: each source is
/// merged into a new copy of the running result, and each pair of nested
/// mappings into a new copy of the result's mapping. Back-references inside
/// a copy point at that copy. Nodes shared within the running result stay
/// shared unless a merge step replaces one of the places they occur.
///
/// Input nodes are only ever read.
pub struct Merger<'g> {
    graph: &'g mut Graph,
    options: MergeOptions,
    cloner: Cloner,
    /// (origin of the merged node, source node) -> copy being filled.
    active: HashMap<(NodeId, NodeId), NodeId>,
}

impl<'g> Merger<'g> {
    pub fn new(graph: &'g mut Graph, options: MergeOptions) -> Self {
        Self {
            graph,
            options,
            cloner: Cloner::new(),
            active: HashMap::new(),
        }
    }

    /// Clone `target`, fold every source into the running result left to
    /// right and return the final result's handle.
    ///
    /// Arguments are not validated here; see [`merge_with`].
    pub fn run(mut self, target: NodeId, sources: &[NodeId]) -> MergeResult<NodeId> {
        let mut result = self.cloner.clone_node(self.graph, target)?;
        for source in sources {
            result = self.merge_node(result, *source)?;
        }
        Ok(result)
    }

    // ---------------------------------------------------------------
    // Recursion
    // ---------------------------------------------------------------

    /// Clone `base` and write every entry of `source` into the clone.
    ///
    /// A pair that is already being merged further up resolves to the copy
    /// under construction, so cyclic targets and sources meet in a cycle of
    /// the result.
    fn merge_node(&mut self, base: NodeId, source: NodeId) -> MergeResult<NodeId> {
        let pair = (self.cloner.substitutions().origin(base), source);
        if let Some(&pending) = self.active.get(&pair) {
            trace!(base = %base, source = %source, pending = %pending, "merge already in progress");
            return Ok(pending);
        }

        let result = self.cloner.clone_node(self.graph, base)?;
        self.active.insert(pair, result);

        // Snapshot: the graph is written to while the entries are merged.
        let entries: Vec<(String, Value)> = {
            let node = self.graph.node(source)?;
            node.keys().into_iter().zip(node.values().cloned()).collect()
        };
        for (key, incoming) in entries {
            self.merge_entry(result, &key, &incoming)?;
        }

        self.active.remove(&pair);
        Ok(result)
    }

    fn merge_entry(&mut self, into: NodeId, key: &str, incoming: &Value) -> MergeResult<()> {
        let current = self.graph.get(into, key)?.cloned().unwrap_or_default();
        let kinds = (
            self.graph.node_kind(&current),
            self.graph.node_kind(incoming),
        );

        let merged = match (kinds, current.as_node(), incoming.as_node()) {
            ((Some(NodeKind::Mapping), Some(NodeKind::Mapping)), Some(existing), Some(source))
                if self.options.deep =>
            {
                Value::Node(self.merge_node(existing, source)?)
            }
            ((Some(NodeKind::Sequence), Some(NodeKind::Sequence)), Some(existing), Some(source))
                if self.options.combines_sequences() =>
            {
                self.combine_sequences(key, existing, source)?
            }
            _ => self.cloner.clone_value(self.graph, incoming)?,
        };
        self.graph.set(into, key, merged)?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Sequences
    // ---------------------------------------------------------------

    fn combine_sequences(
        &mut self,
        key: &str,
        existing: NodeId,
        source: NodeId,
    ) -> MergeResult<Value> {
        let strategy = self.options.strategy;
        trace!(key, %strategy, existing = %existing, source = %source, "combining sequences");

        let current = self.graph.items(existing)?.to_vec();
        let incoming = self.graph.items(source)?.to_vec();

        let (current, incoming) = match strategy {
            ArrayStrategy::Replace => {
                return Ok(self.cloner.clone_value(self.graph, &Value::Node(source))?);
            }
            ArrayStrategy::Concat => (current, incoming),
            ArrayStrategy::Unique => {
                let combined: Vec<Value> = current.iter().chain(&incoming).cloned().collect();
                let keep = first_occurrences(self.graph, &combined).map_err(|source| {
                    MergeError::UnserializableElement {
                        key: key.to_string(),
                        source,
                    }
                })?;
                let (keep_current, keep_incoming) = keep.split_at(current.len());
                (
                    retain(current, keep_current),
                    retain(incoming, keep_incoming),
                )
            }
        };

        let mut items = current;
        for item in &incoming {
            items.push(self.cloner.clone_value(self.graph, item)?);
        }
        Ok(Value::Node(self.graph.sequence_from(items)))
    }
}

/// For each item, whether it is the first of its kind.
///
/// Primitives and functions are duplicates of an earlier strictly equal item
/// (so `NaN` never is). Nodes, dates and opaque atoms are duplicates of an
/// earlier item with the same canonical string. Canonical strings are only
/// computed up to the last item that needs one.
fn first_occurrences(graph: &Graph, items: &[Value]) -> GraphResult<Vec<bool>> {
    let last_object = items.iter().rposition(|item| !item.is_primitive());
    let canonical = match last_object {
        Some(last) => items[..=last]
            .iter()
            .map(|item| graph.canonical_string(item))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if item.is_primitive() {
                !items[..index].contains(item)
            } else {
                let own = &canonical[index];
                !canonical[..index].iter().any(|other| other.is_some() && other == own)
            }
        })
        .collect())
}

fn retain(items: Vec<Value>, keep: &[bool]) -> Vec<Value> {
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, &keep)| keep.then_some(item))
        .collect()
}

// ---------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------

/// Deep merge `sources` into a copy of `target` with default options.
pub fn merge(graph: &mut Graph, target: &Value, sources: &[Value]) -> MergeResult<Value> {
    merge_with(graph, target, sources, &MergeOptions::default())
}

/// Merge `sources` into a copy of `target`.
///
/// The target and every source must be a mapping or sequence node. When the
/// target is a sequence, mapping sources may only carry index keys. All of
/// this is checked before anything is allocated. Neither the target nor the
/// sources are modified; the result shares no node with them.
///
/// # Examples
///
/// ```
/// use objkit_merge::{merge_with, ArrayStrategy, MergeOptions};
/// use objkit_types::Graph;
/// use serde_json::json;
///
/// let mut graph = Graph::new();
/// let target = graph.ingest(&json!({"items": [1, 2, 3, 2]}));
/// let source = graph.ingest(&json!({"items": [3, 4, 5, 1]}));
///
/// let options = MergeOptions::with_arrays(ArrayStrategy::Unique);
/// let merged = merge_with(&mut graph, &target, &[source], &options).unwrap();
/// assert_eq!(graph.to_json(&merged).unwrap(), json!({"items": [1, 2, 3, 4, 5]}));
/// ```
pub fn merge_with(
    graph: &mut Graph,
    target: &Value,
    sources: &[Value],
    options: &MergeOptions,
) -> MergeResult<Value> {
    let (target, source_ids) = validate(graph, target, sources)?;
    debug!(
        root = %target,
        sources = source_ids.len(),
        deep = options.deep,
        arrays = options.arrays,
        strategy = %options.strategy,
        "merge started"
    );

    let result = Merger::new(graph, *options).run(target, &source_ids)?;

    debug!(result = %result, nodes = graph.len(), "merge finished");
    Ok(Value::Node(result))
}

pub(crate) fn validate(
    graph: &Graph,
    target: &Value,
    sources: &[Value],
) -> MergeResult<(NodeId, Vec<NodeId>)> {
    let target_kind = graph.node_kind(target);
    let target_id = match (target.as_node(), target_kind) {
        (Some(id), Some(_)) => id,
        _ => {
            return Err(MergeError::InvalidTarget {
                found: graph.describe(target),
            })
        }
    };

    // Length the sequence target will have once the sources so far are in.
    let mut len = match target_kind {
        Some(NodeKind::Sequence) => graph.items(target_id)?.len(),
        _ => 0,
    };
    let mut source_ids = Vec::with_capacity(sources.len());
    for (index, source) in sources.iter().enumerate() {
        let (Some(id), Some(kind)) = (source.as_node(), graph.node_kind(source)) else {
            return Err(MergeError::InvalidSource {
                index,
                found: graph.describe(source),
            });
        };
        if target_kind == Some(NodeKind::Sequence) {
            len = sequence_len_after(graph, id, kind, index, len)?;
        }
        source_ids.push(id);
    }

    Ok((target_id, source_ids))
}

/// Check that the entries of source `index` fit a sequence of `len` items
/// and return the sequence's length afterwards.
fn sequence_len_after(
    graph: &Graph,
    id: NodeId,
    kind: NodeKind,
    index: usize,
    mut len: usize,
) -> MergeResult<usize> {
    if kind == NodeKind::Sequence {
        return Ok(len.max(graph.items(id)?.len()));
    }
    for key in graph.keys(id)? {
        let Some(position) = parse_index(&key) else {
            return Err(MergeError::NonIndexKey { index, key });
        };
        if !index_in_reach(position, len) {
            return Err(MergeError::IndexOutOfReach { index, key, len });
        }
        len = len.max(position + 1);
    }
    Ok(len)
}
