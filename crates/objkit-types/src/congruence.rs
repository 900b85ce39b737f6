//! Cycle-aware structural equality.
//!
//! Two values are congruent when there is a one-to-one pairing of the nodes
//! reachable from each side such that paired nodes have the same kind, the
//! same keys, congruent children and equal leaves. Because the pairing is a
//! bijection, cycle topology must match too: a field pointing at its own
//! container only pairs with a field pointing at the paired container.

use std::collections::{HashMap, VecDeque};

use crate::graph::Graph;
use crate::node::{Node, NodeId};
use crate::value::{Atom, Value};

impl Graph {
    /// Structural equality of two values of this graph.
    pub fn congruent(&self, a: &Value, b: &Value) -> bool {
        self.congruent_across(a, self, b)
    }

    /// Structural equality of `a` in this graph and `b` in `other`.
    ///
    /// Mapping key order is ignored. Numbers compare by value with `NaN`
    /// congruent to itself; functions and opaque atoms by identity.
    pub fn congruent_across(&self, a: &Value, other: &Graph, b: &Value) -> bool {
        let mut pairing = Pairing::default();
        if !pairing.leaf_or_pair(a, b) {
            return false;
        }

        while let Some((left, right)) = pairing.pending.pop_front() {
            let (Ok(left_node), Ok(right_node)) = (self.node(left), other.node(right)) else {
                return false;
            };
            let same = match (left_node, right_node) {
                (Node::Mapping(l), Node::Mapping(r)) => {
                    l.len() == r.len()
                        && l.iter().all(|(key, lv)| {
                            r.get(key).is_some_and(|rv| pairing.leaf_or_pair(lv, rv))
                        })
                }
                (Node::Sequence(l), Node::Sequence(r)) => {
                    l.len() == r.len()
                        && l.iter().zip(r).all(|(lv, rv)| pairing.leaf_or_pair(lv, rv))
                }
                _ => false,
            };
            if !same {
                return false;
            }
        }

        true
    }
}

#[derive(Default)]
struct Pairing {
    forward: HashMap<NodeId, NodeId>,
    backward: HashMap<NodeId, NodeId>,
    pending: VecDeque<(NodeId, NodeId)>,
}

impl Pairing {
    /// Compare leaves directly; for nodes, record (or check) the pairing and
    /// queue the pair for a structural comparison.
    fn leaf_or_pair(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Node(l), Value::Node(r)) => {
                match (self.forward.get(l), self.backward.get(r)) {
                    (Some(paired), _) => paired == r,
                    (None, Some(_)) => false,
                    (None, None) => {
                        self.forward.insert(*l, *r);
                        self.backward.insert(*r, *l);
                        self.pending.push_back((*l, *r));
                        true
                    }
                }
            }
            (Value::Number(l), Value::Number(r)) => l == r || (l.is_nan() && r.is_nan()),
            (Value::Atom(Atom::Date(l)), Value::Atom(Atom::Date(r))) => l == r,
            _ => a == b,
        }
    }
}
