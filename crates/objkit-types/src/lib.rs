//! Object graph model for objkit.
//!
//! Plain key/value records are stored in a [`Graph`] arena: containers are
//! [`Node`]s addressed by [`NodeId`] handles, and every field or element is
//! a [`Value`]. Because containers are referenced by handle, graphs may share
//! sub-structure and contain cycles, and node identity is handle equality.
//!
//! # Key Types
//!
//! - [`Graph`] -- append-only node arena with accessors and traversal
//! - [`Node`] / [`NodeKind`] -- mapping or sequence container
//! - [`Value`] -- primitive, [`Atom`] leaf, or node handle
//! - [`Atom`] -- dates, [`Function`]s and [`Opaque`] host objects, treated as
//!   immutable leaves
//!
//! The JSON bridge ([`Graph::ingest`], [`Graph::to_json`],
//! [`Graph::canonical_string`]) and cycle-aware structural equality
//! ([`Graph::congruent`]) are implemented as inherent methods on [`Graph`].

pub mod congruence;
pub mod error;
pub mod graph;
pub mod json;
pub mod node;
pub mod value;

pub use error::{GraphError, GraphResult};
pub use graph::{index_in_reach, Graph, MAX_SEQUENCE_GAP};
pub use node::{parse_index, Node, NodeId, NodeKind};
pub use value::{Atom, Function, Opaque, Value};
