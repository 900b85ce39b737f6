//! Merge engine for objkit.
//!
//! Deep-merges any number of source records into a fresh copy of a target
//! record. Nested mappings are merged key by key, sequences are replaced or
//! combined according to an [`ArrayStrategy`], and cyclic or shared
//! structure is copied without recursing forever: a [`Cloner`] registers
//! each copy before filling it, so back-references resolve to the copy.
//!
//! Inputs are never modified and the result shares no node with them.

pub mod args;
pub mod clone;
pub mod error;
pub mod merge;
pub mod options;

pub use args::{merge_args, MergeArgs, OptionOverrides};
pub use clone::{deep_clone, Cloner, SubstitutionMap};
pub use error::{MergeError, MergeResult};
pub use merge::{merge, merge_with, Merger};
pub use options::{ArrayStrategy, MergeOptions};
