//! Record primitives for objkit.
//!
//! Small, independent operations over plain JSON records. Each returns a new
//! record and leaves its input untouched.
//!
//! # Key Types
//!
//! - [`pick`] / [`omit`] -- keep or drop listed keys
//! - [`modify`] -- patch fields or erase keys on a copy
//! - [`transform`] -- map values through [`Mappers`]
//! - [`flatten`] -- collapse nesting into dot-joined keys
//! - [`validate`] -- check a record against a [`Schema`]

pub mod error;
pub mod flatten;
pub mod modify;
pub mod omit;
pub mod pick;
mod record;
pub mod transform;
pub mod validate;

pub use error::{OpsError, OpsResult};
pub use flatten::flatten;
pub use modify::{modify, Modification, ModifyOptions};
pub use omit::{omit, OmitOptions};
pub use pick::{pick, PickOptions};
pub use transform::{transform, Mapper, Mappers, TransformOptions, WILDCARD};
pub use validate::{
    validate, Predicate, Rule, Schema, ValidateOptions, ValidationIssue, ValidationReport,
};
