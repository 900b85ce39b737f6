//! Error types for the record primitives.

/// Errors that can occur in pick, modify, omit, transform, flatten and
/// validate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpsError {
    /// An input that must be a record (mapping, or sequence where allowed)
    /// was something else. `role` names the input.
    #[error("{role} must be a non-null object.")]
    NotAnObject { role: &'static str },

    /// A strict operation named a key the record does not have.
    #[error("Key \"{key}\" does not exist in the original object.")]
    MissingKey { key: String },

    /// Both an include list and an exclude list were given.
    #[error("Cannot specify both include_keys and exclude_keys options.")]
    ConflictingKeyFilters,

    /// Strict transform found no mapper for a key.
    #[error("No mapper function found for key \"{key}\".")]
    MissingMapper { key: String },

    /// A mapper reported a failure.
    #[error("{0}")]
    MapperFailed(String),

    /// A transform failure, with the key it happened under.
    #[error("Transformation failed for key \"{key}\": {source}")]
    Transform {
        key: String,
        #[source]
        source: Box<OpsError>,
    },

    /// A schema document could not be turned into rules.
    #[error("invalid schema at {path:?}: {reason}")]
    InvalidSchema { path: String, reason: String },
}

/// Convenience alias for operation results.
pub type OpsResult<T> = Result<T, OpsError>;
