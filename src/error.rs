//! Structural errors. Observed-data problems are never errors; they are
//! reported as [`crate::violations::Violation`] values instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeTableError {
    #[error("Key already present in type table: {0}")]
    Duplicate(String),
    #[error("Key not present in type table: {0}")]
    Missing(String),
    #[error("reference cycle detected through type `{0}`")]
    Cycle(String),
}

/// A defect in how the contract itself was built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error(transparent)]
    TypeTable(#[from] TypeTableError),

    #[error("{location}: reference to undeclared type `{name}`")]
    UnresolvedReference { location: String, name: String },

    #[error("endpoint `{endpoint}`: path segment `:{param}` has no declared path param")]
    UndeclaredPathParam { endpoint: String, param: String },

    #[error("endpoint `{endpoint}`: path param `{param}` does not appear in path `{path}`")]
    UnusedPathParam { endpoint: String, param: String, path: String },

    #[error("endpoint `{endpoint}`: path param `{param}` has a type that cannot be carried in a path")]
    UnsafePathParam { endpoint: String, param: String },

    #[error("endpoint `{endpoint}`: query param `{param}` has a type that cannot be carried in a query string")]
    UnsafeQueryParam { endpoint: String, param: String },

    #[error("{location}: header `{header}` has a type that cannot be carried in a header")]
    UnsafeHeader { location: String, header: String },

    #[error("{location}: discriminator `{discriminator}` does not select a distinct string literal on every member")]
    InvalidDiscriminator { location: String, discriminator: String },

    #[error("endpoint `{endpoint}`: invalid path template `{path}`: {reason}")]
    PathTemplate { endpoint: String, path: String, reason: String },
}

/// Internal inconsistency hit while checking an exchange. These indicate a
/// contract that slipped past construction checks, not bad user input.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Unexpected error: endpoint path ({template}) does not match input path ({path})")]
    PathSegmentMismatch { template: String, path: String },

    #[error("Unexpected error: could not find path param `{0}` on contract")]
    MissingPathParam(String),

    #[error("failed to compile body schema: {0}")]
    SchemaCompile(String),

    #[error(transparent)]
    TypeTable(#[from] TypeTableError),
}
