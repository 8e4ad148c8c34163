//! Error types for reference resolution, XML projection and XML validation.

use std::path::PathBuf;
use thiserror::Error;

/// A `$ref` that no indexed schema file answers to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UnresolvedReference {
    /// JSON Pointer (RFC 6901) to the node holding the `$ref`.
    pub path: String,
    /// The `$ref` value as written in the schema.
    pub reference: String,
}

impl std::fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.reference)
    }
}

/// Errors while indexing schema files and inlining `$ref` pointers.
#[derive(Debug, Error)]
pub enum ResolveError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot scan schema directory {path}: {source}")]
    ScanError {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON in {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // Schema errors (exit code 2)
    #[error("{} unresolved reference(s): {}", references.len(), join(references))]
    UnresolvedReferences { references: Vec<UnresolvedReference> },

    #[error("nesting deeper than {limit} levels at {path} (reference cycle?)")]
    DepthExceeded { path: String, limit: usize },
}

impl ResolveError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ResolveError::FileNotFound { .. }
            | ResolveError::ReadError { .. }
            | ResolveError::ScanError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors while projecting a schema into EDMX XML.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("'required' found without a 'properties' mapping at {path}")]
    MissingPropertiesField { path: String },

    #[error("'required' at {path} must be an array, got {actual}")]
    MalformedRequiredField { path: String, actual: String },

    #[error("start property \"{property}\" not reachable (search stopped at {path})")]
    StartPropertyNotFound { property: String, path: String },

    #[error("property at {path} has no usable 'type'")]
    MissingPropertyType { path: String },

    #[error("unsupported type \"{type_name}\" for property at {path}")]
    UnsupportedPropertyType { path: String, type_name: String },

    #[error("nesting deeper than {limit} levels at {path}")]
    DepthExceeded { path: String, limit: usize },
}

impl ProjectError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while scanning generated XML for duplicate entities.
#[derive(Debug, Error)]
pub enum ValidateXmlError {
    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },
}

impl ValidateXmlError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateXmlError::ReadError { .. } => 3,
            ValidateXmlError::Malformed { .. } => 2,
        }
    }
}

fn join(references: &[UnresolvedReference]) -> String {
    references
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
