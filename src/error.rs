//! Error types for descriptor → schema translation.

use thiserror::Error;

/// Why a type or package name could not be resolved in the package registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("empty message name")]
    EmptyName,

    #[error("no such package nor message `{segment}` in `{package}`")]
    NoSuchPackageOrMessage { segment: String, package: String },

    #[error("no such nested message `{component}` in `{message}`")]
    NoSuchNestedMessage { component: String, message: String },

    #[error("no such package `{0}`")]
    NoSuchPackage(String),

    #[error("`{name}` is not visible from package `{context}`")]
    NotFound { name: String, context: String },
}

/// Failures while converting a message, field or file.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("no such message type named {name}: {source}")]
    UnresolvedType {
        name: String,
        #[source]
        source: LookupError,
    },

    #[error("unrecognized field type {kind} on field `{field}`")]
    UnrecognizedFieldType { field: String, kind: i32 },

    #[error("message type {0} refers back to itself")]
    RecursiveMessage(String),

    #[error("no such package found: {name}")]
    UnknownPackage {
        name: String,
        #[source]
        source: LookupError,
    },

    #[error("failed to encode JSON schema: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Session-level failure: the first conversion error, tagged with its file.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to convert {file}: {source}")]
    File {
        file: String,
        #[source]
        source: ConvertError,
    },

    #[error("file {0} was requested but is not part of the descriptor set")]
    UnknownFile(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("flags 'allow_null_values' and 'disallow_one_of' cannot both be on")]
    NullWithoutOneOf,
}
