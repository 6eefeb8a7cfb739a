//! Error types for collection generation

use thiserror::Error;

/// Result type alias for collection operations
pub type CollectionResult<T> = std::result::Result<T, CollectionError>;

/// Collection error types
#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("Unresolvable reference: {0}")]
    UnresolvableReference(String),

    #[error("Malformed operation {verb} {path}: {reason}")]
    MalformedOperation {
        verb: String,
        path: String,
        reason: String,
    },

    #[error("Malformed path item {path}: {reason}")]
    MalformedPathItem { path: String, reason: String },

    #[error("Malformed schema at {location}: {reason}")]
    MalformedSchema { location: String, reason: String },

    #[error("Malformed component {pointer}: {reason}")]
    MalformedComponent { pointer: String, reason: String },

    #[error("Failed to fetch OpenAPI document: {0}")]
    FetchError(String),

    #[error("Invalid OpenAPI document format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

impl CollectionError {
    /// Whether the error is scoped to a single operation rather than the whole document
    pub fn is_operation_scoped(&self) -> bool {
        matches!(
            self,
            CollectionError::UnresolvableReference(_)
                | CollectionError::MalformedOperation { .. }
                | CollectionError::MalformedPathItem { .. }
                | CollectionError::MalformedSchema { .. }
                | CollectionError::MalformedComponent { .. }
        )
    }
}
