//! Error types for configuration store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, navigating, mutating, or saving a
/// configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The key is absent from every layer consulted by the operation.
    #[error("config key not found: {key}")]
    NotFound { key: String },

    /// The value passed to a write has no JSON form. Nothing was written.
    #[error("cannot store config item '{key}': {source}")]
    Encoding {
        key: String,
        #[source]
        source: strata_tree::EncodeError,
    },

    /// Attribute-style write to a name owned by the store's own interface.
    #[error("cannot use attribute-style access to set config item '{name}'; attribute name is reserved")]
    ReservedName { name: String },

    /// The store was pointed at a path that is neither a file nor a directory.
    #[error("path must be an existing file or directory; '{}' does not exist", .path.display())]
    InvalidPath { path: PathBuf },

    /// Path navigation passed through a value that is not an object.
    #[error("config item '{key}' is a {kind}, not an object")]
    NotAnObject { key: String, kind: &'static str },

    /// A path with no segments was given.
    #[error("config path must not be empty")]
    EmptyPath,

    /// A persisted layer exists but could not be decoded.
    #[error("malformed config resource {resource}: {reason}")]
    Parse { resource: String, reason: String },

    /// A layer could not be encoded for persistence.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the backing storage.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn not_found(key: &str) -> Self {
        Self::NotFound { key: key.to_owned() }
    }

    pub(crate) fn encoding(key: &str, source: strata_tree::EncodeError) -> Self {
        Self::Encoding {
            key: key.to_owned(),
            source,
        }
    }

    /// Returns `true` for errors a caller can recover from by supplying a
    /// fallback (missing keys).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience alias used throughout the store crate.
pub type Result<T> = std::result::Result<T, ConfigError>;
