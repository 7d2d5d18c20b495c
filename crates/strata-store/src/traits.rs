//! The [`LayerStore`] trait defining where configuration layers live.
//!
//! A backend maps resource names (`default.config.json`,
//! `user.config.json`, ...) to serialized object layers.

use std::path::Path;

use strata_tree::Layer;

use crate::error::Result;

/// Storage backend for configuration layers.
///
/// Implementations must satisfy these rules:
/// - A missing resource reads as `Ok(None)`, never as an error.
/// - A resource that exists but does not hold a JSON object is a
///   [`ConfigError::Parse`](crate::ConfigError::Parse).
/// - Writing replaces the whole resource; readers never observe a partial write.
/// - Every call is a single attempt. Failures are returned, not retried.
pub trait LayerStore: Send + Sync {
    /// Read and decode the layer stored under `name`.
    fn read(&self, name: &str) -> Result<Option<Layer>>;

    /// Encode and store `layer` under `name`, replacing any previous content.
    fn write(&self, name: &str, layer: &Layer) -> Result<()>;

    /// Remove the resource. Returns `true` if it existed.
    fn remove(&self, name: &str) -> Result<bool>;

    /// Check whether a resource exists.
    ///
    /// [`Config`](crate::Config) never calls this; `save` relies on the
    /// result of [`remove`](Self::remove). It is here for callers that
    /// inspect a backend directly.
    fn exists(&self, name: &str) -> Result<bool>;

    /// The directory holding the resources, for file-backed stores.
    fn directory(&self) -> Option<&Path> {
        None
    }

    /// Human-readable location of a resource, for logs and messages.
    fn describe(&self, name: &str) -> String {
        name.to_owned()
    }
}
