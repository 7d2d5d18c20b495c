use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use strata_tree::Layer;

use crate::codec::{parse_layer, render_layer};
use crate::error::Result;
use crate::traits::LayerStore;

/// In-memory layer store.
///
/// Intended for tests and embedding. Layers are kept in their encoded byte
/// form behind a `RwLock`, so reads go through the same decoding as files do.
pub struct InMemoryLayerStore {
    resources: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryLayerStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            resources: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store pre-populated with a defaults layer.
    pub fn with_layer(name: &str, layer: &Layer) -> Result<Self> {
        let store = Self::new();
        store.write(name, layer)?;
        Ok(store)
    }

    /// Store raw bytes under `name`, bypassing encoding.
    pub fn insert_raw(&self, name: &str, bytes: impl Into<Vec<u8>>) {
        self.resources
            .write()
            .expect("lock poisoned")
            .insert(name.to_owned(), bytes.into());
    }

    /// The encoded bytes currently stored under `name`.
    pub fn raw(&self, name: &str) -> Option<Vec<u8>> {
        self.resources.read().expect("lock poisoned").get(name).cloned()
    }

    /// Number of resources currently stored.
    pub fn len(&self) -> usize {
        self.resources.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store holds no resources.
    pub fn is_empty(&self) -> bool {
        self.resources.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryLayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStore for InMemoryLayerStore {
    fn read(&self, name: &str) -> Result<Option<Layer>> {
        let map = self.resources.read().expect("lock poisoned");
        map.get(name).map(|bytes| parse_layer(name, bytes)).transpose()
    }

    fn write(&self, name: &str, layer: &Layer) -> Result<()> {
        let bytes = render_layer(layer)?;
        let mut map = self.resources.write().expect("lock poisoned");
        map.insert(name.to_owned(), bytes);
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<bool> {
        let mut map = self.resources.write().expect("lock poisoned");
        Ok(map.remove(name).is_some())
    }

    fn exists(&self, name: &str) -> Result<bool> {
        let map = self.resources.read().expect("lock poisoned");
        Ok(map.contains_key(name))
    }

    fn describe(&self, name: &str) -> String {
        format!("memory:{name}")
    }
}

impl fmt::Debug for InMemoryLayerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.resources.read().map(|m| m.len()).unwrap_or(0);
        f.debug_struct("InMemoryLayerStore")
            .field("resource_count", &count)
            .finish()
    }
}
