//! The layered configuration store.
//!
//! A [`Config`] holds two layers in memory:
//!
//! - **default**: loaded from the defaults resource and never written back.
//! - **user**: persisted user content unioned over the defaults at load time,
//!   then mutated freely by the caller.
//!
//! Reading a key that only exists in the defaults copies it into the user
//! layer first, so in-place edits through the returned [`Item`] land in the
//! user layer and never touch the defaults. Saving persists only the
//! difference between the two layers; an empty difference removes the user
//! resource entirely.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use strata_tree::{diff, encode, union, Layer};
use tracing::{debug, info, trace};

use crate::error::{ConfigError, Result};
use crate::fs::FileLayerStore;
use crate::names::validate_attr_name;
use crate::options::ConfigOptions;
use crate::traits::LayerStore;
use crate::view::{expect_object, Item, Materialize, Parent, View};

/// What [`Config::save`] did to the user resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The overlay was non-empty and has been written.
    Written,
    /// The overlay was empty and a previously saved resource was deleted.
    Removed,
    /// The overlay was empty and there was nothing to delete.
    Unchanged,
}

/// A two-layer configuration: read-only defaults plus a persisted user overlay.
pub struct Config {
    store: Box<dyn LayerStore>,
    options: ConfigOptions,
    default: Layer,
    user: Layer,
}

impl Config {
    /// Open the configuration living next to `path` with default options.
    ///
    /// `path` may be the configuration directory itself or any file inside it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, ConfigOptions::default())
    }

    /// Open the configuration living next to `path`.
    pub fn open_with(path: impl AsRef<Path>, options: ConfigOptions) -> Result<Self> {
        let store = FileLayerStore::locate(path.as_ref())?;
        Self::with_store(store, options)
    }

    /// Build a configuration over any storage backend and load it.
    pub fn with_store(store: impl LayerStore + 'static, options: ConfigOptions) -> Result<Self> {
        let mut config = Self {
            store: Box::new(store),
            options,
            default: Map::new(),
            user: Map::new(),
        };
        config.load()?;
        Ok(config)
    }

    /// Options this configuration was opened with.
    pub fn options(&self) -> &ConfigOptions {
        &self.options
    }

    /// The configuration directory, for file-backed stores.
    pub fn directory(&self) -> Option<&Path> {
        self.store.directory()
    }

    /// Full path of the defaults file, for file-backed stores.
    pub fn default_path(&self) -> Option<PathBuf> {
        self.directory()
            .map(|dir| dir.join(&self.options.default_file_name))
    }

    /// Full path of the user file, for file-backed stores.
    pub fn user_path(&self) -> Option<PathBuf> {
        self.directory().map(|dir| dir.join(&self.options.user_file_name))
    }

    /// Re-read both layers from storage, discarding unsaved changes.
    ///
    /// A missing defaults resource is treated as empty. On error the
    /// in-memory layers are left as they were.
    pub fn load(&mut self) -> Result<()> {
        let default = self
            .store
            .read(&self.options.default_file_name)?
            .unwrap_or_default();
        let persisted = self
            .store
            .read(&self.options.user_file_name)?
            .unwrap_or_default();

        info!(
            defaults = %self.store.describe(&self.options.default_file_name),
            default_keys = default.len(),
            user_keys = persisted.len(),
            "loaded configuration"
        );
        self.user = union(&persisted, &default);
        self.default = default;
        Ok(())
    }

    /// Persist the difference between the user layer and the defaults.
    pub fn save(&self) -> Result<SaveOutcome> {
        let name = &self.options.user_file_name;
        let overlay = diff(&self.user, &self.default);

        let outcome = if !overlay.is_empty() {
            self.store.write(name, &overlay)?;
            SaveOutcome::Written
        } else if self.store.remove(name)? {
            SaveOutcome::Removed
        } else {
            SaveOutcome::Unchanged
        };

        info!(
            resource = %self.store.describe(name),
            keys = overlay.len(),
            outcome = ?outcome,
            "saved configuration"
        );
        Ok(outcome)
    }

    /// The overlay [`save`](Self::save) would persist right now.
    pub fn overlay(&self) -> Value {
        Value::Object(diff(&self.user, &self.default))
    }

    /// The configuration as readers see it: user values over defaults.
    pub fn effective(&self) -> Value {
        Value::Object(union(&self.user, &self.default))
    }

    /// Read `key`.
    ///
    /// Objects come back as an [`Item::Object`] view over the live node;
    /// anything else as a mutable reference into the user layer. A key
    /// present in neither layer is [`ConfigError::NotFound`], or a
    /// placeholder when `use_placeholders` is enabled.
    pub fn item(&mut self, key: &str) -> Result<Item<'_>> {
        let placeholders = self.options.use_placeholders;
        self.resolve(key, placeholders)
    }

    /// Read a nested value, one key per level.
    pub fn path(&mut self, path: &[&str]) -> Result<Item<'_>> {
        let (first, rest) = path.split_first().ok_or(ConfigError::EmptyPath)?;
        let mut item = self.item(first)?;
        let mut at = *first;
        for key in rest {
            item = expect_object(item, at)?.into_item(key)?;
            at = *key;
        }
        Ok(item)
    }

    /// Copy of the value under `key`, or `fallback` if no layer has it.
    pub fn get(&mut self, key: &str, fallback: Value) -> Value {
        self.resolve(key, false)
            .ok()
            .and_then(|item| item.to_value())
            .unwrap_or(fallback)
    }

    /// The value under `key` in the defaults layer, ignoring user changes.
    pub fn get_default(&self, key: &str) -> Result<&Value> {
        self.default
            .get(key)
            .ok_or_else(|| ConfigError::not_found(key))
    }

    /// Store `value` under `key` in the user layer.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = encode(value).map_err(|e| ConfigError::encoding(key, e))?;
        trace!(key, "set config item");
        self.user.insert(key.to_owned(), value);
        Ok(())
    }

    /// Like [`set`](Self::set), but refuses names reserved by this type's
    /// own interface.
    pub fn set_attr<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        validate_attr_name(key)?;
        self.set(key, value)
    }

    /// Store `value` at a nested path, creating missing intermediate objects.
    ///
    /// Fails with [`ConfigError::NotAnObject`] if an intermediate key holds a
    /// non-object value; nothing is written in that case.
    pub fn set_path<T: Serialize + ?Sized>(&mut self, path: &[&str], value: &T) -> Result<()> {
        let (last, parents) = path.split_last().ok_or(ConfigError::EmptyPath)?;
        let Some((first, middle)) = parents.split_first() else {
            return self.set(last, value);
        };
        let value = encode(value).map_err(|e| ConfigError::encoding(last, e))?;

        let mut view = expect_object(self.resolve(first, true)?, first)?;
        for key in middle {
            view = expect_object(view.into_child(key, true)?, key)?;
        }
        view.insert(last, value);
        Ok(())
    }

    /// Remove `key` from the user layer and return its value.
    ///
    /// A key that also exists in the defaults reappears on the next read.
    pub fn remove(&mut self, key: &str) -> Result<Value> {
        let value = self
            .user
            .remove(key)
            .ok_or_else(|| ConfigError::not_found(key))?;
        debug!(key, restored = self.default.contains_key(key), "removed config item");
        Ok(value)
    }

    /// Union of both layers' top-level keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let keys: BTreeSet<&String> = self.user.keys().chain(self.default.keys()).collect();
        keys.into_iter().cloned().collect()
    }

    /// Top-level keys of the defaults layer, sorted.
    pub fn default_keys(&self) -> Vec<String> {
        self.default.keys().cloned().collect()
    }

    /// Number of distinct top-level keys across both layers.
    pub fn len(&self) -> usize {
        let default_only = self
            .default
            .keys()
            .filter(|key| !self.user.contains_key(key.as_str()))
            .count();
        self.user.len() + default_only
    }

    /// Whether neither layer holds any key.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether either layer holds `key`. Does not copy anything.
    pub fn contains(&self, key: &str) -> bool {
        self.user.contains_key(key) || self.default.contains_key(key)
    }

    // Copy-on-read lookup shared by every read path.
    fn resolve(&mut self, key: &str, placeholders: bool) -> Result<Item<'_>> {
        if !self.user.contains_key(key) {
            match self.default.get(key).cloned() {
                Some(value) => {
                    debug!(key, "copying default into user layer");
                    self.user.insert(key.to_owned(), value);
                }
                None if placeholders => {
                    return Ok(Item::Object(View::pending(
                        Parent::Borrowed(self),
                        key,
                        placeholders,
                    )));
                }
                None => return Err(ConfigError::not_found(key)),
            }
        }
        self.user
            .get_mut(key)
            .map(|value| Item::wrap(value, placeholders))
            .ok_or_else(|| ConfigError::not_found(key))
    }
}

impl Materialize for Config {
    fn materialize(&mut self) -> &mut Map<String, Value> {
        &mut self.user
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("options", &self.options)
            .field("directory", &self.directory())
            .field("default_keys", &self.default.len())
            .field("user_keys", &self.user.len())
            .finish()
    }
}
