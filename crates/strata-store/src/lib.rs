//! Layered, file-backed configuration for strata.
//!
//! A [`Config`] combines a read-only defaults layer with a user layer. Only
//! the difference between the two is ever persisted, so defaults can evolve
//! without stale copies piling up in user files.
//!
//! # Layout
//!
//! A configuration directory holds at most two files:
//!
//! - `default.config.json` -- shipped defaults, never written by the store
//! - `user.config.json` -- the user overlay, written by [`Config::save`] and
//!   removed again when it would be empty
//!
//! Both are JSON objects written with sorted keys and four-space indentation.
//!
//! # Views and placeholders
//!
//! Reading an object returns a [`View`] that borrows the live node in the
//! user layer, so nested writes through it persist on the next save. With
//! [`ConfigOptions::use_placeholders`] enabled, reading a missing key yields
//! a placeholder view instead of an error; writing through a placeholder
//! creates it and every missing ancestor.
//!
//! # Example
//!
//! ```no_run
//! use strata_store::Config;
//!
//! # fn main() -> strata_store::Result<()> {
//! let mut config = Config::open("/etc/myapp")?;
//! config.set("theme", "dark")?;
//! config.set_path(&["editor", "tab_width"], &4)?;
//! config.save()?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod fs;
pub mod memory;
pub mod names;
pub mod options;
pub mod traits;
pub mod view;

pub use config::{Config, SaveOutcome};
pub use error::{ConfigError, Result};
pub use fs::FileLayerStore;
pub use memory::InMemoryLayerStore;
pub use options::{ConfigOptions, DEFAULT_CONFIG_FILE_NAME, USER_CONFIG_FILE_NAME};
pub use traits::LayerStore;
pub use view::{Item, View};

pub use strata_tree::{Layer, Map, Value};
