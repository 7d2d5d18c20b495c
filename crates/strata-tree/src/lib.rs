//! Value trees for the strata layered configuration store.
//!
//! A configuration layer is a JSON object. This crate holds the pure,
//! I/O-free algorithms that reconcile two layers:
//!
//! - [`union`] -- read-time merge of persisted user content over defaults
//! - [`diff`] -- save-time subtraction yielding the minimal overlay
//! - [`encode`] -- conversion of arbitrary `Serialize` values into a [`Value`],
//!   failing for anything JSON cannot represent
//!
//! # Merge Rules
//!
//! 1. Objects merge key-wise and recursively.
//! 2. Arrays are atomic: replaced wholesale, never concatenated or merged by index.
//! 3. Scalars and mismatched types: the top/user side wins verbatim.
//! 4. Results never alias their inputs; every subtree is copied.
//!
//! For any user tree `U` that is a union over defaults `D` (which is how the
//! store builds its user layer), `union(&diff(&U, &D), &D) == U`.

pub mod diff;
pub mod encode;
pub mod error;
pub mod union;
pub mod value;

pub use diff::diff;
pub use encode::encode;
pub use error::EncodeError;
pub use union::union;
pub use value::{is_truthy, kind};

// Re-export the tree types so downstream crates agree on one representation.
pub use serde_json::{Map, Value};

/// An object layer: string keys to values.
pub type Layer = Map<String, Value>;
