//! Error types for value encoding.

use std::fmt::Display;

use thiserror::Error;

/// A value could not be represented as a JSON tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The value's `Serialize` implementation produced something JSON cannot hold
    /// (for example a map with non-string keys).
    #[error("value is not representable as JSON: {0}")]
    Unrepresentable(String),

    /// A float was `NaN` or infinite. JSON numbers must be finite.
    #[error("non-finite number {0} is not representable as JSON")]
    NonFinite(String),
}

impl serde::ser::Error for EncodeError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Unrepresentable(msg.to_string())
    }
}

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unrepresentable(err.to_string())
    }
}
