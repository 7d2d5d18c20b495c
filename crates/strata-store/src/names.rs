//! Names reserved by the store's own interface.
//!
//! Attribute-style writes ([`Config::set_attr`](crate::Config::set_attr))
//! share a namespace with the store's operations, so a write to one of these
//! names is rejected instead of shadowing the operation.

use crate::error::{ConfigError, Result};

/// Operation and field names owned by [`Config`](crate::Config).
pub const RESERVED_NAMES: &[&str] = &[
    "contains",
    "default_keys",
    "default_path",
    "directory",
    "effective",
    "get",
    "get_default",
    "is_empty",
    "item",
    "keys",
    "len",
    "load",
    "open",
    "open_with",
    "options",
    "overlay",
    "path",
    "remove",
    "save",
    "set",
    "set_attr",
    "set_path",
    "user_path",
    "with_store",
];

/// Returns `true` if `name` belongs to the store's own interface.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.binary_search(&name).is_ok()
}

/// Reject `name` if it is reserved.
///
/// # Examples
///
/// ```
/// use strata_store::names::validate_attr_name;
///
/// assert!(validate_attr_name("theme").is_ok());
/// assert!(validate_attr_name("keys").is_err());
/// ```
pub fn validate_attr_name(name: &str) -> Result<()> {
    if is_reserved(name) {
        return Err(ConfigError::ReservedName {
            name: name.to_owned(),
        });
    }
    Ok(())
}
