//! Store construction options.

use serde::{Deserialize, Serialize};

/// Default name of the read-only defaults layer resource.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "default.config.json";

/// Default name of the persisted user overlay resource.
pub const USER_CONFIG_FILE_NAME: &str = "user.config.json";

/// Options controlling where a [`Config`](crate::Config) keeps its layers and
/// how it treats missing keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOptions {
    /// Resource name of the defaults layer.
    pub default_file_name: String,
    /// Resource name of the user overlay.
    pub user_file_name: String,
    /// Return placeholders instead of failing when a key is missing from
    /// every layer.
    pub use_placeholders: bool,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            default_file_name: DEFAULT_CONFIG_FILE_NAME.to_owned(),
            user_file_name: USER_CONFIG_FILE_NAME.to_owned(),
            use_placeholders: false,
        }
    }
}

impl ConfigOptions {
    pub fn with_default_file_name(mut self, name: impl Into<String>) -> Self {
        self.default_file_name = name.into();
        self
    }

    pub fn with_user_file_name(mut self, name: impl Into<String>) -> Self {
        self.user_file_name = name.into();
        self
    }

    pub fn with_placeholders(mut self, enabled: bool) -> Self {
        self.use_placeholders = enabled;
        self
    }
}
