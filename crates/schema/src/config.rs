//! Generator configuration via `verser.toml`
//!
//! Controls which declarations the resolver treats as serializable and how
//! the emitted code refers to the runtime. A commented default file can be
//! written next to the declarations on first use.

use crate::declaration::is_qualified_name;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "verser.toml";

/// What to do when a version marker empties the range in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangePolicy {
    /// Reset the other bound to `0` and continue
    #[default]
    Reset,
    /// Fail resolution
    Reject,
}

/// Generator configuration loaded from `verser.toml`
///
/// # Example
///
/// ```toml
/// marker_type = "Serializable"
/// allow_list = ["net::Packet"]
/// contradictory_ranges = "reject"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Types inheriting from this type are serializable
    #[serde(default = "default_marker_type")]
    pub marker_type: String,
    /// Types serializable regardless of inheritance
    #[serde(default)]
    pub allow_list: Vec<String>,
    /// Adaption records, merged with those of the declaration source
    #[serde(default)]
    pub adapted: Vec<String>,
    /// Handling of contradictory version markers
    #[serde(default)]
    pub contradictory_ranges: RangePolicy,
    /// Fail on bases with no definition instead of ignoring them
    #[serde(default)]
    pub strict_bases: bool,
    /// Path of the runtime crate in emitted code
    #[serde(default = "default_runtime_path")]
    pub runtime_path: String,
}

fn default_marker_type() -> String {
    "Serializable".to_string()
}

fn default_runtime_path() -> String {
    "::verser".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            marker_type: default_marker_type(),
            allow_list: Vec::new(),
            adapted: Vec::new(),
            contradictory_ranges: RangePolicy::Reset,
            strict_bases: false,
            runtime_path: default_runtime_path(),
        }
    }
}

impl GeneratorConfig {
    /// Add a type to the allow-list (builder pattern)
    pub fn with_allowed(mut self, name: impl Into<String>) -> Self {
        self.allow_list.push(name.into());
        self
    }

    /// Set the contradictory range policy (builder pattern)
    pub fn with_range_policy(mut self, policy: RangePolicy) -> Self {
        self.contradictory_ranges = policy;
        self
    }

    /// Reject unknown bases (builder pattern)
    pub fn with_strict_bases(mut self, strict: bool) -> Self {
        self.strict_bases = strict;
        self
    }

    /// Set the runtime path (builder pattern)
    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    /// Validate settings
    pub fn validate(&self) -> ConfigResult<()> {
        if !is_qualified_name(&self.marker_type) {
            return Err(ConfigError::Invalid {
                key: "marker_type",
                reason: format!("'{}' is not a type name", self.marker_type),
            });
        }
        if let Some(bad) = self.allow_list.iter().find(|name| !is_qualified_name(name)) {
            return Err(ConfigError::Invalid {
                key: "allow_list",
                reason: format!("'{}' is not a type name", bad),
            });
        }
        if !is_qualified_name(&self.runtime_path) {
            return Err(ConfigError::Invalid {
                key: "runtime_path",
                reason: format!("'{}' is not a crate path", self.runtime_path),
            });
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# verser generator configuration
#
# Types deriving (directly or transitively) from the marker type are
# serializable.
marker_type = "Serializable"

# Types serializable regardless of inheritance.
allow_list = []

# Adaption records: types from other crates to treat as serializable.
# Malformed entries are skipped with a warning.
adapted = []

# Version marker that empties the range in effect:
#   "reset"  = reset the other bound and continue (default)
#   "reject" = fail generation
contradictory_ranges = "reset"

# Fail on bases that have no definition instead of ignoring them.
strict_bases = false

# Path of the runtime crate in generated code.
runtime_path = "::verser"
"#
    }

    /// Read, parse and validate config from a file path.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config: GeneratorConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> ConfigResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| ConfigError::io(path, e))?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::io(path, e))
    }
}
