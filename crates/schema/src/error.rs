//! Error types for schema loading and resolution

use std::path::PathBuf;
use thiserror::Error;
use verser_core::SchemaVersion;

/// Result type alias for resolution
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Result type alias for configuration and declaration loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// A declaration set that cannot be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A version marker emptied the range while contradictory ranges are rejected
    #[error("Contradictory version range on {type_name}::{field}: as_of {as_of} > until {until}")]
    ContradictoryRange {
        /// Declaring type
        type_name: String,
        /// First field the contradictory range would apply to
        field: String,
        /// Lower bound in effect
        as_of: SchemaVersion,
        /// Upper bound in effect
        until: SchemaVersion,
    },

    /// Two definitions share a name
    #[error("Duplicate definition of {name}")]
    DuplicateDefinition {
        /// Qualified type name
        name: String,
    },

    /// A base names a type with no definition while unknown bases are rejected
    #[error("{type_name} derives from unknown type {base}")]
    UnknownBase {
        /// Derived type
        type_name: String,
        /// Missing base
        base: String,
    },

    /// A type inherits from itself
    #[error("Inheritance cycle through {name}")]
    InheritanceCycle {
        /// A type on the cycle
        name: String,
    },
}

/// Configuration or declaration file problems
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written
    #[error("Failed to access '{path}': {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML text could not be parsed
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML text could not be produced
    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON text could not be parsed
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension names no supported format
    #[error("Unsupported declaration file '{0}' (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),

    /// A setting holds an unusable value
    #[error("Invalid setting {key}: {reason}")]
    Invalid {
        /// Setting name
        key: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
