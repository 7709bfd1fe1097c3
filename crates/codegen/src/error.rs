//! Error types for code generation

use std::path::PathBuf;
use thiserror::Error;
use verser_schema::{ConfigError, ResolveError};

/// Result type alias for code generation
pub type CodegenResult<T> = std::result::Result<T, CodegenError>;

/// Errors raised while generating code
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Configuration or declaration file problem
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Declarations could not be resolved
    #[error("Resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    /// Output could not be written
    #[error("Failed to write '{path}': {source}")]
    Io {
        /// Output path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}
