//! Build-time code generation for verser
//!
//! Resolves a declaration set and renders the relevant types as Rust source
//! implementing the aggregate capability with explicit version guards. The
//! usual entry point is a build script:
//!
//! ```no_run
//! use std::path::Path;
//!
//! let out = Path::new(&std::env::var("OUT_DIR").unwrap()).join("serialize.rs");
//! verser_codegen::generate_file(Path::new("verser.toml"), Path::new("types.toml"), &out).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod emitter;
pub mod error;

pub use emitter::{RustEmitter, GENERATED_HEADER};
pub use error::{CodegenError, CodegenResult};

use std::path::Path;
use tracing::debug;
use verser_schema::{DeclarationSet, DeclarationSource, GeneratorConfig, RelevantClassResolver};

/// Resolve `source` under `config` and render the result
pub fn generate<S: DeclarationSource + ?Sized>(
    config: &GeneratorConfig,
    source: &S,
) -> CodegenResult<String> {
    config.validate()?;
    let schema = RelevantClassResolver::new(config).resolve(source)?;
    debug!(types = schema.len(), runtime = %config.runtime_path, "emitting source");
    Ok(RustEmitter::from_config(config).emit(&schema))
}

/// Generate from files and write the output
///
/// A missing config file is created with defaults. Returns the number of
/// bytes written.
pub fn generate_file(
    config_path: &Path,
    declarations_path: &Path,
    out_path: &Path,
) -> CodegenResult<usize> {
    GeneratorConfig::write_default_if_missing(config_path)?;
    let config = GeneratorConfig::from_file(config_path)?;
    let declarations = DeclarationSet::from_file(declarations_path)?;
    let source = generate(&config, &declarations)?;
    std::fs::write(out_path, &source).map_err(|e| CodegenError::Io {
        path: out_path.to_path_buf(),
        source: e,
    })?;
    Ok(source.len())
}
