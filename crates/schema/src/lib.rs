//! Schema resolution for verser
//!
//! Turns type declarations into the per-type layout the code generator
//! emits:
//! - Declarations: the model a declaration source supplies (TOML/JSON loadable)
//! - Resolver: relevance, base deduplication, field selection and version ranges
//! - GeneratorConfig: `verser.toml` settings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod declaration;
pub mod error;
pub mod resolver;

pub use config::{GeneratorConfig, RangePolicy, CONFIG_FILE_NAME};
pub use declaration::{
    Access, AccessGrants, BaseDecl, DeclarationSet, DeclarationSource, FieldDecl, MemberDecl,
    Origin, TypeDecl,
};
pub use error::{ConfigError, ConfigResult, ResolveError, ResolveResult};
pub use resolver::{RelevantClassResolver, ResolvedBase, ResolvedField, ResolvedSchema, ResolvedType};
