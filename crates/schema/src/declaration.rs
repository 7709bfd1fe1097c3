//! Type declarations fed to the resolver
//!
//! A declaration source is whatever discovered the program's aggregate types:
//! a parser front end, a hand-written list, or a TOML/JSON file written by an
//! external tool. The resolver only sees the model in this module.
//!
//! # Example
//!
//! ```toml
//! adapted = ["geo::Point"]
//!
//! [[types]]
//! name = "geo::Shape"
//! version = 3
//! bases = [{ ty = "Serializable" }]
//!
//! [[types.members]]
//! field = { name = "id", ty = "u32" }
//!
//! [[types.members]]
//! marker = { as_of = 2 }
//!
//! [[types.members]]
//! field = { name = "area", ty = "f64" }
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use verser_core::{SchemaVersion, VersionMarker};

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Visible to everyone
    #[default]
    Public,
    /// Visible to derived types
    Protected,
    /// Visible to the type only
    Private,
}

/// Where a declaration was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// In the unit being processed; relevant types are emitted
    #[default]
    Main,
    /// Pulled in from elsewhere; never emitted
    Included,
}

/// Extended access a type grants the serializer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessGrants {
    /// Non-public fields are written
    #[serde(default)]
    pub private_write: bool,
    /// Non-public fields are read
    #[serde(default)]
    pub private_read: bool,
}

impl AccessGrants {
    /// Both directions granted
    pub const FULL: AccessGrants = AccessGrants {
        private_write: true,
        private_read: true,
    };
}

/// A base type embedded in a derived type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseDecl {
    /// Qualified base type name
    pub ty: String,
    /// Field holding the base (defaults to the snake-cased type name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl BaseDecl {
    /// Base embedded under the default field name
    pub fn new(ty: impl Into<String>) -> Self {
        BaseDecl {
            ty: ty.into(),
            field: None,
        }
    }

    /// Base embedded under an explicit field name
    pub fn embedded_as(ty: impl Into<String>, field: impl Into<String>) -> Self {
        BaseDecl {
            ty: ty.into(),
            field: Some(field.into()),
        }
    }

    /// Name of the field holding the base
    pub fn field_name(&self) -> String {
        match &self.field {
            Some(field) => field.clone(),
            None => snake_case(short_name(&self.ty)),
        }
    }
}

/// A data member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name
    pub name: String,
    /// Field type as written
    #[serde(default)]
    pub ty: String,
    /// Visibility
    #[serde(default)]
    pub access: Access,
    /// Immutable member
    #[serde(default, rename = "const")]
    pub is_const: bool,
    /// Static (type-level) member
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

impl FieldDecl {
    /// A public, mutable instance field
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        FieldDecl {
            name: name.into(),
            ty: ty.into(),
            access: Access::Public,
            is_const: false,
            is_static: false,
        }
    }

    /// Set visibility (builder pattern)
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Mark as const (builder pattern)
    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    /// Mark as static (builder pattern)
    pub fn type_level(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// One entry of a type's member list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberDecl {
    /// A data member
    Field(FieldDecl),
    /// A version marker applying to the members after it
    Marker(VersionMarker),
}

fn yes() -> bool {
    true
}

/// A type declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Qualified name (`::`-separated)
    pub name: String,
    /// False for a forward declaration
    #[serde(default = "yes")]
    pub definition: bool,
    /// The type's own schema version
    #[serde(default)]
    pub version: SchemaVersion,
    /// Bases in declaration order
    #[serde(default)]
    pub bases: Vec<BaseDecl>,
    /// Members in declaration order
    #[serde(default)]
    pub members: Vec<MemberDecl>,
    /// Containment
    #[serde(default)]
    pub origin: Origin,
    /// Extended access grants
    #[serde(default)]
    pub grants: AccessGrants,
    /// The type has a default constructor
    #[serde(default = "yes")]
    pub default_constructible: bool,
}

impl TypeDecl {
    /// A default-constructible definition in the main unit
    pub fn new(name: impl Into<String>) -> Self {
        TypeDecl {
            name: name.into(),
            definition: true,
            version: 0,
            bases: Vec::new(),
            members: Vec::new(),
            origin: Origin::Main,
            grants: AccessGrants::default(),
            default_constructible: true,
        }
    }

    /// A forward declaration
    pub fn forward(name: impl Into<String>) -> Self {
        TypeDecl {
            definition: false,
            ..TypeDecl::new(name)
        }
    }

    /// Set the type's version (builder pattern)
    pub fn with_version(mut self, version: SchemaVersion) -> Self {
        self.version = version;
        self
    }

    /// Append a base (builder pattern)
    pub fn with_base(mut self, base: BaseDecl) -> Self {
        self.bases.push(base);
        self
    }

    /// Append a field (builder pattern)
    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.members.push(MemberDecl::Field(field));
        self
    }

    /// Append a version marker (builder pattern)
    pub fn with_marker(mut self, marker: VersionMarker) -> Self {
        self.members.push(MemberDecl::Marker(marker));
        self
    }

    /// Set access grants (builder pattern)
    pub fn with_grants(mut self, grants: AccessGrants) -> Self {
        self.grants = grants;
        self
    }

    /// Mark as included from elsewhere (builder pattern)
    pub fn included(mut self) -> Self {
        self.origin = Origin::Included;
        self
    }

    /// Mark as lacking a default constructor (builder pattern)
    pub fn without_default(mut self) -> Self {
        self.default_constructible = false;
        self
    }

    /// Last path segment of the name
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }
}

/// Supplier of type declarations
pub trait DeclarationSource {
    /// Declarations in discovery order
    fn declarations(&self) -> &[TypeDecl];

    /// Raw adaption records naming types to treat as serializable
    fn adaption_records(&self) -> &[String] {
        &[]
    }
}

/// An in-memory declaration list, loadable from TOML or JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationSet {
    /// Adaption records
    #[serde(default)]
    pub adapted: Vec<String>,
    /// Type declarations
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

impl DeclarationSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration (builder pattern)
    pub fn with_type(mut self, decl: TypeDecl) -> Self {
        self.types.push(decl);
        self
    }

    /// Append an adaption record (builder pattern)
    pub fn with_adapted(mut self, record: impl Into<String>) -> Self {
        self.adapted.push(record.into());
        self
    }

    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Parse a JSON document
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a `.toml` or `.json` file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("json") => Self::from_json_str(&text),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

impl DeclarationSource for DeclarationSet {
    fn declarations(&self) -> &[TypeDecl] {
        &self.types
    }

    fn adaption_records(&self) -> &[String] {
        &self.adapted
    }
}

/// Last `::` segment of a qualified name
pub fn short_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

/// True if `name` is a `::`-separated path of identifiers
pub fn is_qualified_name(name: &str) -> bool {
    let name = name.strip_prefix("::").unwrap_or(name);
    !name.is_empty() && name.split("::").all(is_identifier)
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
