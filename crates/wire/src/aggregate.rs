//! Aggregate capability traits
//!
//! An aggregate is a struct whose members are written field by field, after
//! the members of its bases. Bases are modelled as embedded fields whose type
//! is itself an aggregate; their members are flattened into the enclosing
//! encoding rather than framed as a nested value.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────┬──────────────────────────┐
//! │ base 1 members       │ base 2 members       │ own fields (gated runs)  │
//! └──────────────────────┴──────────────────────┴──────────────────────────┘
//! ```
//!
//! A type declaring a non-zero version puts a varint version in front of its
//! own slice of this layout, so a versioned base carries its own prefix.
//!
//! Implementations come from the [`aggregate!`](crate::aggregate!) macro or
//! from source emitted by the code generator. Both walk the same
//! [`AggregateSchema`].

use crate::serializer::{Deserializer, Serializer};
use std::io::{Read, Write};
use tracing::trace;
use verser_core::{
    ConversionError, GatedRun, Result, SchemaVersion, VersionGate, VersionRange,
};

/// One serialized field of an aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name
    pub name: &'static str,
    /// Versions in which the field is on the wire
    pub range: VersionRange,
}

impl FieldDescriptor {
    /// Describe a field
    pub const fn new(name: &'static str, range: VersionRange) -> Self {
        FieldDescriptor { name, range }
    }

    /// Describe an unconditional field
    pub const fn unconditional(name: &'static str) -> Self {
        FieldDescriptor {
            name,
            range: VersionRange::UNBOUNDED,
        }
    }
}

/// Static description of an aggregate's wire layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateSchema {
    /// Type name
    pub name: &'static str,
    /// The type's own version (`0` = unversioned)
    pub version: SchemaVersion,
    /// Relevant bases, in delegation order
    pub bases: &'static [&'static str],
    /// Relevant fields, in declaration order
    pub fields: &'static [FieldDescriptor],
}

impl AggregateSchema {
    /// Look up a field by position
    pub fn field(&self, index: usize) -> Result<&FieldDescriptor> {
        self.fields.get(index).ok_or_else(|| {
            ConversionError::UnknownMember {
                type_name: self.name,
                index,
            }
            .into()
        })
    }

    /// Position of a field by name
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Fields on the wire at `version`, in order
    pub fn present_fields(
        &self,
        version: SchemaVersion,
    ) -> impl Iterator<Item = &FieldDescriptor> + '_ {
        self.fields
            .iter()
            .filter(move |field| field.range.admits(version))
    }

    /// Consecutive fields grouped by shared range
    pub fn runs(&self) -> Vec<GatedRun> {
        VersionGate::partition(self.fields.iter().map(|field| field.range))
    }
}

/// Write half of the aggregate capability
pub trait Aggregate: 'static {
    /// Wire layout of the type
    const SCHEMA: AggregateSchema;

    /// Write base members, then own fields, at the serializer's version
    fn write_members<W: Write>(&self, s: &mut Serializer<W>) -> Result<()>;
}

/// Read half of the aggregate capability
///
/// Reading fills a default-constructed value in place, so types without a
/// default stay write-only.
pub trait AggregateRead: Aggregate + Default {
    /// Read base members, then own fields, at the deserializer's version
    fn read_members<R: Read>(&mut self, d: &mut Deserializer<R>) -> Result<()>;
}

/// Evaluates one version guard per run while fields are walked in order
///
/// ```
/// use verser_wire::{GateCursor, VersionRange};
///
/// let mut gate = GateCursor::new(1);
/// assert!(gate.enter(VersionRange::UNBOUNDED));
/// assert!(!gate.enter(VersionRange::as_of(2)));
/// assert!(!gate.enter(VersionRange::as_of(2)));
/// assert!(gate.enter(VersionRange::UNBOUNDED));
/// gate.finish();
/// ```
#[derive(Debug, Clone)]
pub struct GateCursor {
    gate: VersionGate,
    version: SchemaVersion,
    admitted: bool,
}

impl GateCursor {
    /// Start walking fields at `version`
    pub fn new(version: SchemaVersion) -> Self {
        GateCursor {
            gate: VersionGate::new(),
            version,
            admitted: true,
        }
    }

    /// Advance to the next field; true if it is on the wire
    pub fn enter(&mut self, range: VersionRange) -> bool {
        let transition = self.gate.advance(range);
        if transition.starts_run() {
            self.admitted = range.admits(self.version);
            trace!(?transition, version = self.version, admitted = self.admitted, "gate transition");
        }
        self.admitted
    }

    /// Close the last run
    pub fn finish(&mut self) {
        if let Some(closed) = self.gate.finish() {
            trace!(%closed, "gate closed");
        }
        self.admitted = true;
    }
}
