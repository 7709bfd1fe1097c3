//! Wire codec for verser
//!
//! This crate turns typed values into a compact, self-delimiting byte stream
//! and back:
//!
//! - Byte-level writer/reader: little-endian primitives and LEB128 varints
//! - Encode/Decode: shapes for primitives, containers, optionals and tuples
//! - Shared references: identity-preserving `Rc`/`Arc` encoding
//! - Aggregates: base delegation and version-gated fields
//! - Tagged unions and enumerations
//!
//! A [`Serializer`] or [`Deserializer`] carries the reference tables and the
//! schema version for one top-level pass.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate; // Aggregate capability traits and gate cursor
pub mod codec; // Encode/Decode traits and standard impls
pub mod reader; // Byte-level reader
pub mod refs; // Shared reference tables
pub mod serializer; // Serializer/Deserializer and one-shot helpers
pub mod varint; // LEB128 varints
pub mod variant; // Tagged unions
pub mod writer; // Byte-level writer

mod macros;

pub use aggregate::{Aggregate, AggregateRead, AggregateSchema, FieldDescriptor, GateCursor};
pub use codec::{Decode, Encode};
pub use reader::WireReader;
pub use refs::{ReadRefs, RefSlot, SharedPointer, SharedRef, WriteRefs};
pub use serializer::{
    from_bytes, from_bytes_versioned, from_bytes_with_limits, to_bytes, to_bytes_versioned,
    Deserializer, Serializer,
};
pub use variant::{alternative_index, Empty, TaggedUnion, MAX_ALTERNATIVES};
pub use writer::WireWriter;

// Re-export core types used by the codec surface and macro expansions
pub use verser_core::{
    ConversionError, DecodeLimits, Error, GatedRun, Result, SchemaVersion, VersionGate,
    VersionMarker, VersionRange, UNVERSIONED,
};
