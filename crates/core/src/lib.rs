//! Core types for verser
//!
//! This crate defines the foundational types shared by the wire codec, the
//! resolver and the code generator:
//! - SchemaVersion / VersionRange / VersionMarker: member version annotations
//! - VersionGate: groups consecutive members into version-gated runs
//! - DecodeLimits: bounds enforced while reading untrusted streams
//! - Error / ConversionError: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod gate;
pub mod limits;
pub mod version;

pub use error::{ConversionError, Error, Result};
pub use gate::{GateState, GateTransition, GatedRun, VersionGate};
pub use limits::DecodeLimits;
pub use version::{RangeUpdate, SchemaVersion, VersionMarker, VersionRange, UNVERSIONED};
