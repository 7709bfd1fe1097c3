//! verser - versioned binary serialization
//!
//! Encodes typed values into a compact, self-delimiting byte stream:
//! primitives, containers, optionals, shared references, tagged unions and
//! aggregates whose fields appear only in some schema versions.
//!
//! # Quick Start
//!
//! ```
//! use verser::{aggregate, from_bytes_versioned, to_bytes_versioned};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Reading {
//!     sensor: String,
//!     celsius: f32,
//!     humidity: u8,
//! }
//!
//! aggregate! {
//!     Reading {
//!         field sensor;
//!         field celsius;
//!         field humidity [3, 0];
//!     }
//! }
//!
//! let reading = Reading { sensor: "t1".into(), celsius: 21.5, humidity: 40 };
//!
//! // Version 2 streams predate the humidity field.
//! let old = to_bytes_versioned(&reading, 2)?;
//! let decoded: Reading = from_bytes_versioned(&old, 2)?;
//! assert_eq!(decoded.humidity, 0);
//!
//! let current = to_bytes_versioned(&reading, 3)?;
//! assert_eq!(from_bytes_versioned::<Reading>(&current, 3)?, reading);
//! # Ok::<(), verser::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `verser-core`: versions, ranges, the version gate and errors
//! - `verser-wire`: the codec, reference tables and aggregate dispatch
//! - `verser-schema` / `verser-codegen`: build-time resolution and emission
//!   for types discovered by an external declaration source
//!
//! This crate re-exports the runtime; the build-time crates are used from
//! build scripts.

pub use verser_wire::*;
