//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from any suite's main.rs.

#![allow(dead_code)]

use std::fmt::Debug;
use verser::{from_bytes, from_bytes_versioned, to_bytes, to_bytes_versioned, Decode, Encode};
use verser::SchemaVersion;

/// Encode then decode at the type's own version, asserting equality.
pub fn round_trip<T: Encode + Decode + PartialEq + Debug>(value: &T) -> Vec<u8> {
    let bytes = to_bytes(value).unwrap();
    let decoded: T = from_bytes(&bytes).unwrap();
    assert_eq!(&decoded, value);
    bytes
}

/// Encode then decode at an explicit version, returning the decoded value.
pub fn through_version<T: Encode + Decode>(value: &T, version: SchemaVersion) -> T {
    let bytes = to_bytes_versioned(value, version).unwrap();
    from_bytes_versioned(&bytes, version).unwrap()
}

/// Little-endian bytes of a `u32`, for building expected streams.
pub fn le32(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}
