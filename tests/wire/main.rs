//! Integration tests for the wire codec.
//!
//! Unit tests in crates/wire/src/ cover each primitive and container shape
//! in isolation. These tests cover whole values built from several shapes:
//! aggregates with bases, version-gated fields, shared references inside
//! aggregates, and tagged unions carrying aggregates.

#[path = "../common/mod.rs"]
mod common;

mod aggregates;
mod shapes;
mod shared_refs;
mod variants;
mod versioning;
