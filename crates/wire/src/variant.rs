//! Tagged unions
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────────────┬──────────────────────────────────┐
//! │ Discriminant (1) │ Payload of the active alternative│
//! └──────────────────┴──────────────────────────────────┘
//! ```
//!
//! The discriminant is the 0-based position of the alternative in
//! declaration order. The [`Empty`] alternative writes nothing after it.

use crate::codec::{Decode, Encode};
use crate::serializer::{Deserializer, Serializer};
use std::io::{Read, Write};
use verser_core::Result;

/// Most alternatives a tagged union may declare
pub const MAX_ALTERNATIVES: usize = 254;

/// A Rust enum encoded as a tagged union
///
/// Implemented by [`impl_variant!`](crate::impl_variant!).
pub trait TaggedUnion {
    /// Type name used in errors
    const NAME: &'static str;
    /// Alternative names in discriminant order
    const ALTERNATIVES: &'static [&'static str];

    /// Discriminant of the active alternative
    fn discriminant(&self) -> u8;
}

/// The empty alternative of a tagged union
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Empty;

impl Encode for Empty {
    fn encode<W: Write>(&self, _s: &mut Serializer<W>) -> Result<()> {
        Ok(())
    }
}

impl Decode for Empty {
    fn decode<R: Read>(_d: &mut Deserializer<R>) -> Result<Self> {
        Ok(Empty)
    }
}

/// Discriminant of `name` within `alternatives`
///
/// Evaluated at compile time by the macros; an unknown name fails the build.
pub const fn alternative_index(alternatives: &[&str], name: &str) -> usize {
    let mut index = 0;
    while index < alternatives.len() {
        if str_eq(alternatives[index], name) {
            return index;
        }
        index += 1;
    }
    panic!("unknown alternative")
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}
