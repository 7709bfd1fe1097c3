//! Schema versions and member version ranges
//!
//! A [`SchemaVersion`] is the number a caller passes when writing or reading
//! a value. Members of an aggregate may be gated by a [`VersionRange`] so that
//! they only appear on the wire for a subset of versions.
//!
//! ## Zero Means "Not Applicable"
//!
//! - A type's own version of `0` means the type is unversioned.
//! - A range bound of `0` means the range is unbounded on that side.
//!
//! A pass version of `0` is compared like any other number, so it only
//! admits members without an `as_of` bound.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Schema version number
pub type SchemaVersion = u32;

/// The "unversioned" schema version
pub const UNVERSIONED: SchemaVersion = 0;

/// A version marker declared among an aggregate's members
///
/// Markers are sticky: a marker applies to every member declared after it
/// until another marker replaces the same bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionMarker {
    /// Members from here on exist as of this version (`0` clears the bound)
    AsOf(SchemaVersion),
    /// Members from here on exist until this version (`0` clears the bound)
    Until(SchemaVersion),
}

/// Inclusive range of schema versions in which a member is present
///
/// Either bound may be `0`, meaning unbounded on that side. The default
/// range is unbounded on both sides (unconditional membership).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VersionRange {
    /// Lowest version the member is present in (`0` = no lower bound)
    #[serde(default)]
    pub as_of: SchemaVersion,
    /// Highest version the member is present in (`0` = no upper bound)
    #[serde(default)]
    pub until: SchemaVersion,
}

/// How a contradictory bound should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeUpdate {
    /// The new bound was applied without conflict
    Applied,
    /// The new bound contradicted the other bound, which was reset to `0`
    ResetOther,
}

impl VersionRange {
    /// The unconditional range
    pub const UNBOUNDED: VersionRange = VersionRange { as_of: 0, until: 0 };

    /// Range present from `as_of` onwards
    pub const fn as_of(as_of: SchemaVersion) -> Self {
        VersionRange { as_of, until: 0 }
    }

    /// Range present up to and including `until`
    pub const fn until(until: SchemaVersion) -> Self {
        VersionRange { as_of: 0, until }
    }

    /// Range present from `as_of` through `until`
    ///
    /// Contradictory bounds are kept as given; use
    /// [`try_between`](Self::try_between) to reject them.
    pub const fn between(as_of: SchemaVersion, until: SchemaVersion) -> Self {
        VersionRange { as_of, until }
    }

    /// Range present from `as_of` through `until`, rejecting empty ranges
    pub fn try_between(as_of: SchemaVersion, until: SchemaVersion) -> crate::Result<Self> {
        if as_of != 0 && until != 0 && as_of > until {
            return Err(crate::Error::InvalidRange { as_of, until });
        }
        Ok(VersionRange { as_of, until })
    }

    /// True if neither bound is set
    pub const fn is_unbounded(&self) -> bool {
        self.as_of == 0 && self.until == 0
    }

    /// True if both bounds are set and describe an empty range
    pub const fn is_contradictory(&self) -> bool {
        self.as_of != 0 && self.until != 0 && self.as_of > self.until
    }

    /// Check whether a member with this range is present at `version`
    pub const fn admits(&self, version: SchemaVersion) -> bool {
        if self.as_of != 0 && version < self.as_of {
            return false;
        }
        if self.until != 0 && version > self.until {
            return false;
        }
        true
    }

    /// Apply a newly declared marker
    ///
    /// A new `as_of` above the current `until` resets `until` to `0`;
    /// a new `until` below the current `as_of` resets `as_of` to `0`.
    pub fn apply(&mut self, marker: VersionMarker) -> RangeUpdate {
        match marker {
            VersionMarker::AsOf(as_of) => {
                self.as_of = as_of;
                if as_of != 0 && self.until != 0 && as_of > self.until {
                    self.until = 0;
                    return RangeUpdate::ResetOther;
                }
            }
            VersionMarker::Until(until) => {
                self.until = until;
                if until != 0 && self.as_of != 0 && until < self.as_of {
                    self.as_of = 0;
                    return RangeUpdate::ResetOther;
                }
            }
        }
        RangeUpdate::Applied
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.as_of, self.until) {
            (0, 0) => write!(f, "any"),
            (a, 0) => write!(f, ">= {}", a),
            (0, u) => write!(f, "<= {}", u),
            (a, u) => write!(f, "{}..={}", a, u),
        }
    }
}
