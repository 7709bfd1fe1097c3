//! Decoding limits
//!
//! Length prefixes and nesting depth come from untrusted bytes. These limits
//! bound what a reader will accept before failing the read, so a corrupt or
//! hostile stream cannot request a multi-gigabyte allocation or recurse
//! without bound.

use crate::error::{Error, Result};

/// Limits enforced while decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum element count or byte length of one length prefix (default: 64M)
    pub max_length: u64,

    /// Maximum nesting depth of aggregates, containers and references (default: 128)
    pub max_depth: usize,

    /// Maximum number of elements reserved up front for one container (default: 4096)
    ///
    /// Containers longer than this still decode; they grow as elements arrive.
    pub max_prealloc: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        DecodeLimits {
            max_length: 64 * 1024 * 1024,
            max_depth: 128,
            max_prealloc: 4096,
        }
    }
}

impl DecodeLimits {
    /// Create limits with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits with small values for testing
    pub fn with_small_limits() -> Self {
        DecodeLimits {
            max_length: 100,
            max_depth: 10,
            max_prealloc: 16,
        }
    }

    /// Set maximum length prefix (builder pattern).
    pub fn with_max_length(mut self, max_length: u64) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set maximum nesting depth (builder pattern).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set maximum preallocation (builder pattern).
    pub fn with_max_prealloc(mut self, max_prealloc: usize) -> Self {
        self.max_prealloc = max_prealloc;
        self
    }

    /// Validate the limits.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.max_prealloc as u64 > self.max_length {
            return Err(Error::InvalidConfig(format!(
                "max_prealloc {} exceeds max_length {}",
                self.max_prealloc, self.max_length
            )));
        }
        Ok(())
    }

    /// Check a length prefix read from the stream
    pub fn check_length(&self, length: u64) -> Result<usize> {
        if length > self.max_length {
            return Err(Error::LengthLimitExceeded {
                length,
                limit: self.max_length,
            });
        }
        usize::try_from(length).map_err(|_| Error::LengthLimitExceeded {
            length,
            limit: usize::MAX as u64,
        })
    }

    /// Check a nesting depth
    pub fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::DepthLimitExceeded {
                depth,
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    /// Capacity to reserve for a container of `length` elements
    pub fn prealloc(&self, length: usize) -> usize {
        length.min(self.max_prealloc)
    }
}
