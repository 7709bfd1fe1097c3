//! Error types for verser
//!
//! This module defines the error types shared by the wire codec and the
//! aggregate dispatcher. We use `thiserror` for automatic `Display` and
//! `Error` trait implementations.
//!
//! Every decoding error is fatal for the read that produced it: a binary
//! stream has no redundancy to resynchronize on, so the position of the
//! reader can no longer be trusted.

use crate::version::SchemaVersion;
use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;

/// Result type alias for verser operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for (de)serialization
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying stream (short reads surface as `UnexpectedEof`)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// The stream contains a value that cannot be converted to the expected type
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// String bytes on the wire are not valid UTF-8
    #[error("Invalid UTF-8 string: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    /// A length prefix exceeds the configured limit
    #[error("Length {length} exceeds limit {limit}")]
    LengthLimitExceeded {
        /// Length read from the stream
        length: u64,
        /// Configured maximum
        limit: u64,
    },

    /// Nesting exceeds the configured depth limit
    #[error("Nesting depth {depth} exceeds limit {limit}")]
    DepthLimitExceeded {
        /// Depth reached
        depth: usize,
        /// Configured maximum
        limit: usize,
    },

    /// A version range with `as_of > until`
    #[error("Invalid version range: as_of {as_of} > until {until}")]
    InvalidRange {
        /// Lower bound
        as_of: SchemaVersion,
        /// Upper bound
        until: SchemaVersion,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// True if the error was caused by the stream ending early
    pub fn is_truncation(&self) -> bool {
        matches!(self, Error::IoError(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }
}

/// A wire value that cannot be converted to the expected Rust type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Tagged union discriminant does not name a declared alternative
    #[error("Discriminant {discriminant} out of range for {type_name} ({alternatives} alternatives)")]
    DiscriminantOutOfRange {
        /// Union type being decoded
        type_name: &'static str,
        /// Discriminant read from the stream
        discriminant: u8,
        /// Number of declared alternatives
        alternatives: usize,
    },

    /// Shared reference alias names an id not seen in this pass
    #[error("Unknown shared reference id {id}")]
    UnknownReference {
        /// Wire id
        id: u64,
    },

    /// Shared reference alias names an instance of a different type
    #[error("Shared reference id {id} is not a {expected}")]
    ReferenceTypeMismatch {
        /// Wire id
        id: u64,
        /// Expected pointer type
        expected: &'static str,
    },

    /// Shared reference mode byte is not 0, 1 or 2 (optionally with the big-id flag)
    #[error("Invalid shared reference mode {mode:#04x}")]
    InvalidReferenceMode {
        /// Mode byte read from the stream
        mode: u8,
    },

    /// A null reference was found where a non-nullable one is required
    #[error("Null reference where {expected} is required")]
    NullReference {
        /// Expected pointer type
        expected: &'static str,
    },

    /// Integer value names no variant of an enumeration
    #[error("Invalid value {value} for enum {type_name}")]
    InvalidEnumValue {
        /// Enum type being decoded
        type_name: &'static str,
        /// Underlying integer read from the stream
        value: i128,
    },

    /// Boolean byte other than 0 or 1
    #[error("Invalid bool byte {0:#04x}")]
    InvalidBool(u8),

    /// Code point that is not a valid `char`
    #[error("Invalid char {0:#x}")]
    InvalidChar(u32),

    /// Variable-length integer longer than 64 bits
    #[error("Variable-length integer overflows u64")]
    VarintOverflow,

    /// Integer does not fit the target type
    #[error("Value {value} does not fit in {target}")]
    IntegerOverflow {
        /// Value read from the stream
        value: u64,
        /// Target type name
        target: &'static str,
    },

    /// Aggregate dispatch was asked for a member that does not exist
    #[error("Unknown member index {index} of {type_name}")]
    UnknownMember {
        /// Aggregate type
        type_name: &'static str,
        /// Member index
        index: usize,
    },

    /// Embedded version is newer than the type's declared version
    #[error("{type_name} encoded at version {version}, newest known is {supported}")]
    UnsupportedVersion {
        /// Aggregate type
        type_name: &'static str,
        /// Version read from the stream
        version: SchemaVersion,
        /// Version the type declares
        supported: SchemaVersion,
    },
}
