//! Serializer and deserializer
//!
//! A [`Serializer`] owns the byte writer, the write-side reference table and
//! the schema version of the current pass. A [`Deserializer`] owns the mirror
//! state. Every top-level call starts a fresh pass: reference tables are
//! reset and the effective version is re-established.
//!
//! ## Version Prefix
//!
//! Every aggregate whose type declares a non-zero version starts its own
//! encoding with a varint version, wherever it sits: root, element, field,
//! shared payload or base. The writer emits the version threaded down from
//! the enclosing pass, or the type's own version when the pass is
//! unversioned, capped at the type's own version. The reader takes the
//! embedded value as the version for that aggregate's fields and bases and
//! rejects one newer than the type declares. Unversioned aggregates inherit
//! the enclosing version unchanged.

use crate::aggregate::{Aggregate, AggregateRead};
use crate::codec::{Decode, Encode};
use crate::reader::WireReader;
use crate::refs::{
    ReadRefs, SharedPointer, WriteRefs, MODE_BIG_ID, MODE_FIRST, MODE_MASK, MODE_NULL,
    MODE_REPEAT,
};
use crate::writer::WireWriter;
use smallvec::SmallVec;
use std::any::{type_name, TypeId};
use std::io::{Read, Write};
use tracing::{debug, trace};
use verser_core::{
    ConversionError, DecodeLimits, Result, SchemaVersion, VersionRange, UNVERSIONED,
};

/// Version an aggregate declaring `own` is written at inside a pass at `threaded`
fn prefix_version(threaded: SchemaVersion, own: SchemaVersion) -> SchemaVersion {
    if threaded == UNVERSIONED {
        own
    } else {
        threaded.min(own)
    }
}

/// Base types already delegated to within one aggregate encoding
type BaseFrame = SmallVec<[TypeId; 4]>;

/// Binary serializer
pub struct Serializer<W> {
    writer: WireWriter<W>,
    refs: WriteRefs,
    version: SchemaVersion,
    base_frames: Vec<BaseFrame>,
}

impl<W: Write> Serializer<W> {
    /// Create a serializer writing into `writer`
    pub fn new(writer: W) -> Self {
        Serializer {
            writer: WireWriter::new(writer),
            refs: WriteRefs::new(),
            version: UNVERSIONED,
            base_frames: Vec::new(),
        }
    }

    /// Effective schema version of the current pass
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// True if the current version satisfies `version >= as_of`
    pub fn version_at_least(&self, as_of: SchemaVersion) -> bool {
        VersionRange::as_of(as_of).admits(self.version)
    }

    /// True if the current version satisfies `version <= until`
    pub fn version_at_most(&self, until: SchemaVersion) -> bool {
        VersionRange::until(until).admits(self.version)
    }

    /// Byte writer for primitive output
    pub fn writer(&mut self) -> &mut WireWriter<W> {
        &mut self.writer
    }

    /// Reference table of the current pass
    pub fn refs(&self) -> &WriteRefs {
        &self.refs
    }

    /// Unwrap the underlying writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Write a root value in an unversioned pass
    ///
    /// Versioned aggregates are written at their own declared version.
    pub fn serialize<T: Encode + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.serialize_versioned(value, UNVERSIONED)
    }

    /// Write a root value at an explicit version
    pub fn serialize_versioned<T: Encode + ?Sized>(
        &mut self,
        value: &T,
        version: SchemaVersion,
    ) -> Result<()> {
        self.refs.reset();
        self.base_frames.clear();
        self.version = version;

        let start = self.writer.bytes_written();
        value.encode(self)?;

        debug!(
            root = type_name::<T>(),
            version,
            bytes = self.writer.bytes_written() - start,
            shared = self.refs.len(),
            "serialized value"
        );
        Ok(())
    }

    /// Write a shared reference (`None` is the null reference)
    pub fn write_shared<P>(&mut self, pointer: Option<&P>) -> Result<()>
    where
        P: SharedPointer,
        P::Target: Encode,
    {
        let pointer = match pointer {
            Some(pointer) => pointer,
            None => return self.writer.write_u8(MODE_NULL),
        };

        let slot = self.refs.slot(pointer.address());
        let mode = slot.mode();
        self.writer.write_u8(mode)?;
        if mode & MODE_BIG_ID != 0 {
            self.writer.write_u64(slot.id())?;
        } else {
            self.writer.write_var_u64(slot.id())?;
        }

        if mode & MODE_MASK == MODE_FIRST {
            trace!(id = slot.id(), pointer = type_name::<P>(), "writing shared payload");
            pointer.target().encode(self)
        } else {
            trace!(id = slot.id(), pointer = type_name::<P>(), "aliasing shared value");
            Ok(())
        }
    }

    /// Write an aggregate's bases and fields in a fresh base frame
    pub fn write_aggregate<A: Aggregate>(&mut self, value: &A) -> Result<()> {
        let mut frame = BaseFrame::new();
        frame.push(TypeId::of::<A>());
        self.base_frames.push(frame);
        let result = self.write_own_version(value);
        self.base_frames.pop();
        result
    }

    /// Delegate to a base's members unless that base was already written
    /// within the current aggregate
    pub fn delegate_base<B: Aggregate>(&mut self, base: &B) -> Result<()> {
        if !enter_base::<B>(&mut self.base_frames) {
            trace!(base = B::SCHEMA.name, "skipping shared base");
            return Ok(());
        }
        self.write_own_version(base)
    }

    fn write_own_version<A: Aggregate>(&mut self, value: &A) -> Result<()> {
        let own = A::SCHEMA.version;
        if own == UNVERSIONED {
            return value.write_members(self);
        }

        let version = prefix_version(self.version, own);
        trace!(aggregate = A::SCHEMA.name, version, "writing version prefix");
        self.writer.write_var_u64(version as u64)?;
        let outer = std::mem::replace(&mut self.version, version);
        let result = value.write_members(self);
        self.version = outer;
        result
    }
}

/// Binary deserializer
pub struct Deserializer<R> {
    reader: WireReader<R>,
    refs: ReadRefs,
    version: SchemaVersion,
    default_version: SchemaVersion,
    depth: usize,
    base_frames: Vec<BaseFrame>,
}

impl<R: Read> Deserializer<R> {
    /// Create a deserializer with default limits
    pub fn new(reader: R) -> Self {
        Self::build(reader, DecodeLimits::default())
    }

    /// Create a deserializer with explicit limits
    ///
    /// Fails with `InvalidConfig` if the limits do not validate.
    pub fn with_limits(reader: R, limits: DecodeLimits) -> Result<Self> {
        limits.validate()?;
        Ok(Self::build(reader, limits))
    }

    fn build(reader: R, limits: DecodeLimits) -> Self {
        Deserializer {
            reader: WireReader::with_limits(reader, limits),
            refs: ReadRefs::new(),
            version: UNVERSIONED,
            default_version: UNVERSIONED,
            depth: 0,
            base_frames: Vec::new(),
        }
    }

    /// Version of each pass, seen by aggregates that embed no version (builder pattern)
    pub fn with_default_version(mut self, version: SchemaVersion) -> Self {
        self.default_version = version;
        self
    }

    /// Effective schema version of the current pass
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// True if the current version satisfies `version >= as_of`
    pub fn version_at_least(&self, as_of: SchemaVersion) -> bool {
        VersionRange::as_of(as_of).admits(self.version)
    }

    /// True if the current version satisfies `version <= until`
    pub fn version_at_most(&self, until: SchemaVersion) -> bool {
        VersionRange::until(until).admits(self.version)
    }

    /// Byte reader for primitive input
    pub fn reader(&mut self) -> &mut WireReader<R> {
        &mut self.reader
    }

    /// Limits in force
    pub fn limits(&self) -> &DecodeLimits {
        self.reader.limits()
    }

    /// Reference table of the current pass
    pub fn refs(&self) -> &ReadRefs {
        &self.refs
    }

    /// Total bytes consumed so far
    pub fn bytes_read(&self) -> u64 {
        self.reader.bytes_read()
    }

    /// Unwrap the underlying reader
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Read a root value
    ///
    /// The pass starts at the default version; versioned aggregates switch
    /// to the version embedded in their own encoding.
    pub fn deserialize<T: Decode>(&mut self) -> Result<T> {
        self.refs.reset();
        self.base_frames.clear();
        self.depth = 0;
        self.version = self.default_version;

        let start = self.reader.bytes_read();
        let value = T::decode(self)?;
        debug!(
            root = type_name::<T>(),
            version = self.version,
            bytes = self.reader.bytes_read() - start,
            shared = self.refs.len(),
            "deserialized value"
        );
        Ok(value)
    }

    /// Run `f` one nesting level deeper, enforcing the depth limit
    pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.depth += 1;
        let result = self
            .reader
            .limits()
            .check_depth(self.depth)
            .and_then(|_| f(self));
        self.depth -= 1;
        result
    }

    /// Read a one-byte tagged union discriminant, rejecting values `>= alternatives`
    pub fn read_discriminant(&mut self, type_name: &'static str, alternatives: usize) -> Result<u8> {
        let discriminant = self.reader.read_u8()?;
        if discriminant as usize >= alternatives {
            return Err(ConversionError::DiscriminantOutOfRange {
                type_name,
                discriminant,
                alternatives,
            }
            .into());
        }
        Ok(discriminant)
    }

    /// Read a shared reference, decoding the payload on first occurrence
    ///
    /// Returns `None` for the null reference.
    pub fn read_shared<P>(&mut self) -> Result<Option<P>>
    where
        P: SharedPointer,
        P::Target: Decode,
    {
        let mode = self.reader.read_u8()?;
        if mode == MODE_NULL {
            return Ok(None);
        }
        let occurrence = mode & MODE_MASK;
        if mode & !(MODE_MASK | MODE_BIG_ID) != 0
            || (occurrence != MODE_FIRST && occurrence != MODE_REPEAT)
        {
            return Err(ConversionError::InvalidReferenceMode { mode }.into());
        }

        let id = if mode & MODE_BIG_ID != 0 {
            self.reader.read_u64()?
        } else {
            self.reader.read_var_u64()?
        };

        if occurrence == MODE_FIRST {
            trace!(id, pointer = type_name::<P>(), "reading shared payload");
            let target = self.nested(|d| <P::Target as Decode>::decode(d))?;
            let pointer = P::from_target(target);
            self.refs.insert(id, pointer.clone());
            Ok(Some(pointer))
        } else {
            trace!(id, pointer = type_name::<P>(), "aliasing shared value");
            self.refs.get::<P>(id).map(Some)
        }
    }

    /// Read an aggregate's bases and fields in a fresh base frame
    pub fn read_aggregate<A: AggregateRead>(&mut self) -> Result<A> {
        let mut value = A::default();
        let mut frame = BaseFrame::new();
        frame.push(TypeId::of::<A>());
        self.base_frames.push(frame);
        let result = self.nested(|d| d.read_own_version(&mut value));
        self.base_frames.pop();
        result.map(|_| value)
    }

    /// Delegate to a base's members unless that base was already read
    /// within the current aggregate
    pub fn delegate_base<B: AggregateRead>(&mut self, base: &mut B) -> Result<()> {
        if !enter_base::<B>(&mut self.base_frames) {
            trace!(base = B::SCHEMA.name, "skipping shared base");
            return Ok(());
        }
        self.read_own_version(base)
    }

    fn read_own_version<A: AggregateRead>(&mut self, value: &mut A) -> Result<()> {
        let own = A::SCHEMA.version;
        if own == UNVERSIONED {
            return value.read_members(self);
        }

        let embedded = self.reader.read_var_u64()?;
        let version =
            SchemaVersion::try_from(embedded).map_err(|_| ConversionError::IntegerOverflow {
                value: embedded,
                target: "SchemaVersion",
            })?;
        if version > own {
            return Err(ConversionError::UnsupportedVersion {
                type_name: A::SCHEMA.name,
                version,
                supported: own,
            }
            .into());
        }

        trace!(aggregate = A::SCHEMA.name, version, "read version prefix");
        let outer = std::mem::replace(&mut self.version, version);
        let result = value.read_members(self);
        self.version = outer;
        result
    }
}

/// Record `B` in the innermost base frame; false if it was already there
fn enter_base<B: 'static>(frames: &mut [BaseFrame]) -> bool {
    let id = TypeId::of::<B>();
    match frames.last_mut() {
        Some(frame) if frame.contains(&id) => false,
        Some(frame) => {
            frame.push(id);
            true
        }
        None => true,
    }
}

/// Encode a root value in an unversioned pass
pub fn to_bytes<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut serializer = Serializer::new(Vec::new());
    serializer.serialize(value)?;
    Ok(serializer.into_inner())
}

/// Encode a root value at an explicit version
pub fn to_bytes_versioned<T: Encode + ?Sized>(value: &T, version: SchemaVersion) -> Result<Vec<u8>> {
    let mut serializer = Serializer::new(Vec::new());
    serializer.serialize_versioned(value, version)?;
    Ok(serializer.into_inner())
}

/// Decode a root value
pub fn from_bytes<T: Decode>(bytes: &[u8]) -> Result<T> {
    Deserializer::new(bytes).deserialize()
}

/// Decode a root value in a pass at `version`
pub fn from_bytes_versioned<T: Decode>(bytes: &[u8], version: SchemaVersion) -> Result<T> {
    Deserializer::new(bytes)
        .with_default_version(version)
        .deserialize()
}

/// Decode a root value with explicit limits
pub fn from_bytes_with_limits<T: Decode>(bytes: &[u8], limits: DecodeLimits) -> Result<T> {
    Deserializer::with_limits(bytes, limits)?.deserialize()
}
