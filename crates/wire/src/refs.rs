//! Shared reference tracking
//!
//! Preserves reference identity for `Rc`/`Arc` values across one top-level
//! write or read, so a value aliased by several fields is encoded once and
//! decoded into a single shared instance.
//!
//! ## Wire Format
//!
//! ```text
//! ┌───────────┬──────────────────────────┬───────────────────────┐
//! │ Mode (1)  │ Id (varint or u64 LE)    │ Payload (first only)  │
//! └───────────┴──────────────────────────┴───────────────────────┘
//!
//! mode 0           null, nothing follows
//! mode 1           first occurrence: id, then the pointee's encoding
//! mode 2           repeat occurrence: id only
//! mode | 0x4       id is a fixed 8-byte u64 instead of a varint
//! ```
//!
//! Ids are assigned from 1 in order of first occurrence and are meaningful
//! only within one pass. The tables are not designed for cyclic graphs: a
//! pointee is registered on the read side only after its payload decodes.

use rustc_hash::FxHashMap;
use std::any::{type_name, Any};
use std::rc::Rc;
use std::sync::Arc;
use verser_core::{ConversionError, Result};

/// Null reference
pub const MODE_NULL: u8 = 0;
/// First occurrence, payload follows
pub const MODE_FIRST: u8 = 1;
/// Repeat occurrence, no payload
pub const MODE_REPEAT: u8 = 2;
/// Id is written as a fixed 8-byte integer
pub const MODE_BIG_ID: u8 = 0x4;
/// Mask selecting the occurrence bits of a mode byte
pub const MODE_MASK: u8 = 0x3;

/// Ids above this are written in the fixed 8-byte form
pub const BIG_ID_THRESHOLD: u64 = u32::MAX as u64;

/// A reference-counted pointer whose identity can be tracked
pub trait SharedPointer: Clone + 'static {
    /// Pointee type
    type Target;

    /// Address of the pointee, stable while the pointer is alive
    fn address(&self) -> usize;

    /// Borrow the pointee
    fn target(&self) -> &Self::Target;

    /// Allocate a new pointer around a decoded value
    fn from_target(target: Self::Target) -> Self;
}

impl<T: 'static> SharedPointer for Rc<T> {
    type Target = T;

    fn address(&self) -> usize {
        Rc::as_ptr(self) as *const () as usize
    }

    fn target(&self) -> &T {
        self
    }

    fn from_target(target: T) -> Self {
        Rc::new(target)
    }
}

impl<T: 'static> SharedPointer for Arc<T> {
    type Target = T;

    fn address(&self) -> usize {
        Arc::as_ptr(self) as *const () as usize
    }

    fn target(&self) -> &T {
        self
    }

    fn from_target(target: T) -> Self {
        Arc::new(target)
    }
}

/// Outcome of looking up a pointer on the write side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefSlot {
    /// Not seen before in this pass; the payload must be written
    First(u64),
    /// Already written under this id
    Repeat(u64),
}

impl RefSlot {
    /// Wire id of the slot
    pub fn id(&self) -> u64 {
        match *self {
            RefSlot::First(id) | RefSlot::Repeat(id) => id,
        }
    }

    /// Mode byte announcing the slot
    pub fn mode(&self) -> u8 {
        let base = match self {
            RefSlot::First(_) => MODE_FIRST,
            RefSlot::Repeat(_) => MODE_REPEAT,
        };
        if self.id() > BIG_ID_THRESHOLD {
            base | MODE_BIG_ID
        } else {
            base
        }
    }
}

/// Write-side reference table: pointee address to wire id
#[derive(Debug, Default)]
pub struct WriteRefs {
    ids: FxHashMap<usize, u64>,
    next_id: u64,
}

impl WriteRefs {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an address, assigning the next id on first occurrence
    pub fn slot(&mut self, address: usize) -> RefSlot {
        if let Some(&id) = self.ids.get(&address) {
            return RefSlot::Repeat(id);
        }
        self.next_id += 1;
        let id = self.next_id;
        self.ids.insert(address, id);
        RefSlot::First(id)
    }

    /// Number of distinct pointees written
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Forget every pointee and restart ids at 1
    pub fn reset(&mut self) {
        self.ids.clear();
        self.next_id = 0;
    }

    #[cfg(test)]
    pub(crate) fn force_next_id(&mut self, next_id: u64) {
        self.next_id = next_id;
    }
}

/// Read-side reference table: wire id to materialized pointer
#[derive(Default)]
pub struct ReadRefs {
    instances: FxHashMap<u64, Box<dyn Any>>,
}

impl std::fmt::Debug for ReadRefs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadRefs")
            .field("len", &self.instances.len())
            .finish()
    }
}

impl ReadRefs {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the instance decoded for `id`
    pub fn insert<P: SharedPointer>(&mut self, id: u64, pointer: P) {
        self.instances.insert(id, Box::new(pointer));
    }

    /// Alias the instance recorded for `id`
    ///
    /// Fails if the id is unknown or was recorded with a different pointer type.
    pub fn get<P: SharedPointer>(&self, id: u64) -> Result<P> {
        let stored = self
            .instances
            .get(&id)
            .ok_or(ConversionError::UnknownReference { id })?;
        stored.downcast_ref::<P>().cloned().ok_or_else(|| {
            ConversionError::ReferenceTypeMismatch {
                id,
                expected: type_name::<P>(),
            }
            .into()
        })
    }

    /// Number of materialized instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// True if nothing has been read
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Forget every instance
    pub fn reset(&mut self) {
        self.instances.clear();
    }
}

/// A nullable shared reference
///
/// `Rc<T>` and `Arc<T>` encode as non-null shared references. Wrap them in
/// `SharedRef` when the null mode must be representable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SharedRef<P>(Option<P>);

impl<P> Default for SharedRef<P> {
    fn default() -> Self {
        SharedRef(None)
    }
}

impl<P> SharedRef<P> {
    /// The null reference
    pub fn null() -> Self {
        SharedRef(None)
    }

    /// A non-null reference
    pub fn new(pointer: P) -> Self {
        SharedRef(Some(pointer))
    }

    /// True if null
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Borrow the pointer, if any
    pub fn get(&self) -> Option<&P> {
        self.0.as_ref()
    }

    /// Unwrap into the optional pointer
    pub fn into_inner(self) -> Option<P> {
        self.0
    }
}

impl<P: SharedPointer> SharedRef<P> {
    /// Allocate a new pointee
    pub fn from_value(value: P::Target) -> Self {
        SharedRef(Some(P::from_target(value)))
    }

    /// True if both references point at the same instance (two nulls are equal)
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => a.address() == b.address(),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<P> From<P> for SharedRef<P> {
    fn from(pointer: P) -> Self {
        SharedRef(Some(pointer))
    }
}

impl<P> From<Option<P>> for SharedRef<P> {
    fn from(pointer: Option<P>) -> Self {
        SharedRef(pointer)
    }
}
