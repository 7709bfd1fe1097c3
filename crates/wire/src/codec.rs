//! Encode and decode traits with implementations for standard types
//!
//! ## Shapes
//!
//! | Rust type                          | Wire shape                                   |
//! |------------------------------------|----------------------------------------------|
//! | `bool`                             | 1 byte, `0`/`1`                              |
//! | `u8`..`u128`, `i8`..`i128`, floats | fixed width, little-endian                   |
//! | `usize` / `isize`                  | varint / `i64`                               |
//! | `char`                             | `u32`                                        |
//! | `String`, `str`                    | varint length + UTF-8 bytes                  |
//! | `Vec`, `VecDeque`, slices          | varint length + elements                     |
//! | maps and sets                      | varint length + entries in iteration order   |
//! | tuples, arrays                     | elements in order, no prefix                 |
//! | `Option<T>`, `Option<Box<T>>`      | presence byte + payload                      |
//! | `Box<T>`                           | payload (transparent)                        |
//! | `Rc<T>`, `Arc<T>`, `SharedRef<P>`  | shared reference (see [`crate::refs`])       |
//!
//! Aggregates, tagged unions and enumerations implement these traits through
//! the crate's macros.

use crate::refs::{SharedPointer, SharedRef};
use crate::serializer::{Deserializer, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::io::{Read, Write};
use std::rc::Rc;
use std::sync::Arc;
use verser_core::{ConversionError, Result};

/// Types that can be written to the wire
pub trait Encode {
    /// Write `self` to the serializer
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()>;
}

/// Types that can be read from the wire
pub trait Decode: Sized {
    /// Read a value from the deserializer
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self>;
}

macro_rules! impl_fixed {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl Encode for $ty {
                fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
                    s.writer().$write(*self)
                }
            }

            impl Decode for $ty {
                fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
                    d.reader().$read()
                }
            }
        )*
    };
}

impl_fixed! {
    bool => write_bool, read_bool;
    u8 => write_u8, read_u8;
    u16 => write_u16, read_u16;
    u32 => write_u32, read_u32;
    u64 => write_u64, read_u64;
    u128 => write_u128, read_u128;
    i8 => write_i8, read_i8;
    i16 => write_i16, read_i16;
    i32 => write_i32, read_i32;
    i64 => write_i64, read_i64;
    i128 => write_i128, read_i128;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
}

impl Encode for usize {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        s.writer().write_var_u64(*self as u64)
    }
}

impl Decode for usize {
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        let value = d.reader().read_var_u64()?;
        usize::try_from(value).map_err(|_| {
            ConversionError::IntegerOverflow {
                value,
                target: "usize",
            }
            .into()
        })
    }
}

impl Encode for isize {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        s.writer().write_i64(*self as i64)
    }
}

impl Decode for isize {
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        let value = d.reader().read_i64()?;
        isize::try_from(value).map_err(|_| {
            ConversionError::IntegerOverflow {
                value: value as u64,
                target: "isize",
            }
            .into()
        })
    }
}

impl Encode for char {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        s.writer().write_u32(*self as u32)
    }
}

impl Decode for char {
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        let raw = d.reader().read_u32()?;
        char::from_u32(raw).ok_or_else(|| ConversionError::InvalidChar(raw).into())
    }
}

impl Encode for () {
    fn encode<W: Write>(&self, _s: &mut Serializer<W>) -> Result<()> {
        Ok(())
    }
}

impl Decode for () {
    fn decode<R: Read>(_d: &mut Deserializer<R>) -> Result<Self> {
        Ok(())
    }
}

impl Encode for str {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        s.writer().write_str(self)
    }
}

impl Encode for String {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        s.writer().write_str(self)
    }
}

impl Decode for String {
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        d.reader().read_string()
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        (**self).encode(s)
    }
}

// ============================================================================
// Sequences
// ============================================================================

fn encode_seq<'a, W, T, I>(s: &mut Serializer<W>, len: usize, items: I) -> Result<()>
where
    W: Write,
    T: Encode + 'a,
    I: IntoIterator<Item = &'a T>,
{
    s.writer().write_length(len)?;
    for item in items {
        item.encode(s)?;
    }
    Ok(())
}

fn decode_seq<R, T, C>(d: &mut Deserializer<R>, mut insert: impl FnMut(&mut C, T), init: impl FnOnce(usize) -> C) -> Result<C>
where
    R: Read,
    T: Decode,
{
    let len = d.reader().read_length()?;
    let mut out = init(d.limits().prealloc(len));
    d.nested(|d| {
        for _ in 0..len {
            let item = T::decode(d)?;
            insert(&mut out, item);
        }
        Ok(())
    })?;
    Ok(out)
}

impl<T: Encode> Encode for [T] {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        encode_seq(s, self.len(), self)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        encode_seq(s, self.len(), self)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        decode_seq(d, Vec::push, Vec::with_capacity)
    }
}

impl<T: Encode> Encode for VecDeque<T> {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        encode_seq(s, self.len(), self)
    }
}

impl<T: Decode> Decode for VecDeque<T> {
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        decode_seq(d, VecDeque::push_back, VecDeque::with_capacity)
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        for item in self {
            item.encode(s)?;
        }
        Ok(())
    }
}

impl<T: Decode + Default, const N: usize> Decode for [T; N] {
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        let mut out: [T; N] = std::array::from_fn(|_| T::default());
        for slot in out.iter_mut() {
            *slot = T::decode(d)?;
        }
        Ok(out)
    }
}

// ============================================================================
// Associative containers
// ============================================================================

impl<K: Encode, V: Encode, S> Encode for HashMap<K, V, S> {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        s.writer().write_length(self.len())?;
        for (key, value) in self {
            key.encode(s)?;
            value.encode(s)?;
        }
        Ok(())
    }
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: Decode + Eq + Hash,
    V: Decode,
    S: BuildHasher + Default,
{
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        decode_seq(
            d,
            |map: &mut Self, (key, value): (K, V)| {
                map.insert(key, value);
            },
            |capacity| HashMap::with_capacity_and_hasher(capacity, S::default()),
        )
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        s.writer().write_length(self.len())?;
        for (key, value) in self {
            key.encode(s)?;
            value.encode(s)?;
        }
        Ok(())
    }
}

impl<K: Decode + Ord, V: Decode> Decode for BTreeMap<K, V> {
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        decode_seq(
            d,
            |map: &mut Self, (key, value): (K, V)| {
                map.insert(key, value);
            },
            |_| BTreeMap::new(),
        )
    }
}

impl<T: Encode, S> Encode for HashSet<T, S> {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        encode_seq(s, self.len(), self)
    }
}

impl<T, S> Decode for HashSet<T, S>
where
    T: Decode + Eq + Hash,
    S: BuildHasher + Default,
{
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        decode_seq(
            d,
            |set: &mut Self, item| {
                set.insert(item);
            },
            |capacity| HashSet::with_capacity_and_hasher(capacity, S::default()),
        )
    }
}

impl<T: Encode> Encode for BTreeSet<T> {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        encode_seq(s, self.len(), self)
    }
}

impl<T: Decode + Ord> Decode for BTreeSet<T> {
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        decode_seq(
            d,
            |set: &mut Self, item| {
                set.insert(item);
            },
            |_| BTreeSet::new(),
        )
    }
}

// ============================================================================
// Tuples
// ============================================================================

macro_rules! impl_tuple {
    ($($name:ident),+) => {
        impl<$($name: Encode),+> Encode for ($($name,)+) {
            #[allow(non_snake_case)]
            fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
                let ($($name,)+) = self;
                $($name.encode(s)?;)+
                Ok(())
            }
        }

        impl<$($name: Decode),+> Decode for ($($name,)+) {
            fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
                Ok(($($name::decode(d)?,)+))
            }
        }
    };
}

impl_tuple!(A);
impl_tuple!(A, B);
impl_tuple!(A, B, C);
impl_tuple!(A, B, C, D);
impl_tuple!(A, B, C, D, E);
impl_tuple!(A, B, C, D, E, F);

// ============================================================================
// Optional, owning and shared references
// ============================================================================

impl<T: Encode> Encode for Option<T> {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        match self {
            Some(value) => {
                s.writer().write_bool(true)?;
                value.encode(s)
            }
            None => s.writer().write_bool(false),
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        if d.reader().read_bool()? {
            Ok(Some(d.nested(T::decode)?))
        } else {
            Ok(None)
        }
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        (**self).encode(s)
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        Ok(Box::new(d.nested(T::decode)?))
    }
}

impl<T: Encode + 'static> Encode for Rc<T> {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        s.write_shared(Some(self))
    }
}

impl<T: Decode + 'static> Decode for Rc<T> {
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        d.read_shared::<Rc<T>>()?.ok_or_else(|| {
            ConversionError::NullReference {
                expected: std::any::type_name::<Self>(),
            }
            .into()
        })
    }
}

impl<T: Encode + 'static> Encode for Arc<T> {
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        s.write_shared(Some(self))
    }
}

impl<T: Decode + 'static> Decode for Arc<T> {
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        d.read_shared::<Arc<T>>()?.ok_or_else(|| {
            ConversionError::NullReference {
                expected: std::any::type_name::<Self>(),
            }
            .into()
        })
    }
}

impl<P> Encode for SharedRef<P>
where
    P: SharedPointer,
    P::Target: Encode,
{
    fn encode<W: Write>(&self, s: &mut Serializer<W>) -> Result<()> {
        s.write_shared(self.get())
    }
}

impl<P> Decode for SharedRef<P>
where
    P: SharedPointer,
    P::Target: Decode,
{
    fn decode<R: Read>(d: &mut Deserializer<R>) -> Result<Self> {
        Ok(SharedRef::from(d.read_shared::<P>()?))
    }
}
