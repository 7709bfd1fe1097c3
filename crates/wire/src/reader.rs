//! Byte-level reader
//!
//! The mirror of [`WireWriter`](crate::WireWriter). Short reads surface as
//! `io::ErrorKind::UnexpectedEof`; there is no attempt to resynchronize.

use crate::varint;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;
use verser_core::{ConversionError, DecodeLimits, Result};

/// Primitive reader over any `io::Read`
pub struct WireReader<R> {
    inner: R,
    read: u64,
    limits: DecodeLimits,
}

macro_rules! read_fixed {
    ($($name:ident: $ty:ty => $size:expr),* $(,)?) => {
        $(
            #[doc = concat!("Read a little-endian `", stringify!($ty), "`")]
            pub fn $name(&mut self) -> Result<$ty> {
                let value = self.inner.$name::<LittleEndian>()?;
                self.read += $size;
                Ok(value)
            }
        )*
    };
}

impl<R: Read> WireReader<R> {
    /// Wrap a reader with default limits
    pub fn new(inner: R) -> Self {
        Self::with_limits(inner, DecodeLimits::default())
    }

    /// Wrap a reader with explicit limits
    pub fn with_limits(inner: R, limits: DecodeLimits) -> Self {
        WireReader {
            inner,
            read: 0,
            limits,
        }
    }

    /// Limits in force
    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// Total bytes consumed so far
    pub fn bytes_read(&self) -> u64 {
        self.read
    }

    /// Unwrap the underlying reader
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        let value = self.inner.read_u8()?;
        self.read += 1;
        Ok(value)
    }

    /// Read a single signed byte
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Read a boolean, rejecting bytes other than `0` and `1`
    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ConversionError::InvalidBool(other).into()),
        }
    }

    read_fixed! {
        read_u16: u16 => 2,
        read_u32: u32 => 4,
        read_u64: u64 => 8,
        read_u128: u128 => 16,
        read_i16: i16 => 2,
        read_i32: i32 => 4,
        read_i64: i64 => 8,
        read_i128: i128 => 16,
        read_f32: f32 => 4,
        read_f64: f64 => 8,
    }

    /// Read a variable-length unsigned integer
    pub fn read_var_u64(&mut self) -> Result<u64> {
        let mut counting = CountingRead {
            inner: &mut self.inner,
            count: 0,
        };
        let value = varint::read_var_u64(&mut counting)?;
        self.read += counting.count;
        Ok(value)
    }

    /// Read a length prefix, enforcing the length limit
    pub fn read_length(&mut self) -> Result<usize> {
        let length = self.read_var_u64()?;
        self.limits.check_length(length)
    }

    /// Read exactly `length` raw bytes
    ///
    /// The buffer grows as bytes arrive, so a corrupt length cannot force a
    /// large allocation before the stream runs out.
    pub fn read_raw(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.limits.prealloc(length));
        let got = (&mut self.inner).take(length as u64).read_to_end(&mut buf)?;
        self.read += got as u64;
        if got < length {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("expected {} bytes, stream ended after {}", length, got),
            )
            .into());
        }
        Ok(buf)
    }

    /// Read a length-prefixed byte string
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let length = self.read_length()?;
        self.read_raw(length)
    }

    /// Read a length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_bytes()?;
        Ok(String::from_utf8(bytes)?)
    }
}

struct CountingRead<'a, R> {
    inner: &'a mut R,
    count: u64,
}

impl<R: Read> Read for CountingRead<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}
