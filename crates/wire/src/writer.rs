//! Byte-level writer
//!
//! All fixed-width values are little-endian regardless of host byte order,
//! so streams written on one machine read back on any other.

use crate::varint;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;
use verser_core::Result;

/// Primitive writer over any `io::Write`
pub struct WireWriter<W> {
    inner: W,
    written: u64,
}

macro_rules! write_fixed {
    ($($name:ident: $ty:ty => $size:expr),* $(,)?) => {
        $(
            #[doc = concat!("Write a little-endian `", stringify!($ty), "`")]
            pub fn $name(&mut self, value: $ty) -> Result<()> {
                self.inner.$name::<LittleEndian>(value)?;
                self.written += $size;
                Ok(())
            }
        )*
    };
}

impl<W: Write> WireWriter<W> {
    /// Wrap a writer
    pub fn new(inner: W) -> Self {
        WireWriter { inner, written: 0 }
    }

    /// Total bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Borrow the underlying writer
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwrap the underlying writer
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Write a single byte
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.inner.write_u8(value)?;
        self.written += 1;
        Ok(())
    }

    /// Write a single signed byte
    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_u8(value as u8)
    }

    /// Write a boolean as `0` or `1`
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(value as u8)
    }

    write_fixed! {
        write_u16: u16 => 2,
        write_u32: u32 => 4,
        write_u64: u64 => 8,
        write_u128: u128 => 16,
        write_i16: i16 => 2,
        write_i32: i32 => 4,
        write_i64: i64 => 8,
        write_i128: i128 => 16,
        write_f32: f32 => 4,
        write_f64: f64 => 8,
    }

    /// Write a variable-length unsigned integer
    pub fn write_var_u64(&mut self, value: u64) -> Result<()> {
        let len = varint::write_var_u64(&mut self.inner, value)?;
        self.written += len as u64;
        Ok(())
    }

    /// Write a length prefix
    pub fn write_length(&mut self, length: usize) -> Result<()> {
        self.write_var_u64(length as u64)
    }

    /// Write raw bytes with no prefix
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    /// Write a length-prefixed byte string
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_length(bytes.len())?;
        self.write_raw(bytes)
    }

    /// Write a length-prefixed UTF-8 string
    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes())
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
