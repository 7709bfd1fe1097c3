//! Variable-length unsigned integers
//!
//! ## Format
//!
//! LEB128: seven data bits per byte, least significant group first. The high
//! bit of each byte is set when another byte follows.
//!
//! ```text
//! 0            -> 00
//! 127          -> 7F
//! 128          -> 80 01
//! 300          -> AC 02
//! u64::MAX     -> FF FF FF FF FF FF FF FF FF 01
//! ```
//!
//! A reader knows where the value ends from the continuation bits alone, so
//! varints can frame lengths and reference ids without external framing.

use byteorder::ReadBytesExt;
use std::io::{Read, Write};
use verser_core::{ConversionError, Result};

/// Maximum encoded size of a `u64`
pub const MAX_VARINT_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const DATA_MASK: u8 = 0x7F;

/// Encode `value` into `buf`, returning the number of bytes used
pub fn encode_var_u64(mut value: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut len = 0;
    loop {
        let byte = (value as u8) & DATA_MASK;
        value >>= 7;
        if value == 0 {
            buf[len] = byte;
            return len + 1;
        }
        buf[len] = byte | CONTINUATION;
        len += 1;
    }
}

/// Number of bytes `value` occupies on the wire
pub fn var_u64_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Write `value` as a varint
pub fn write_var_u64<W: Write>(writer: &mut W, value: u64) -> Result<usize> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_var_u64(value, &mut buf);
    writer.write_all(&buf[..len])?;
    Ok(len)
}

/// Read a varint
///
/// Fails with [`ConversionError::VarintOverflow`] if the encoding runs past
/// ten bytes or its tenth byte carries bits beyond 64.
pub fn read_var_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut value = 0u64;
    for index in 0..MAX_VARINT_LEN {
        let byte = reader.read_u8()?;
        let data = (byte & DATA_MASK) as u64;
        if index == MAX_VARINT_LEN - 1 && data > 1 {
            return Err(ConversionError::VarintOverflow.into());
        }
        value |= data << (7 * index);
        if byte & CONTINUATION == 0 {
            return Ok(value);
        }
    }
    Err(ConversionError::VarintOverflow.into())
}
