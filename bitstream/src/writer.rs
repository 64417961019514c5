//! Byte writer for encoding wire values.

use crate::error::{BitError, BitResult};
use crate::varint::zigzag_encode;

const U24_MAX: u32 = 0x00FF_FFFF;
const I24_MIN: i32 = -0x0080_0000;
const I24_MAX: i32 = 0x007F_FFFF;

/// A growable writer for encoding wire values.
///
/// Writes are appended to an internal buffer. Call [`finish`](Self::finish)
/// to get the final byte buffer.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    /// Creates a new empty `ByteWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `ByteWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
        }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes the low 24 bits of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::ValueOutOfRange`] if `value` doesn't fit in 24 bits.
    pub fn write_u24(&mut self, value: u32) -> BitResult<()> {
        if value > U24_MAX {
            return Err(BitError::ValueOutOfRange {
                value: u64::from(value),
                bits: 24,
            });
        }
        self.bytes.extend_from_slice(&value.to_be_bytes()[1..]);
        Ok(())
    }

    /// Writes a signed 24-bit value in two's complement.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::ValueOutOfRange`] if `value` doesn't fit in 24 bits.
    #[allow(clippy::cast_sign_loss)]
    pub fn write_i24(&mut self, value: i32) -> BitResult<()> {
        if !(I24_MIN..=I24_MAX).contains(&value) {
            return Err(BitError::ValueOutOfRange {
                value: u64::from(value as u32),
                bits: 24,
            });
        }
        self.bytes
            .extend_from_slice(&((value as u32) & U24_MAX).to_be_bytes()[1..]);
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes a base-128 varint (at most 5 bytes).
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_varu32(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.bytes.push(((value & 0x7F) as u8) | 0x80);
            value >>= 7;
        }
        self.bytes.push(value as u8);
    }

    /// Writes a zig-zag varint.
    pub fn write_vars32(&mut self, value: i32) {
        self.write_varu32(zigzag_encode(value));
    }

    /// Appends raw bytes with no length prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Writes a varint length prefix followed by the bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::LengthOverflow`] if the length doesn't fit in a `u32`.
    pub fn write_len_prefixed(&mut self, bytes: &[u8]) -> BitResult<()> {
        let len = u32::try_from(bytes.len())
            .map_err(|_| BitError::LengthOverflow {
                length: bytes.len(),
            })?;
        self.write_varu32(len);
        self.write_bytes(bytes);
        Ok(())
    }

    /// Writes a UTF-8 string prefixed by its length in bytes.
    pub fn write_str(&mut self, value: &str) -> BitResult<()> {
        self.write_len_prefixed(value.as_bytes())
    }

    /// Finishes writing and returns the byte buffer.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    /// Finishes writing and appends to the provided buffer.
    pub fn finish_into(mut self, buf: &mut Vec<u8>) {
        buf.append(&mut self.bytes);
    }
}
