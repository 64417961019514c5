//! Byte reader with bounded operations.

use crate::error::{BitError, BitResult};
use crate::varint::{zigzag_decode, VARINT_MAX_BYTES};

/// A byte reader for decoding wire values.
///
/// All read operations are bounds-checked and return errors on failure.
/// The reader never panics on malformed input.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    pub fn read_u8(&mut self) -> BitResult<u8> {
        let [value] = self.read_array::<1>()?;
        Ok(value)
    }

    pub fn read_i8(&mut self) -> BitResult<i8> {
        Ok(i8::from_be_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> BitResult<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> BitResult<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u24(&mut self) -> BitResult<u32> {
        let [a, b, c] = self.read_array::<3>()?;
        Ok(u32::from_be_bytes([0, a, b, c]))
    }

    /// Reads a 24-bit two's complement value, sign-extended to `i32`.
    #[allow(clippy::cast_possible_wrap)]
    pub fn read_i24(&mut self) -> BitResult<i32> {
        let raw = self.read_u24()?;
        Ok(((raw << 8) as i32) >> 8)
    }

    pub fn read_u32(&mut self) -> BitResult<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> BitResult<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> BitResult<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> BitResult<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> BitResult<f32> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> BitResult<f64> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    /// Reads a base-128 varint of at most 5 bytes.
    ///
    /// The fifth byte may only carry the top 4 bits of a `u32`.
    pub fn read_varu32(&mut self) -> BitResult<u32> {
        let mut result = 0u32;
        for index in 0..VARINT_MAX_BYTES {
            let byte = self.read_u8()?;
            if index == VARINT_MAX_BYTES - 1 && byte & 0xF0 != 0 {
                return Err(BitError::InvalidVarint);
            }
            result |= u32::from(byte & 0x7F) << (7 * index);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(BitError::InvalidVarint)
    }

    /// Reads a zig-zag varint.
    pub fn read_vars32(&mut self) -> BitResult<i32> {
        Ok(zigzag_decode(self.read_varu32()?))
    }

    /// Borrows the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> BitResult<&'a [u8]> {
        self.ensure_bytes(len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads a varint length prefix (capped at `max_len`) and borrows the payload.
    pub fn read_len_prefixed(&mut self, max_len: usize) -> BitResult<&'a [u8]> {
        let len = self.read_varu32()? as usize;
        if len > max_len {
            return Err(BitError::LengthExceedsLimit {
                length: len,
                limit: max_len,
            });
        }
        self.read_bytes(len)
    }

    /// Reads a length-prefixed UTF-8 string of at most `max_len` bytes.
    pub fn read_str(&mut self, max_len: usize) -> BitResult<&'a str> {
        let bytes = self.read_len_prefixed(max_len)?;
        std::str::from_utf8(bytes).map_err(|_| BitError::InvalidUtf8)
    }

    fn ensure_bytes(&self, bytes: usize) -> BitResult<()> {
        let available = self.remaining();
        if bytes > available {
            return Err(BitError::UnexpectedEof {
                requested: bytes,
                available,
            });
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> BitResult<[u8; N]> {
        self.ensure_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reader() {
        let reader = ByteReader::new(&[]);
        assert!(reader.is_empty());
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn read_from_empty_fails() {
        let mut reader = ByteReader::new(&[]);
        let result = reader.read_u8();
        assert_eq!(
            result,
            Err(BitError::UnexpectedEof {
                requested: 1,
                available: 0
            })
        );
    }

    #[test]
    fn short_read_does_not_advance() {
        let mut reader = ByteReader::new(&[0x01, 0x02]);
        assert!(reader.read_u32().is_err());
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u16().unwrap(), 0x0102);
    }

    #[test]
    fn read_big_endian_u32() {
        let mut reader = ByteReader::new(&[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
    }

    #[test]
    fn read_i24_sign_extends() {
        let mut reader = ByteReader::new(&[0xFF, 0xFF, 0xFE, 0x7F, 0xFF, 0xFF]);
        assert_eq!(reader.read_i24().unwrap(), -2);
        assert_eq!(reader.read_i24().unwrap(), 0x007F_FFFF);
    }

    #[test]
    fn read_varu32() {
        let mut reader = ByteReader::new(&[0xAC, 0x02]);
        assert_eq!(reader.read_varu32().unwrap(), 300);
    }

    #[test]
    fn read_varu32_max() {
        let mut reader = ByteReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        assert_eq!(reader.read_varu32().unwrap(), u32::MAX);
    }

    #[test]
    fn read_vars32() {
        let mut reader = ByteReader::new(&[0x01]);
        assert_eq!(reader.read_vars32().unwrap(), -1);
    }

    #[test]
    fn read_varu32_too_long() {
        let mut reader = ByteReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
        assert_eq!(reader.read_varu32(), Err(BitError::InvalidVarint));
    }

    #[test]
    fn read_varu32_overflowing_fifth_byte() {
        let mut reader = ByteReader::new(&[0x80, 0x80, 0x80, 0x80, 0x10]);
        assert_eq!(reader.read_varu32(), Err(BitError::InvalidVarint));
    }

    #[test]
    fn read_varu32_truncated() {
        let mut reader = ByteReader::new(&[0x80]);
        assert!(matches!(
            reader.read_varu32(),
            Err(BitError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn read_len_prefixed_respects_limit() {
        let mut reader = ByteReader::new(&[0x03, 1, 2, 3]);
        assert_eq!(
            reader.read_len_prefixed(2),
            Err(BitError::LengthExceedsLimit {
                length: 3,
                limit: 2
            })
        );
    }

    #[test]
    fn read_len_prefixed_truncated() {
        let mut reader = ByteReader::new(&[0x05, 1, 2]);
        assert_eq!(
            reader.read_len_prefixed(16),
            Err(BitError::UnexpectedEof {
                requested: 5,
                available: 2
            })
        );
    }

    #[test]
    fn read_str_rejects_invalid_utf8() {
        let mut reader = ByteReader::new(&[0x02, 0xC3, 0x28]);
        assert_eq!(reader.read_str(16), Err(BitError::InvalidUtf8));
    }

    #[test]
    fn read_str_empty() {
        let mut reader = ByteReader::new(&[0x00]);
        assert_eq!(reader.read_str(0).unwrap(), "");
        assert!(reader.is_empty());
    }
}
