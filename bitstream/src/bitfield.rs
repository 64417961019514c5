//! Packed boolean bitfields.
//!
//! Byte `i` holds the values at indices `i*8 ..= i*8+7`; the least
//! significant bit carries the lowest index. Unused high bits of the last
//! byte are zero.

use crate::error::{BitError, BitResult};
use crate::reader::ByteReader;
use crate::writer::ByteWriter;

/// Number of bytes needed to pack `count` booleans.
#[must_use]
pub const fn packed_len(count: usize) -> usize {
    count.div_ceil(8)
}

/// Writes `values` as a packed bitfield. Writes nothing for an empty slice.
pub fn write_packed_bools(writer: &mut ByteWriter, values: &[bool]) {
    for chunk in values.chunks(8) {
        let mut byte = 0u8;
        for (bit, &value) in chunk.iter().enumerate() {
            if value {
                byte |= 1 << bit;
            }
        }
        writer.write_u8(byte);
    }
}

/// Reads `count` booleans packed by [`write_packed_bools`].
///
/// # Errors
///
/// Returns [`BitError::NonZeroPadding`] if unused bits of the last byte are set.
pub fn read_packed_bools(reader: &mut ByteReader<'_>, count: usize) -> BitResult<Vec<bool>> {
    let mut values = Vec::with_capacity(count);
    for byte_index in 0..packed_len(count) {
        let byte = reader.read_u8()?;
        let bits = (count - byte_index * 8).min(8);
        if bits < 8 && byte >> bits != 0 {
            return Err(BitError::NonZeroPadding { byte });
        }
        for bit in 0..bits {
            values.push(byte & (1 << bit) != 0);
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(values: &[bool]) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        write_packed_bools(&mut writer, values);
        writer.finish()
    }

    #[test]
    fn packed_len_rounds_up() {
        assert_eq!(packed_len(0), 0);
        assert_eq!(packed_len(1), 1);
        assert_eq!(packed_len(8), 1);
        assert_eq!(packed_len(9), 2);
        assert_eq!(packed_len(16), 2);
        assert_eq!(packed_len(17), 3);
    }

    #[test]
    fn empty_writes_nothing() {
        assert!(pack(&[]).is_empty());
    }

    #[test]
    fn lowest_index_is_least_significant_bit() {
        assert_eq!(pack(&[true]), vec![0b0000_0001]);
        assert_eq!(pack(&[false, true]), vec![0b0000_0010]);
        let mut eighth = [false; 8];
        eighth[7] = true;
        assert_eq!(pack(&eighth), vec![0x80]);
    }

    #[test]
    fn ten_flags_layout() {
        let mut values = [false; 10];
        for index in [0, 2, 5, 9] {
            values[index] = true;
        }
        let bytes = pack(&values);
        assert_eq!(bytes, vec![0b0010_0101, 0b0000_0010]);

        let mut reader = ByteReader::new(&bytes);
        assert_eq!(read_packed_bools(&mut reader, 10).unwrap(), values.to_vec());
        assert!(reader.is_empty());
    }

    #[test]
    fn second_byte_restarts_at_bit_zero() {
        let mut values = vec![false; 16];
        values[8] = true;
        assert_eq!(pack(&values), vec![0x00, 0x01]);
    }

    #[test]
    fn rejects_padding_bits() {
        let mut reader = ByteReader::new(&[0b0000_1000]);
        assert_eq!(
            read_packed_bools(&mut reader, 3),
            Err(BitError::NonZeroPadding { byte: 0b0000_1000 })
        );
    }

    #[test]
    fn truncated_bitfield_fails() {
        let mut reader = ByteReader::new(&[0xFF]);
        assert!(matches!(
            read_packed_bools(&mut reader, 9),
            Err(BitError::UnexpectedEof { .. })
        ));
    }
}
