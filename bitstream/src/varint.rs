//! Protobuf-style base-128 varints and the zig-zag transform.

/// Maximum number of bytes a 32-bit varint may occupy.
pub const VARINT_MAX_BYTES: usize = 5;

/// Returns the encoded length of `value` as a varint.
#[must_use]
pub const fn varu32_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x001F_FFFF => 3,
        0x0020_0000..=0x0FFF_FFFF => 4,
        _ => 5,
    }
}

/// Maps a signed value onto an unsigned one so small magnitudes stay small.
///
/// `0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...`; total over the whole `i32` range.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn zigzag_encode(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`zigzag_encode`].
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn zigzag_decode(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}
