//! Error types for byte and bit level operations.

use thiserror::Error;

/// Result type for bitstream operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur during byte-level encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitError {
    /// Attempted to read past the end of the buffer.
    #[error("attempted to read {requested} bytes but only {available} bytes available")]
    UnexpectedEof {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// A varint ran past its 5-byte cap or overflowed 32 bits.
    #[error("invalid varint: more than 5 bytes or wider than 32 bits")]
    InvalidVarint,

    /// Value exceeds the range representable by the fixed width.
    #[error("value {value} cannot be represented in {bits} bits")]
    ValueOutOfRange {
        /// The value that was out of range.
        value: u64,
        /// Number of bits available.
        bits: usize,
    },

    /// A length prefix cannot represent the payload length.
    #[error("length {length} does not fit the length prefix")]
    LengthOverflow {
        /// The payload length in bytes.
        length: usize,
    },

    /// A decoded length prefix exceeds the caller's cap.
    #[error("length {length} exceeds limit {limit}")]
    LengthExceedsLimit {
        /// The decoded length in bytes.
        length: usize,
        /// Maximum allowed length in bytes.
        limit: usize,
    },

    /// A length-prefixed string is not valid UTF-8.
    #[error("invalid UTF-8 in string payload")]
    InvalidUtf8,

    /// Unused bits in the last bitfield byte were set.
    #[error("non-zero padding bits in bitfield byte 0x{byte:02X}")]
    NonZeroPadding {
        /// The offending byte.
        byte: u8,
    },
}
