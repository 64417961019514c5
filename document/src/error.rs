//! Document encoding and decoding errors.

use thiserror::Error;

use crate::TagKind;

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors that can occur while building, encoding, or decoding documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// Underlying byte-level failure.
    #[error("bitstream error: {0}")]
    Bitstream(#[from] bitstream::BitError),

    /// A tag kind byte that is not part of the format.
    #[error("unknown tag kind: {kind}")]
    UnknownTagKind { kind: u8 },

    /// The root of an encoded document is not a compound.
    #[error("document root must be a compound, found kind {kind}")]
    RootNotCompound { kind: u8 },

    /// Nesting deeper than the configured limit.
    #[error("document nesting exceeds depth limit {limit}")]
    DepthExceeded { limit: usize },

    /// A negative array or list length on the wire.
    #[error("negative length: {length}")]
    NegativeLength { length: i32 },

    /// A string longer than its 16-bit length prefix allows.
    #[error("string of {length} bytes exceeds 65535")]
    StringTooLong { length: usize },

    /// An array or list longer than its 32-bit count allows.
    #[error("sequence of {length} elements exceeds i32::MAX")]
    SequenceTooLong { length: usize },

    /// A list element of a different kind than the list.
    #[error("list holds {expected:?} but got {found:?}")]
    MixedList { expected: TagKind, found: TagKind },

    /// A compound repeats a key.
    #[error("duplicate key '{name}' in compound")]
    DuplicateKey { name: String },
}
