//! Schema construction and value validation errors.

use thiserror::Error;

use crate::{Category, FieldType};

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when building schemas and registries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two fields in one packet share a name.
    #[error("packet '{packet}' defines field '{field}' more than once")]
    DuplicateField { packet: String, field: String },

    /// A builder operation was used out of order.
    #[error("packet '{packet}': {reason}")]
    InvalidState { packet: String, reason: &'static str },

    /// The packet was finished without a side.
    #[error("packet '{packet}' isn't bound to any side")]
    MissingSideBinding { packet: String },

    /// The packet was finished without a handler.
    #[error("packet '{packet}' has no handler")]
    MissingHandler { packet: String },

    /// Two packets in one registry share an identifier.
    #[error("registry '{registry}' already defines packet '{packet}'")]
    DuplicatePacket { registry: String, packet: String },

    /// More packets than a one-byte discriminator can address.
    #[error("registry '{registry}' cannot hold more than {limit} packets")]
    RegistryOverflow { registry: String, limit: usize },

    /// Lookup of an identifier the registry doesn't define.
    #[error("no packet '{packet}' in registry '{registry}'")]
    UnknownSchema { registry: String, packet: String },
}

/// Errors raised when a value does not fit a field type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// The value's category is not accepted by the field type.
    #[error("{field_type} does not accept {found} values")]
    Mismatch {
        field_type: FieldType,
        found: Category,
    },

    /// The integer does not fit the field type's width.
    #[error("{value} is out of range for {field_type}")]
    IntegerOutOfRange { field_type: FieldType, value: i64 },

    /// The float overflows the field type's precision.
    #[error("{value} is out of range for {field_type}")]
    FloatOutOfRange { field_type: FieldType, value: f64 },

    /// Booleans live in the packed bitfield, never in the field stream.
    #[error("{field_type} is packed into the bitfield and has no standalone encoding")]
    Packed { field_type: FieldType },

    /// Byte-level failure.
    #[error("bitstream error: {0}")]
    Bitstream(#[from] bitstream::BitError),

    /// Structured blob failure.
    #[error("document error: {0}")]
    Document(#[from] document::DocumentError),
}
