//! Error types for codec operations.

use schema::{Category, FieldType, SchemaError, Side, ValueError};
use thiserror::Error;

use crate::TransportError;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while building, encoding, decoding or routing packets.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// Discriminator beyond the registry's size.
    #[error("registry '{registry}' has no packet with discriminator {discriminator}")]
    UnknownPacket { registry: String, discriminator: u8 },

    /// The packet is handled by the other side.
    #[error("packet '{packet}' is handled by the {expected}, not the {actual}")]
    WrongSide {
        packet: String,
        expected: Side,
        actual: Side,
    },

    /// The packet declares no field with that name.
    #[error("packet '{packet}' has no field '{field}'")]
    UnknownField { packet: String, field: String },

    /// Category-incompatible access.
    #[error("field '{field}' of packet '{packet}' ({declared}) rejects {requested} access")]
    InvalidType {
        packet: String,
        field: String,
        requested: Category,
        declared: FieldType,
    },

    /// Encode attempted with unset fields.
    #[error("packet '{packet}' is missing fields: {}", .fields.join(", "))]
    MissingField { packet: String, fields: Vec<String> },

    /// A value the field's encoding cannot represent.
    #[error("field '{field}' of packet '{packet}': {source}")]
    InvalidArgument {
        packet: String,
        field: String,
        #[source]
        source: ValueError,
    },

    /// A field failed to decode.
    #[error("field '{field}' of packet '{packet}' failed to decode: {source}")]
    Field {
        packet: String,
        field: String,
        #[source]
        source: ValueError,
    },

    /// Bytes left after the last field.
    #[error("packet '{packet}' has {remaining} trailing bytes")]
    TrailingBytes { packet: String, remaining: usize },

    /// Frame size over the configured limit.
    #[error("packet of {actual} bytes exceeds the limit of {limit}")]
    LimitsExceeded { limit: usize, actual: usize },

    /// An operation was used out of order.
    #[error("invalid state: {reason}")]
    InvalidState { reason: &'static str },

    #[error("unknown channel '{channel}'")]
    UnknownChannel { channel: String },

    #[error("channel '{channel}' is already registered")]
    DuplicateChannel { channel: String },

    /// The message was built from a registry this network does not hold.
    #[error("message was built for a different '{channel}' channel")]
    ForeignChannel { channel: String },

    /// Bitstream error.
    #[error("bitstream error: {0}")]
    Bitstream(#[from] bitstream::BitError),

    /// Schema error.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
