//! Packet decoding.

use std::sync::Arc;

use bitstream::{read_packed_bools, ByteReader};
use schema::{SchemaRegistry, Side, Value};
use tracing::trace;

use crate::error::{CodecError, CodecResult};
use crate::{CodecLimits, DecodedMessage};

/// Decodes one packet received on `side`.
///
/// The discriminator selects the schema, which alone dictates how the rest
/// of the frame is read. Packets handled by the other side are rejected
/// with [`CodecError::WrongSide`] before any field is parsed. The frame must
/// be consumed exactly.
pub fn decode<H>(
    registry: &SchemaRegistry<H>,
    side: Side,
    bytes: &[u8],
    limits: &CodecLimits,
) -> CodecResult<DecodedMessage<H>> {
    limits.check_packet_len(bytes.len())?;

    let mut reader = ByteReader::new(bytes);
    let discriminator = reader.read_u8()?;
    let schema = registry
        .by_discriminator(discriminator)
        .ok_or_else(|| CodecError::UnknownPacket {
            registry: registry.name().to_string(),
            discriminator,
        })?;

    if schema.side() != side {
        return Err(CodecError::WrongSide {
            packet: schema.id().to_string(),
            expected: schema.side(),
            actual: side,
        });
    }

    let mut booleans = read_packed_bools(&mut reader, schema.boolean_count())?.into_iter();

    let mut values = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let value = if field.field_type.is_packed() {
            let bit = booleans.next().ok_or(CodecError::InvalidState {
                reason: "bitfield holds fewer flags than the schema declares",
            })?;
            Value::Boolean(bit)
        } else {
            field
                .field_type
                .read(&mut reader, &limits.fields)
                .map_err(|source| CodecError::Field {
                    packet: schema.id().to_string(),
                    field: field.name.clone(),
                    source,
                })?
        };
        values.push(value);
    }

    if !reader.is_empty() {
        return Err(CodecError::TrailingBytes {
            packet: schema.id().to_string(),
            remaining: reader.remaining(),
        });
    }

    trace!(
        packet = schema.id(),
        discriminator,
        bytes = bytes.len(),
        "decoded packet"
    );
    Ok(DecodedMessage::new(Arc::clone(schema), discriminator, values))
}
