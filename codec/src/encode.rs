//! Packet encoding.

use bitstream::{write_packed_bools, ByteWriter};
use schema::Value;
use tracing::trace;

use crate::error::{CodecError, CodecResult};
use crate::{CodecLimits, PendingMessage};

/// Encodes a fully populated message.
///
/// Layout: discriminator byte, packed boolean bitfield, then every other
/// field in declaration order. Variable-length values must fit
/// `limits.fields`, the same caps [`decode`](crate::decode) applies.
/// Nothing is produced on failure.
pub fn encode<H>(message: &PendingMessage<H>, limits: &CodecLimits) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    encode_into(message, limits, &mut out)?;
    Ok(out)
}

/// Encodes a message, appending to `out`. Returns the number of bytes written.
///
/// `out` is left untouched on failure.
pub fn encode_into<H>(
    message: &PendingMessage<H>,
    limits: &CodecLimits,
    out: &mut Vec<u8>,
) -> CodecResult<usize> {
    let (schema, discriminator, values) = message.complete()?;

    let mut writer = ByteWriter::with_capacity(schema.minimum_size());
    writer.write_u8(discriminator);

    let booleans: Vec<bool> = schema
        .fields()
        .iter()
        .zip(&values)
        .filter(|(field, _)| field.field_type.is_packed())
        .map(|(_, value)| matches!(value, Value::Boolean(true)))
        .collect();
    write_packed_bools(&mut writer, &booleans);

    for (field, value) in schema.fields().iter().zip(&values) {
        if field.field_type.is_packed() {
            continue;
        }
        field
            .field_type
            .check_limits(value, &limits.fields)
            .and_then(|()| field.field_type.write(&mut writer, value))
            .map_err(|source| CodecError::InvalidArgument {
                packet: schema.id().to_string(),
                field: field.name.clone(),
                source,
            })?;
    }

    let len = writer.len();
    limits.check_packet_len(len)?;
    trace!(packet = schema.id(), discriminator, bytes = len, "encoded packet");
    writer.finish_into(out);
    Ok(len)
}
