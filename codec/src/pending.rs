//! Fluent, type-checked accumulation of outgoing field values.

use std::fmt;
use std::sync::Arc;

use schema::{Category, Document, FieldType, PacketSchema, SchemaRegistry, Value, ValueError};

use crate::error::{CodecError, CodecResult};

/// Values collected for one outgoing packet.
///
/// Every setter validates immediately: unknown names, category mismatches
/// and unrepresentable values are rejected by the call that supplies them.
///
/// The integer setter accepts floating fields, and the float setter does
/// not accept integer fields; see [`FieldType::categories`].
pub struct PendingMessage<H> {
    registry: Arc<SchemaRegistry<H>>,
    selected: Option<Selected<H>>,
}

struct Selected<H> {
    schema: Arc<PacketSchema<H>>,
    discriminator: u8,
    values: Vec<Option<Value>>,
}

impl<H> PendingMessage<H> {
    /// Creates a message with no packet selected yet.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry<H>>) -> Self {
        Self {
            registry,
            selected: None,
        }
    }

    /// Selects the packet to build.
    pub fn packet(mut self, id: &str) -> CodecResult<Self> {
        if self.selected.is_some() {
            return Err(CodecError::InvalidState {
                reason: "a packet is already selected",
            });
        }
        let schema = Arc::clone(self.registry.get(id)?);
        let discriminator = self
            .registry
            .discriminator(id)
            .ok_or_else(|| CodecError::InvalidState {
                reason: "registry lost a discriminator",
            })?;
        let values = vec![None; schema.fields().len()];
        self.selected = Some(Selected {
            schema,
            discriminator,
            values,
        });
        Ok(self)
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<SchemaRegistry<H>> {
        &self.registry
    }

    /// The selected schema, if any.
    #[must_use]
    pub fn schema(&self) -> Option<&Arc<PacketSchema<H>>> {
        self.selected.as_ref().map(|selected| &selected.schema)
    }

    #[must_use]
    pub fn discriminator(&self) -> Option<u8> {
        self.selected.as_ref().map(|selected| selected.discriminator)
    }

    /// The value set for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        let selected = self.selected.as_ref()?;
        let index = field_index(&selected.schema, name)?;
        selected.values[index].as_ref()
    }

    pub fn with_int(self, name: &str, value: i64) -> CodecResult<Self> {
        self.put(name, Category::Integer, Value::Integer(value))
    }

    pub fn with_float(self, name: &str, value: f64) -> CodecResult<Self> {
        self.put(name, Category::Floating, Value::Floating(value))
    }

    pub fn with_bool(self, name: &str, value: bool) -> CodecResult<Self> {
        self.put(name, Category::Boolean, Value::Boolean(value))
    }

    pub fn with_text(self, name: &str, value: impl Into<String>) -> CodecResult<Self> {
        self.put(name, Category::String, Value::Text(value.into()))
    }

    pub fn with_bytes(self, name: &str, value: impl Into<Vec<u8>>) -> CodecResult<Self> {
        self.put(name, Category::OpaqueBytes, Value::Bytes(value.into()))
    }

    pub fn with_document(self, name: &str, value: Document) -> CodecResult<Self> {
        self.put(name, Category::StructuredBlob, Value::Blob(value))
    }

    /// Sets a dynamically typed value, checked against its own category.
    pub fn set(self, name: &str, value: impl Into<Value>) -> CodecResult<Self> {
        let value = value.into();
        self.put(name, value.category(), value)
    }

    fn put(mut self, name: &str, requested: Category, value: Value) -> CodecResult<Self> {
        let Some(selected) = self.selected.as_mut() else {
            return Err(CodecError::InvalidState {
                reason: "no packet selected",
            });
        };
        let schema = &selected.schema;
        let Some(index) = field_index(schema, name) else {
            return Err(CodecError::UnknownField {
                packet: schema.id().to_string(),
                field: name.to_string(),
            });
        };
        let declared = schema.fields()[index].field_type;
        if !declared.is_valid_for(requested) {
            return Err(invalid_type(schema.id(), name, requested, declared));
        }
        check_value(schema.id(), name, declared, &value)?;
        selected.values[index] = Some(value);
        Ok(self)
    }

    /// Field values in declaration order, or the names of unset fields.
    pub(crate) fn complete(&self) -> CodecResult<(&Arc<PacketSchema<H>>, u8, Vec<&Value>)> {
        let Some(selected) = self.selected.as_ref() else {
            return Err(CodecError::InvalidState {
                reason: "no packet selected",
            });
        };
        let missing: Vec<String> = selected
            .schema
            .fields()
            .iter()
            .zip(&selected.values)
            .filter(|(_, value)| value.is_none())
            .map(|(field, _)| field.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(CodecError::MissingField {
                packet: selected.schema.id().to_string(),
                fields: missing,
            });
        }
        let values = selected.values.iter().flatten().collect();
        Ok((&selected.schema, selected.discriminator, values))
    }
}

impl<H> fmt::Debug for PendingMessage<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("PendingMessage");
        debug.field("registry", &self.registry.name());
        if let Some(selected) = &self.selected {
            debug
                .field("packet", &selected.schema.id())
                .field("values", &selected.values);
        }
        debug.finish()
    }
}

fn field_index<H>(schema: &PacketSchema<H>, name: &str) -> Option<usize> {
    schema.fields().iter().position(|field| field.name == name)
}

pub(crate) fn invalid_type(
    packet: &str,
    field: &str,
    requested: Category,
    declared: FieldType,
) -> CodecError {
    CodecError::InvalidType {
        packet: packet.to_string(),
        field: field.to_string(),
        requested,
        declared,
    }
}

fn check_value(packet: &str, field: &str, declared: FieldType, value: &Value) -> CodecResult<()> {
    let length = match value {
        Value::Text(text) => Some(text.len()),
        Value::Bytes(bytes) => Some(bytes.len()),
        _ => None,
    };
    if let Some(length) = length.filter(|&length| u32::try_from(length).is_err()) {
        return Err(CodecError::InvalidArgument {
            packet: packet.to_string(),
            field: field.to_string(),
            source: ValueError::Bitstream(bitstream::BitError::LengthOverflow { length }),
        });
    }
    declared.check(value).map_err(|source| match source {
        ValueError::Mismatch { found, .. } => invalid_type(packet, field, found, declared),
        source => CodecError::InvalidArgument {
            packet: packet.to_string(),
            field: field.to_string(),
            source,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::{RegistryBuilder, Side};

    fn registry() -> Arc<SchemaRegistry<()>> {
        Arc::new(
            RegistryBuilder::new("game")
                .packet("move")
                .with(FieldType::I32, "x")
                .unwrap()
                .with(FieldType::F32, "speed")
                .unwrap()
                .with(FieldType::Bool, "sprint")
                .unwrap()
                .with(FieldType::Text, "note")
                .unwrap()
                .with(FieldType::U8, "flags")
                .unwrap()
                .bound_to(Side::Server)
                .unwrap()
                .handled_by(())
                .unwrap()
                .build(),
        )
    }

    fn pending() -> PendingMessage<()> {
        PendingMessage::new(registry()).packet("move").unwrap()
    }

    #[test]
    fn setters_store_values() {
        let message = pending()
            .with_int("x", -4)
            .unwrap()
            .with_bool("sprint", true)
            .unwrap()
            .with_text("note", "hi")
            .unwrap();
        assert_eq!(message.get("x"), Some(&Value::Integer(-4)));
        assert_eq!(message.get("sprint"), Some(&Value::Boolean(true)));
        assert_eq!(message.get("speed"), None);
        assert_eq!(message.discriminator(), Some(0));
    }

    #[test]
    fn later_set_overwrites() {
        let message = pending().with_int("x", 1).unwrap().with_int("x", 2).unwrap();
        assert_eq!(message.get("x"), Some(&Value::Integer(2)));
    }

    #[test]
    fn setter_before_packet_is_invalid_state() {
        let err = PendingMessage::new(registry()).with_int("x", 1).unwrap_err();
        assert!(matches!(err, CodecError::InvalidState { .. }));
    }

    #[test]
    fn packet_twice_is_invalid_state() {
        let err = pending().packet("move").unwrap_err();
        assert!(matches!(err, CodecError::InvalidState { .. }));
    }

    #[test]
    fn unknown_packet_id() {
        let err = PendingMessage::new(registry()).packet("jump").unwrap_err();
        assert!(matches!(
            err,
            CodecError::Schema(schema::SchemaError::UnknownSchema { .. })
        ));
    }

    #[test]
    fn unknown_field() {
        let err = pending().with_int("y", 1).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnknownField {
                packet: "move".to_string(),
                field: "y".to_string()
            }
        );
    }

    #[test]
    fn bool_setter_on_text_field() {
        let err = pending().with_bool("note", true).unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidType {
                packet: "move".to_string(),
                field: "note".to_string(),
                requested: Category::Boolean,
                declared: FieldType::Text,
            }
        );
    }

    #[test]
    fn int_setter_accepts_float_field() {
        let message = pending().with_int("speed", 3).unwrap();
        assert_eq!(message.get("speed"), Some(&Value::Integer(3)));
    }

    #[test]
    fn float_setter_rejects_int_field() {
        let err = pending().with_float("x", 1.5).unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidType {
                requested: Category::Floating,
                declared: FieldType::I32,
                ..
            }
        ));
    }

    #[test]
    fn out_of_range_is_invalid_argument() {
        let err = pending().with_int("flags", 256).unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidArgument {
                source: ValueError::IntegerOutOfRange { .. },
                ..
            }
        ));
    }

    #[test]
    fn dynamic_set_uses_value_category() {
        let message = pending().set("note", "text").unwrap();
        assert_eq!(message.get("note"), Some(&Value::from("text")));
        let err = pending().set("note", 5).unwrap_err();
        assert!(matches!(err, CodecError::InvalidType { .. }));
    }

    #[test]
    fn complete_reports_missing_fields() {
        let err = pending().with_int("x", 1).unwrap().complete().unwrap_err();
        assert_eq!(
            err,
            CodecError::MissingField {
                packet: "move".to_string(),
                fields: vec![
                    "speed".to_string(),
                    "sprint".to_string(),
                    "note".to_string(),
                    "flags".to_string()
                ],
            }
        );
    }
}
