//! Packet schemas and their builder.

use std::fmt;

use bitstream::packed_len;

use crate::error::{SchemaError, SchemaResult};
use crate::{Field, FieldType, Side};

/// An immutable packet layout: ordered fields, the side that handles the
/// packet, and its handler.
///
/// Schemas are produced by [`SchemaBuilder`] and expose no mutating methods:
///
/// ```compile_fail
/// use schema::{FieldType, SchemaBuilder, Side};
///
/// let frozen = SchemaBuilder::new("ping")
///     .bound_to(Side::Server)
///     .unwrap()
///     .handled_by(())
///     .unwrap();
/// // No builder operations exist on a frozen schema.
/// let _ = frozen.with(FieldType::U8, "late");
/// ```
#[derive(Clone)]
pub struct PacketSchema<H> {
    id: String,
    fields: Vec<Field>,
    booleans: Vec<usize>,
    side: Side,
    handler: H,
}

impl<H> PacketSchema<H> {
    /// Starts a builder for a packet named `id`.
    #[must_use]
    pub fn builder(id: impl Into<String>) -> SchemaBuilder<H> {
        SchemaBuilder::new(id)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fields in declaration order, booleans included.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.field(name).map(|field| field.field_type)
    }

    /// Boolean fields in declaration order; position `j` maps to bit `j` of the bitfield.
    pub fn boolean_fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.booleans.iter().map(|&index| &self.fields[index])
    }

    /// Non-boolean fields in declaration order.
    pub fn value_fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.fields
            .iter()
            .filter(|field| !field.field_type.is_packed())
    }

    #[must_use]
    pub fn boolean_count(&self) -> usize {
        self.booleans.len()
    }

    /// Bytes occupied by the packed boolean region.
    #[must_use]
    pub fn bitfield_len(&self) -> usize {
        packed_len(self.booleans.len())
    }

    /// One discriminator byte plus every field's minimum size.
    #[must_use]
    pub fn minimum_size(&self) -> usize {
        1 + self
            .fields
            .iter()
            .map(|field| field.field_type.minimum_size())
            .sum::<usize>()
    }

    /// The side that receives and handles this packet.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    #[must_use]
    pub const fn handler(&self) -> &H {
        &self.handler
    }
}

impl<H> fmt::Debug for PacketSchema<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketSchema")
            .field("id", &self.id)
            .field("fields", &self.fields)
            .field("side", &self.side)
            .finish_non_exhaustive()
    }
}

/// Mutable builder for [`PacketSchema`].
///
/// Every step validates eagerly; the first misuse is reported by the call
/// that introduced it.
pub struct SchemaBuilder<H> {
    id: String,
    fields: Vec<Field>,
    side: Option<Side>,
    handler: Option<H>,
}

impl<H> SchemaBuilder<H> {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
            side: None,
            handler: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Appends a field.
    pub fn with(mut self, field_type: FieldType, name: impl Into<String>) -> SchemaResult<Self> {
        let name = name.into();
        if self.fields.iter().any(|field| field.name == name) {
            return Err(SchemaError::DuplicateField {
                packet: self.id,
                field: name,
            });
        }
        self.fields.push(Field::new(name, field_type));
        Ok(self)
    }

    /// Sets the handling side. May only be called once.
    pub fn bound_to(mut self, side: Side) -> SchemaResult<Self> {
        if self.side.is_some() {
            return Err(SchemaError::InvalidState {
                packet: self.id,
                reason: "side is already bound",
            });
        }
        self.side = Some(side);
        Ok(self)
    }

    /// Sets the handler without freezing the schema.
    #[must_use]
    pub fn with_handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Sets the handler and freezes the schema.
    pub fn handled_by(self, handler: H) -> SchemaResult<PacketSchema<H>> {
        if self.side.is_none() {
            return Err(SchemaError::MissingSideBinding { packet: self.id });
        }
        self.with_handler(handler).build()
    }

    /// Freezes the schema.
    pub fn build(self) -> SchemaResult<PacketSchema<H>> {
        let Some(side) = self.side else {
            return Err(SchemaError::MissingSideBinding { packet: self.id });
        };
        let Some(handler) = self.handler else {
            return Err(SchemaError::MissingHandler { packet: self.id });
        };
        let booleans = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| field.field_type.is_packed())
            .map(|(index, _)| index)
            .collect();
        Ok(PacketSchema {
            id: self.id,
            fields: self.fields,
            booleans,
            side,
            handler,
        })
    }
}

impl<H> fmt::Debug for SchemaBuilder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBuilder")
            .field("id", &self.id)
            .field("fields", &self.fields)
            .field("side", &self.side)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement() -> PacketSchema<()> {
        SchemaBuilder::new("move")
            .with(FieldType::F32, "x")
            .unwrap()
            .with(FieldType::Bool, "sprint")
            .unwrap()
            .with(FieldType::VarUInt, "tick")
            .unwrap()
            .with(FieldType::Bool, "crouch")
            .unwrap()
            .bound_to(Side::Server)
            .unwrap()
            .handled_by(())
            .unwrap()
    }

    #[test]
    fn preserves_declaration_order() {
        let schema = movement();
        let names: Vec<_> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["x", "sprint", "tick", "crouch"]);
        let booleans: Vec<_> = schema.boolean_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(booleans, ["sprint", "crouch"]);
        let values: Vec<_> = schema.value_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(values, ["x", "tick"]);
    }

    #[test]
    fn minimum_size_counts_discriminator() {
        let schema = movement();
        assert_eq!(schema.minimum_size(), 1 + 4 + 1 + 1 + 1);
        assert_eq!(schema.bitfield_len(), 1);
        assert_eq!(schema.side(), Side::Server);
        assert_eq!(schema.field_type("tick"), Some(FieldType::VarUInt));
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn empty_schema_is_one_byte() {
        let schema = SchemaBuilder::new("ping")
            .bound_to(Side::Client)
            .unwrap()
            .handled_by(())
            .unwrap();
        assert_eq!(schema.minimum_size(), 1);
        assert_eq!(schema.bitfield_len(), 0);
    }

    #[test]
    fn rejects_duplicate_field() {
        let err = SchemaBuilder::<()>::new("move")
            .with(FieldType::U8, "x")
            .unwrap()
            .with(FieldType::Text, "x")
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateField {
                packet: "move".to_string(),
                field: "x".to_string()
            }
        );
    }

    #[test]
    fn rejects_second_side_binding() {
        let err = SchemaBuilder::<()>::new("move")
            .bound_to(Side::Server)
            .unwrap()
            .bound_to(Side::Client)
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidState { .. }));
    }

    #[test]
    fn handled_by_requires_side() {
        let err = SchemaBuilder::new("move").handled_by(()).unwrap_err();
        assert!(matches!(err, SchemaError::MissingSideBinding { .. }));
    }

    #[test]
    fn build_requires_handler() {
        let err = SchemaBuilder::<()>::new("move")
            .bound_to(Side::Server)
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingHandler { .. }));
    }

    #[test]
    fn debug_does_not_require_debug_handler() {
        struct Opaque;
        let schema = SchemaBuilder::new("ping")
            .bound_to(Side::Client)
            .unwrap()
            .handled_by(Opaque)
            .unwrap();
        assert!(format!("{schema:?}").contains("ping"));
    }
}
