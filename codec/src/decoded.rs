//! Read-only access to a decoded packet.

use std::fmt;
use std::sync::Arc;

use schema::{Category, Document, FieldType, PacketSchema, Value};

use crate::error::{CodecError, CodecResult};
use crate::pending::invalid_type;

/// A fully decoded packet with category-checked getters.
pub struct DecodedMessage<H> {
    schema: Arc<PacketSchema<H>>,
    discriminator: u8,
    values: Vec<Value>,
}

impl<H> DecodedMessage<H> {
    /// `values` must hold one entry per schema field, in declaration order.
    pub(crate) fn new(schema: Arc<PacketSchema<H>>, discriminator: u8, values: Vec<Value>) -> Self {
        debug_assert_eq!(schema.fields().len(), values.len());
        Self {
            schema,
            discriminator,
            values,
        }
    }

    #[must_use]
    pub fn schema(&self) -> &Arc<PacketSchema<H>> {
        &self.schema
    }

    /// Identifier of the decoded packet.
    #[must_use]
    pub fn packet(&self) -> &str {
        self.schema.id()
    }

    #[must_use]
    pub const fn discriminator(&self) -> u8 {
        self.discriminator
    }

    /// Raw value lookup, without category checks.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema
            .fields()
            .iter()
            .position(|field| field.name == name)
            .map(|index| &self.values[index])
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.schema
            .fields()
            .iter()
            .map(|field| field.name.as_str())
            .zip(&self.values)
    }

    /// Integer view of an integer or floating field; floats truncate toward zero.
    pub fn get_int(&self, name: &str) -> CodecResult<i64> {
        let (declared, value) = self.checked(name, &[Category::Integer])?;
        value
            .as_i64()
            .ok_or_else(|| invalid_type(self.schema.id(), name, Category::Integer, declared))
    }

    /// Floating view of a floating or integer field.
    pub fn get_float(&self, name: &str) -> CodecResult<f64> {
        let (declared, value) = self.checked(name, &[Category::Floating, Category::Integer])?;
        value
            .as_f64()
            .ok_or_else(|| invalid_type(self.schema.id(), name, Category::Floating, declared))
    }

    pub fn get_bool(&self, name: &str) -> CodecResult<bool> {
        let (declared, value) = self.checked(name, &[Category::Boolean])?;
        value
            .as_bool()
            .ok_or_else(|| invalid_type(self.schema.id(), name, Category::Boolean, declared))
    }

    pub fn get_str(&self, name: &str) -> CodecResult<&str> {
        let (declared, value) = self.checked(name, &[Category::String])?;
        value
            .as_str()
            .ok_or_else(|| invalid_type(self.schema.id(), name, Category::String, declared))
    }

    pub fn get_bytes(&self, name: &str) -> CodecResult<&[u8]> {
        let (declared, value) = self.checked(name, &[Category::OpaqueBytes])?;
        value
            .as_bytes()
            .ok_or_else(|| invalid_type(self.schema.id(), name, Category::OpaqueBytes, declared))
    }

    pub fn get_document(&self, name: &str) -> CodecResult<&Document> {
        let (declared, value) = self.checked(name, &[Category::StructuredBlob])?;
        value
            .as_document()
            .ok_or_else(|| invalid_type(self.schema.id(), name, Category::StructuredBlob, declared))
    }

    /// Resolves `name` and checks the declared type accepts one of `accepted`.
    /// The first accepted category is reported on mismatch.
    fn checked(&self, name: &str, accepted: &[Category]) -> CodecResult<(FieldType, &Value)> {
        let Some(index) = self.schema.fields().iter().position(|field| field.name == name) else {
            return Err(CodecError::UnknownField {
                packet: self.schema.id().to_string(),
                field: name.to_string(),
            });
        };
        let declared = self.schema.fields()[index].field_type;
        if !accepted.iter().any(|&category| declared.is_valid_for(category)) {
            return Err(invalid_type(self.schema.id(), name, accepted[0], declared));
        }
        Ok((declared, &self.values[index]))
    }
}

impl<H> Clone for DecodedMessage<H> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            discriminator: self.discriminator,
            values: self.values.clone(),
        }
    }
}

impl<H> PartialEq for DecodedMessage<H> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) && self.values == other.values
    }
}

impl<H> fmt::Debug for DecodedMessage<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedMessage")
            .field("packet", &self.schema.id())
            .field("discriminator", &self.discriminator)
            .field("values", &self.values)
            .finish()
    }
}
