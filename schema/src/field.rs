//! The field type table: encodings, minimum sizes, and accepted categories.

use std::fmt;

use bitstream::{BitError, ByteReader, ByteWriter};
use document::{decode_document, encode_document, DocumentError, EMPTY_DOCUMENT_LEN};

use crate::error::ValueError;
use crate::{FieldLimits, Value};

/// Logical value categories used to validate setters and getters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Integer,
    Floating,
    Boolean,
    String,
    OpaqueBytes,
    StructuredBlob,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Floating => "floating",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::OpaqueBytes => "bytes",
            Self::StructuredBlob => "document",
        };
        f.write_str(name)
    }
}

/// The encoding of a single packet field.
///
/// Multi-byte fixed-width types are big-endian. Varints are protobuf-style
/// base-128 with a 5-byte cap; strings and byte blobs carry a varint length
/// prefix counting bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum FieldType {
    /// Unsigned varint, `0..=u32::MAX`.
    #[cfg_attr(feature = "serde", serde(rename = "var_uint"))]
    VarUInt,
    /// Zig-zag varint over the `i32` range; small magnitudes of either sign stay short.
    #[cfg_attr(feature = "serde", serde(rename = "var_sint"))]
    VarSInt,
    U8,
    I8,
    U16,
    I16,
    U24,
    I24,
    U32,
    I32,
    I64,
    /// Packed into the bitfield after the discriminator.
    Bool,
    F32,
    F64,
    /// UTF-8 string.
    Text,
    /// Opaque byte blob.
    Bytes,
    /// Structured tree document.
    Document,
}

impl FieldType {
    pub const BYTE: Self = Self::I8;
    pub const SHORT: Self = Self::I16;
    pub const INT: Self = Self::I32;
    pub const LONG: Self = Self::I64;
    pub const FLOAT: Self = Self::F32;
    pub const DOUBLE: Self = Self::F64;
    pub const BYTE_ARRAY: Self = Self::Bytes;

    /// Every field type, in tag order.
    pub const ALL: [Self; 17] = [
        Self::VarUInt,
        Self::VarSInt,
        Self::U8,
        Self::I8,
        Self::U16,
        Self::I16,
        Self::U24,
        Self::I24,
        Self::U32,
        Self::I32,
        Self::I64,
        Self::Bool,
        Self::F32,
        Self::F64,
        Self::Text,
        Self::Bytes,
        Self::Document,
    ];

    /// Stable numeric tag, used for fingerprints only.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::VarUInt => "var_uint",
            Self::VarSInt => "var_sint",
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U24 => "u24",
            Self::I24 => "i24",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Bool => "bool",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Document => "document",
        }
    }

    /// Smallest number of bytes a value of this type occupies.
    ///
    /// `Bool` reports 1 even though it only costs a bit in the layout.
    #[must_use]
    pub const fn minimum_size(self) -> usize {
        match self {
            Self::VarUInt
            | Self::VarSInt
            | Self::U8
            | Self::I8
            | Self::Bool
            | Self::Text
            | Self::Bytes => 1,
            Self::U16 | Self::I16 => 2,
            Self::U24 | Self::I24 => 3,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::I64 | Self::F64 => 8,
            Self::Document => EMPTY_DOCUMENT_LEN,
        }
    }

    /// Categories this type accepts.
    ///
    /// Floating types also accept [`Category::Integer`], but integer types do
    /// not accept [`Category::Floating`]. Peers rely on this table, so the
    /// asymmetry is kept as-is.
    #[must_use]
    pub const fn categories(self) -> &'static [Category] {
        match self {
            Self::VarUInt
            | Self::VarSInt
            | Self::U8
            | Self::I8
            | Self::U16
            | Self::I16
            | Self::U24
            | Self::I24
            | Self::U32
            | Self::I32
            | Self::I64 => &[Category::Integer],
            Self::Bool => &[Category::Boolean],
            Self::F32 | Self::F64 => &[Category::Integer, Category::Floating],
            Self::Text => &[Category::String],
            Self::Bytes => &[Category::OpaqueBytes],
            Self::Document => &[Category::StructuredBlob],
        }
    }

    #[must_use]
    pub fn is_valid_for(self, category: Category) -> bool {
        self.categories().contains(&category)
    }

    /// Returns `true` for types carried in the boolean bitfield.
    #[must_use]
    pub const fn is_packed(self) -> bool {
        matches!(self, Self::Bool)
    }

    /// Inclusive range of integer values the wire encoding can carry.
    #[must_use]
    pub const fn integer_range(self) -> Option<(i64, i64)> {
        let range = match self {
            Self::VarUInt | Self::U32 => (0, u32::MAX as i64),
            Self::VarSInt | Self::I32 => (i32::MIN as i64, i32::MAX as i64),
            Self::U8 => (0, u8::MAX as i64),
            Self::I8 => (i8::MIN as i64, i8::MAX as i64),
            Self::U16 => (0, u16::MAX as i64),
            Self::I16 => (i16::MIN as i64, i16::MAX as i64),
            Self::U24 => (0, 0x00FF_FFFF),
            Self::I24 => (-0x0080_0000, 0x007F_FFFF),
            Self::I64 => (i64::MIN, i64::MAX),
            Self::Bool | Self::F32 | Self::F64 | Self::Text | Self::Bytes | Self::Document => {
                return None
            }
        };
        Some(range)
    }

    /// Validates that `value` can be written as this type.
    pub fn check(self, value: &Value) -> Result<(), ValueError> {
        if !self.is_valid_for(value.category()) {
            return Err(ValueError::Mismatch {
                field_type: self,
                found: value.category(),
            });
        }
        match value {
            Value::Integer(v) => {
                if let Some((min, max)) = self.integer_range() {
                    if !(min..=max).contains(v) {
                        return Err(ValueError::IntegerOutOfRange {
                            field_type: self,
                            value: *v,
                        });
                    }
                }
            }
            Value::Floating(v) => {
                if self == Self::F32 && v.is_finite() && v.abs() > f64::from(f32::MAX) {
                    return Err(ValueError::FloatOutOfRange {
                        field_type: self,
                        value: *v,
                    });
                }
            }
            Value::Boolean(_) | Value::Text(_) | Value::Bytes(_) | Value::Blob(_) => {}
        }
        Ok(())
    }

    /// Validates that `value` stays within `limits`, so that a reader
    /// configured with the same limits accepts it.
    pub fn check_limits(self, value: &Value, limits: &FieldLimits) -> Result<(), ValueError> {
        let (length, limit) = match value {
            Value::Text(text) => (text.len(), limits.max_string_bytes),
            Value::Bytes(bytes) => (bytes.len(), limits.max_blob_bytes),
            Value::Blob(document) => {
                if document.depth() > limits.max_document_depth {
                    return Err(DocumentError::DepthExceeded {
                        limit: limits.max_document_depth,
                    }
                    .into());
                }
                return Ok(());
            }
            Value::Integer(_) | Value::Floating(_) | Value::Boolean(_) => return Ok(()),
        };
        if length > limit {
            return Err(BitError::LengthExceedsLimit { length, limit }.into());
        }
        Ok(())
    }

    /// Appends `value` to `writer`.
    ///
    /// Fails with [`ValueError::Packed`] for `Bool`; booleans are written by
    /// the packet encoder's bitfield.
    pub fn write(self, writer: &mut ByteWriter, value: &Value) -> Result<(), ValueError> {
        self.check(value)?;
        match value {
            Value::Integer(v) => self.write_integer(writer, *v),
            Value::Floating(v) => self.write_floating(writer, *v),
            Value::Boolean(_) => Err(ValueError::Packed { field_type: self }),
            Value::Text(text) => Ok(writer.write_str(text)?),
            Value::Bytes(bytes) => Ok(writer.write_len_prefixed(bytes)?),
            Value::Blob(document) => Ok(encode_document(document, writer)?),
        }
    }

    /// Reads one value of this type from `reader`.
    ///
    /// Fails with [`ValueError::Packed`] for `Bool`.
    pub fn read(
        self,
        reader: &mut ByteReader<'_>,
        limits: &FieldLimits,
    ) -> Result<Value, ValueError> {
        let value = match self {
            Self::VarUInt => Value::Integer(i64::from(reader.read_varu32()?)),
            Self::VarSInt => Value::Integer(i64::from(reader.read_vars32()?)),
            Self::U8 => Value::Integer(i64::from(reader.read_u8()?)),
            Self::I8 => Value::Integer(i64::from(reader.read_i8()?)),
            Self::U16 => Value::Integer(i64::from(reader.read_u16()?)),
            Self::I16 => Value::Integer(i64::from(reader.read_i16()?)),
            Self::U24 => Value::Integer(i64::from(reader.read_u24()?)),
            Self::I24 => Value::Integer(i64::from(reader.read_i24()?)),
            Self::U32 => Value::Integer(i64::from(reader.read_u32()?)),
            Self::I32 => Value::Integer(i64::from(reader.read_i32()?)),
            Self::I64 => Value::Integer(reader.read_i64()?),
            Self::Bool => return Err(ValueError::Packed { field_type: self }),
            Self::F32 => Value::Floating(f64::from(reader.read_f32()?)),
            Self::F64 => Value::Floating(reader.read_f64()?),
            Self::Text => Value::Text(reader.read_str(limits.max_string_bytes)?.to_string()),
            Self::Bytes => Value::Bytes(reader.read_len_prefixed(limits.max_blob_bytes)?.to_vec()),
            Self::Document => Value::Blob(decode_document(reader, limits.max_document_depth)?),
        };
        Ok(value)
    }

    fn narrow<T: TryFrom<i64>>(self, value: i64) -> Result<T, ValueError> {
        T::try_from(value).map_err(|_| ValueError::IntegerOutOfRange {
            field_type: self,
            value,
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn write_integer(self, writer: &mut ByteWriter, value: i64) -> Result<(), ValueError> {
        match self {
            Self::VarUInt => writer.write_varu32(self.narrow(value)?),
            Self::VarSInt => writer.write_vars32(self.narrow(value)?),
            Self::U8 => writer.write_u8(self.narrow(value)?),
            Self::I8 => writer.write_i8(self.narrow(value)?),
            Self::U16 => writer.write_u16(self.narrow(value)?),
            Self::I16 => writer.write_i16(self.narrow(value)?),
            Self::U24 => writer.write_u24(self.narrow(value)?)?,
            Self::I24 => writer.write_i24(self.narrow(value)?)?,
            Self::U32 => writer.write_u32(self.narrow(value)?),
            Self::I32 => writer.write_i32(self.narrow(value)?),
            Self::I64 => writer.write_i64(value),
            Self::F32 => writer.write_f32(value as f32),
            Self::F64 => writer.write_f64(value as f64),
            Self::Bool | Self::Text | Self::Bytes | Self::Document => {
                return Err(ValueError::Mismatch {
                    field_type: self,
                    found: Category::Integer,
                })
            }
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn write_floating(self, writer: &mut ByteWriter, value: f64) -> Result<(), ValueError> {
        match self {
            Self::F32 => writer.write_f32(value as f32),
            Self::F64 => writer.write_f64(value),
            _ => {
                return Err(ValueError::Mismatch {
                    field_type: self,
                    found: Category::Floating,
                })
            }
        }
        Ok(())
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named field within a packet schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document::Document;

    fn roundtrip(field_type: FieldType, value: Value) -> Value {
        let mut writer = ByteWriter::new();
        field_type.write(&mut writer, &value).unwrap();
        let bytes = writer.finish();
        let mut reader = ByteReader::new(&bytes);
        let decoded = field_type.read(&mut reader, &FieldLimits::default()).unwrap();
        assert!(reader.is_empty(), "{field_type} left trailing bytes");
        decoded
    }

    #[test]
    fn aliases() {
        assert_eq!(FieldType::BYTE, FieldType::I8);
        assert_eq!(FieldType::SHORT, FieldType::I16);
        assert_eq!(FieldType::INT, FieldType::I32);
        assert_eq!(FieldType::LONG, FieldType::I64);
        assert_eq!(FieldType::FLOAT, FieldType::F32);
        assert_eq!(FieldType::DOUBLE, FieldType::F64);
        assert_eq!(FieldType::BYTE_ARRAY, FieldType::Bytes);
    }

    #[test]
    fn tags_are_distinct_and_ordered() {
        for (index, field_type) in FieldType::ALL.iter().enumerate() {
            assert_eq!(usize::from(field_type.tag()), index);
        }
    }

    #[test]
    fn minimum_sizes() {
        assert_eq!(FieldType::VarUInt.minimum_size(), 1);
        assert_eq!(FieldType::U24.minimum_size(), 3);
        assert_eq!(FieldType::F32.minimum_size(), 4);
        assert_eq!(FieldType::I64.minimum_size(), 8);
        assert_eq!(FieldType::Document.minimum_size(), 4);
    }

    #[test]
    fn category_table_is_asymmetric() {
        assert!(FieldType::F32.is_valid_for(Category::Integer));
        assert!(FieldType::F64.is_valid_for(Category::Floating));
        assert!(!FieldType::I32.is_valid_for(Category::Floating));
        assert!(FieldType::I32.is_valid_for(Category::Integer));
    }

    #[test]
    fn boolean_category_is_exclusive() {
        for field_type in FieldType::ALL {
            assert_eq!(
                field_type.is_valid_for(Category::Boolean),
                field_type == FieldType::Bool
            );
        }
    }

    #[test]
    fn integer_boundaries_roundtrip() {
        for field_type in FieldType::ALL {
            let Some((min, max)) = field_type.integer_range() else {
                continue;
            };
            for value in [min, max, 0] {
                assert_eq!(
                    roundtrip(field_type, Value::Integer(value)),
                    Value::Integer(value),
                    "{field_type} {value}"
                );
            }
            if min < 0 {
                assert_eq!(roundtrip(field_type, Value::Integer(-1)), Value::Integer(-1));
            }
        }
    }

    #[test]
    fn integer_out_of_range_rejected() {
        let mut writer = ByteWriter::new();
        for (field_type, value) in [
            (FieldType::U8, 256),
            (FieldType::U8, -1),
            (FieldType::I8, 128),
            (FieldType::U24, 0x0100_0000),
            (FieldType::I24, -0x0080_0001),
            (FieldType::VarUInt, -1),
            (FieldType::VarSInt, i64::from(i32::MAX) + 1),
            (FieldType::U32, i64::from(u32::MAX) + 1),
        ] {
            assert_eq!(
                field_type.write(&mut writer, &Value::Integer(value)),
                Err(ValueError::IntegerOutOfRange { field_type, value })
            );
        }
        assert!(writer.is_empty());
    }

    #[test]
    fn float_specials_roundtrip() {
        for field_type in [FieldType::F32, FieldType::F64] {
            for value in [0.0, -1.5, f64::INFINITY, f64::NEG_INFINITY] {
                assert_eq!(
                    roundtrip(field_type, Value::Floating(value)),
                    Value::Floating(value)
                );
            }
            let Value::Floating(nan) = roundtrip(field_type, Value::Floating(f64::NAN)) else {
                panic!("expected floating value");
            };
            assert!(nan.is_nan());
        }
    }

    #[test]
    fn float_field_accepts_integers() {
        assert_eq!(roundtrip(FieldType::F32, Value::Integer(3)), Value::Floating(3.0));
        assert_eq!(roundtrip(FieldType::F64, Value::Integer(-7)), Value::Floating(-7.0));
    }

    #[test]
    fn integer_field_rejects_floats() {
        let mut writer = ByteWriter::new();
        assert_eq!(
            FieldType::I32.write(&mut writer, &Value::Floating(1.0)),
            Err(ValueError::Mismatch {
                field_type: FieldType::I32,
                found: Category::Floating
            })
        );
    }

    #[test]
    fn f32_rejects_overflowing_doubles() {
        assert!(matches!(
            FieldType::F32.check(&Value::Floating(1.0e300)),
            Err(ValueError::FloatOutOfRange { .. })
        ));
        assert!(FieldType::F64.check(&Value::Floating(1.0e300)).is_ok());
    }

    #[test]
    fn variable_length_roundtrip() {
        assert_eq!(roundtrip(FieldType::Text, Value::from("")), Value::from(""));
        assert_eq!(roundtrip(FieldType::Text, Value::from("héllo")), Value::from("héllo"));
        assert_eq!(
            roundtrip(FieldType::Bytes, Value::Bytes(vec![])),
            Value::Bytes(vec![])
        );
        let doc = Document::new().with("k", 1i32);
        assert_eq!(
            roundtrip(FieldType::Document, Value::Blob(doc.clone())),
            Value::Blob(doc)
        );
    }

    #[test]
    fn bool_has_no_standalone_encoding() {
        let mut writer = ByteWriter::new();
        assert_eq!(
            FieldType::Bool.write(&mut writer, &Value::Boolean(true)),
            Err(ValueError::Packed {
                field_type: FieldType::Bool
            })
        );
        let mut reader = ByteReader::new(&[1]);
        assert!(matches!(
            FieldType::Bool.read(&mut reader, &FieldLimits::default()),
            Err(ValueError::Packed { .. })
        ));
    }

    #[test]
    fn read_respects_string_limit() {
        let mut writer = ByteWriter::new();
        FieldType::Text.write(&mut writer, &Value::from("abcdef")).unwrap();
        let bytes = writer.finish();
        let mut reader = ByteReader::new(&bytes);
        let result = FieldType::Text.read(&mut reader, &FieldLimits::for_testing().max_string(4));
        assert!(matches!(result, Err(ValueError::Bitstream(_))));
    }

    fn nested(depth: usize) -> Document {
        (1..depth).fold(Document::new(), |inner, _| Document::new().with("c", inner))
    }

    #[test]
    fn write_limits_match_read_limits() {
        let limits = FieldLimits::for_testing().max_string(4).max_blob(2).max_depth(3);
        let accepted = [
            (FieldType::Text, Value::from("abcd")),
            (FieldType::Bytes, Value::Bytes(vec![1, 2])),
            (FieldType::Document, Value::Blob(nested(3))),
        ];
        for (field_type, value) in accepted {
            field_type.check_limits(&value, &limits).unwrap();
            let mut writer = ByteWriter::new();
            field_type.write(&mut writer, &value).unwrap();
            let bytes = writer.finish();
            let mut reader = ByteReader::new(&bytes);
            assert_eq!(field_type.read(&mut reader, &limits).unwrap(), value);
        }

        assert_eq!(
            FieldType::Text.check_limits(&Value::from("abcde"), &limits),
            Err(ValueError::Bitstream(BitError::LengthExceedsLimit {
                length: 5,
                limit: 4
            }))
        );
        assert_eq!(
            FieldType::Bytes.check_limits(&Value::Bytes(vec![0; 3]), &limits),
            Err(ValueError::Bitstream(BitError::LengthExceedsLimit {
                length: 3,
                limit: 2
            }))
        );
        assert_eq!(
            FieldType::Document.check_limits(&Value::Blob(nested(4)), &limits),
            Err(ValueError::Document(DocumentError::DepthExceeded { limit: 3 }))
        );
        assert!(FieldType::I64
            .check_limits(&Value::Integer(i64::MAX), &limits)
            .is_ok());
    }

    #[test]
    fn display_uses_names() {
        assert_eq!(FieldType::VarSInt.to_string(), "var_sint");
        assert_eq!(FieldType::Document.to_string(), "document");
        assert_eq!(Category::OpaqueBytes.to_string(), "bytes");
    }
}
