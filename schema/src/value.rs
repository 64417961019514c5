//! Dynamically typed field values.

use document::Document;

use crate::Category;

/// A single field value, tagged with its category.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Floating(f64),
    Boolean(bool),
    Text(String),
    Bytes(Vec<u8>),
    Blob(Document),
}

impl Value {
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Integer(_) => Category::Integer,
            Self::Floating(_) => Category::Floating,
            Self::Boolean(_) => Category::Boolean,
            Self::Text(_) => Category::String,
            Self::Bytes(_) => Category::OpaqueBytes,
            Self::Blob(_) => Category::StructuredBlob,
        }
    }

    /// Integer view of a numeric value.
    ///
    /// Floating values are truncated toward zero and saturate at the `i64`
    /// bounds; NaN maps to 0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Floating(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Floating view of a numeric value.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Floating(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Blob(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Self::Integer(i64::from(value))
            }
        })*
    };
}

impl_from_int!(i8, u8, i16, u16, i32, u32, i64);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Floating(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Floating(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Self::Blob(value)
    }
}
