//! Tag values stored inside documents.

use crate::error::{DocumentError, DocumentResult};
use crate::Document;

/// The kind of a tag, as written on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagKind {
    /// Terminates a compound; also the element kind of an empty list.
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

impl TagKind {
    /// Parses a kind byte.
    pub fn from_u8(raw: u8) -> DocumentResult<Self> {
        Ok(match raw {
            0 => Self::End,
            1 => Self::Byte,
            2 => Self::Short,
            3 => Self::Int,
            4 => Self::Long,
            5 => Self::Float,
            6 => Self::Double,
            7 => Self::ByteArray,
            8 => Self::String,
            9 => Self::List,
            10 => Self::Compound,
            11 => Self::IntArray,
            12 => Self::LongArray,
            kind => return Err(DocumentError::UnknownTagKind { kind }),
        })
    }

    /// Returns the kind byte.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Smallest number of bytes a payload of this kind can occupy.
    #[must_use]
    pub(crate) const fn min_payload_len(self) -> usize {
        match self {
            Self::End => 0,
            Self::Byte | Self::Compound => 1,
            Self::Short | Self::String => 2,
            Self::Int | Self::Float | Self::ByteArray | Self::IntArray | Self::LongArray => 4,
            Self::List => 5,
            Self::Long | Self::Double => 8,
        }
    }
}

/// A single value inside a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(String),
    List(TagList),
    Compound(Document),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    /// Returns the wire kind of this tag.
    #[must_use]
    pub const fn kind(&self) -> TagKind {
        match self {
            Self::Byte(_) => TagKind::Byte,
            Self::Short(_) => TagKind::Short,
            Self::Int(_) => TagKind::Int,
            Self::Long(_) => TagKind::Long,
            Self::Float(_) => TagKind::Float,
            Self::Double(_) => TagKind::Double,
            Self::ByteArray(_) => TagKind::ByteArray,
            Self::String(_) => TagKind::String,
            Self::List(_) => TagKind::List,
            Self::Compound(_) => TagKind::Compound,
            Self::IntArray(_) => TagKind::IntArray,
            Self::LongArray(_) => TagKind::LongArray,
        }
    }
}

impl From<i8> for Tag {
    fn from(value: i8) -> Self {
        Self::Byte(value)
    }
}

impl From<i16> for Tag {
    fn from(value: i16) -> Self {
        Self::Short(value)
    }
}

impl From<i32> for Tag {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for Tag {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f32> for Tag {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for Tag {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Document> for Tag {
    fn from(value: Document) -> Self {
        Self::Compound(value)
    }
}

impl From<TagList> for Tag {
    fn from(value: TagList) -> Self {
        Self::List(value)
    }
}

/// A homogeneous list of tags.
#[derive(Debug, Clone, PartialEq)]
pub struct TagList {
    kind: TagKind,
    items: Vec<Tag>,
}

impl TagList {
    /// Creates an empty list whose elements must be of `kind`.
    #[must_use]
    pub const fn new(kind: TagKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    /// Creates a list from tags, taking the element kind from the first tag.
    ///
    /// An empty vector produces an empty list of kind [`TagKind::End`].
    pub fn from_tags(items: Vec<Tag>) -> DocumentResult<Self> {
        let kind = items.first().map_or(TagKind::End, Tag::kind);
        let mut list = Self::new(kind);
        for item in items {
            list.push(item)?;
        }
        Ok(list)
    }

    /// Appends a tag, rejecting kinds that differ from the list's.
    pub fn push(&mut self, tag: Tag) -> DocumentResult<()> {
        if self.items.is_empty() && self.kind == TagKind::End {
            self.kind = tag.kind();
        }
        if tag.kind() != self.kind {
            return Err(DocumentError::MixedList {
                expected: self.kind,
                found: tag.kind(),
            });
        }
        self.items.push(tag);
        Ok(())
    }

    /// Element kind.
    #[must_use]
    pub const fn kind(&self) -> TagKind {
        self.kind
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.items.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.items.get(index)
    }
}

impl<'a> IntoIterator for &'a TagList {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
