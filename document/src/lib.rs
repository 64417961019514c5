//! Structured tree documents for the wirepack codec.
//!
//! A [`Document`] is an ordered map from names to [`Tag`]s, where tags are
//! scalars, arrays, homogeneous lists, or nested documents. Documents are
//! carried on the wire by the structured-blob field type.
//!
//! # Binary format
//!
//! All multi-byte values are big-endian.
//!
//! ```text
//! document  := 0x0A name("") compound
//! compound  := (kind:u8 name payload)* 0x00
//! name      := len:u16 utf8-bytes
//! list      := element-kind:u8 count:i32 payload*
//! *-array   := count:i32 element*
//! ```
//!
//! Decoding is bounded: nesting depth is capped by the caller and element
//! counts are checked against the remaining input before allocating.

mod binary;
mod document;
mod error;
mod tag;

pub use binary::{decode_document, encode_document, EMPTY_DOCUMENT_LEN};
pub use document::Document;
pub use error::{DocumentError, DocumentResult};
pub use tag::{Tag, TagKind, TagList};
