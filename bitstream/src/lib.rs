//! Byte cursor and bit packing primitives for the wirepack codec.
//!
//! This crate provides [`ByteWriter`] and [`ByteReader`] for the scalar
//! encodings used on the wire, plus the packed boolean bitfield.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked; variable-length reads take a cap.
//! - **No domain knowledge** - This crate knows nothing about packets, schemas, or fields.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Byte order
//!
//! Every multi-byte fixed-width value (16/24/32/64-bit integers and IEEE-754
//! floats) is big-endian.
//!
//! # Example
//!
//! ```
//! use bitstream::{ByteReader, ByteWriter};
//!
//! let mut writer = ByteWriter::new();
//! writer.write_varu32(300);
//! writer.write_u16(0xBEEF);
//! writer.write_str("hi").unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = ByteReader::new(&bytes);
//! assert_eq!(reader.read_varu32().unwrap(), 300);
//! assert_eq!(reader.read_u16().unwrap(), 0xBEEF);
//! assert_eq!(reader.read_str(16).unwrap(), "hi");
//! assert!(reader.is_empty());
//! ```

mod bitfield;
mod error;
mod reader;
mod varint;
mod writer;

pub use bitfield::{packed_len, read_packed_bools, write_packed_bools};
pub use error::{BitError, BitResult};
pub use reader::ByteReader;
pub use varint::{varu32_len, zigzag_decode, zigzag_encode, VARINT_MAX_BYTES};
pub use writer::ByteWriter;
