//! Binary encoding of documents.

use bitstream::{BitError, ByteReader, ByteWriter};

use crate::error::{DocumentError, DocumentResult};
use crate::{Document, Tag, TagKind, TagList};

/// Encoded size of an empty document: root kind, empty name, end marker.
pub const EMPTY_DOCUMENT_LEN: usize = 4;

/// Appends `document` to `writer` as a root compound with an empty name.
///
/// On error the writer may hold a partial document and should be discarded.
pub fn encode_document(document: &Document, writer: &mut ByteWriter) -> DocumentResult<()> {
    writer.write_u8(TagKind::Compound.raw());
    write_name(writer, "")?;
    write_compound(writer, document)
}

/// Reads a root compound, rejecting nesting deeper than `max_depth`.
///
/// The root itself counts as depth 1.
pub fn decode_document(reader: &mut ByteReader<'_>, max_depth: usize) -> DocumentResult<Document> {
    let kind = reader.read_u8()?;
    if kind != TagKind::Compound.raw() {
        return Err(DocumentError::RootNotCompound { kind });
    }
    read_name(reader)?;
    read_compound(reader, enter(0, max_depth)?, max_depth)
}

fn write_name(writer: &mut ByteWriter, name: &str) -> DocumentResult<()> {
    let len = u16::try_from(name.len())
        .map_err(|_| DocumentError::StringTooLong { length: name.len() })?;
    writer.write_u16(len);
    writer.write_bytes(name.as_bytes());
    Ok(())
}

fn write_count(writer: &mut ByteWriter, len: usize) -> DocumentResult<()> {
    let count = i32::try_from(len).map_err(|_| DocumentError::SequenceTooLong { length: len })?;
    writer.write_i32(count);
    Ok(())
}

fn write_compound(writer: &mut ByteWriter, document: &Document) -> DocumentResult<()> {
    for (name, tag) in document.iter() {
        writer.write_u8(tag.kind().raw());
        write_name(writer, name)?;
        write_payload(writer, tag)?;
    }
    writer.write_u8(TagKind::End.raw());
    Ok(())
}

fn write_payload(writer: &mut ByteWriter, tag: &Tag) -> DocumentResult<()> {
    match tag {
        Tag::Byte(value) => writer.write_i8(*value),
        Tag::Short(value) => writer.write_i16(*value),
        Tag::Int(value) => writer.write_i32(*value),
        Tag::Long(value) => writer.write_i64(*value),
        Tag::Float(value) => writer.write_f32(*value),
        Tag::Double(value) => writer.write_f64(*value),
        Tag::ByteArray(bytes) => {
            write_count(writer, bytes.len())?;
            writer.write_bytes(bytes);
        }
        Tag::String(value) => write_name(writer, value)?,
        Tag::List(list) => write_list(writer, list)?,
        Tag::Compound(document) => write_compound(writer, document)?,
        Tag::IntArray(values) => {
            write_count(writer, values.len())?;
            for value in values {
                writer.write_i32(*value);
            }
        }
        Tag::LongArray(values) => {
            write_count(writer, values.len())?;
            for value in values {
                writer.write_i64(*value);
            }
        }
    }
    Ok(())
}

fn write_list(writer: &mut ByteWriter, list: &TagList) -> DocumentResult<()> {
    writer.write_u8(list.kind().raw());
    write_count(writer, list.len())?;
    for tag in list {
        write_payload(writer, tag)?;
    }
    Ok(())
}

fn enter(depth: usize, max_depth: usize) -> DocumentResult<usize> {
    let next = depth + 1;
    if next > max_depth {
        return Err(DocumentError::DepthExceeded { limit: max_depth });
    }
    Ok(next)
}

fn read_name(reader: &mut ByteReader<'_>) -> DocumentResult<String> {
    let len = reader.read_u16()?;
    let bytes = reader.read_bytes(usize::from(len))?;
    let name = std::str::from_utf8(bytes).map_err(|_| BitError::InvalidUtf8)?;
    Ok(name.to_string())
}

/// Reads an `i32` count and checks that `count` elements can still fit.
fn read_count(reader: &mut ByteReader<'_>, min_element_len: usize) -> DocumentResult<usize> {
    let raw = reader.read_i32()?;
    let count = usize::try_from(raw).map_err(|_| DocumentError::NegativeLength { length: raw })?;
    let needed = count.saturating_mul(min_element_len);
    if needed > reader.remaining() {
        return Err(BitError::UnexpectedEof {
            requested: needed,
            available: reader.remaining(),
        }
        .into());
    }
    Ok(count)
}

fn read_compound(
    reader: &mut ByteReader<'_>,
    depth: usize,
    max_depth: usize,
) -> DocumentResult<Document> {
    let mut document = Document::new();
    loop {
        let kind = TagKind::from_u8(reader.read_u8()?)?;
        if kind == TagKind::End {
            return Ok(document);
        }
        let name = read_name(reader)?;
        let tag = read_payload(reader, kind, depth, max_depth)?;
        if document.contains_key(&name) {
            return Err(DocumentError::DuplicateKey { name });
        }
        document.insert(name, tag);
    }
}

fn read_payload(
    reader: &mut ByteReader<'_>,
    kind: TagKind,
    depth: usize,
    max_depth: usize,
) -> DocumentResult<Tag> {
    let tag = match kind {
        TagKind::End => return Err(DocumentError::UnknownTagKind { kind: 0 }),
        TagKind::Byte => Tag::Byte(reader.read_i8()?),
        TagKind::Short => Tag::Short(reader.read_i16()?),
        TagKind::Int => Tag::Int(reader.read_i32()?),
        TagKind::Long => Tag::Long(reader.read_i64()?),
        TagKind::Float => Tag::Float(reader.read_f32()?),
        TagKind::Double => Tag::Double(reader.read_f64()?),
        TagKind::ByteArray => {
            let count = read_count(reader, 1)?;
            Tag::ByteArray(reader.read_bytes(count)?.to_vec())
        }
        TagKind::String => Tag::String(read_name(reader)?),
        TagKind::List => Tag::List(read_list(reader, depth, max_depth)?),
        TagKind::Compound => {
            Tag::Compound(read_compound(reader, enter(depth, max_depth)?, max_depth)?)
        }
        TagKind::IntArray => {
            let count = read_count(reader, 4)?;
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(reader.read_i32()?);
            }
            Tag::IntArray(values)
        }
        TagKind::LongArray => {
            let count = read_count(reader, 8)?;
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(reader.read_i64()?);
            }
            Tag::LongArray(values)
        }
    };
    Ok(tag)
}

fn read_list(
    reader: &mut ByteReader<'_>,
    depth: usize,
    max_depth: usize,
) -> DocumentResult<TagList> {
    let depth = enter(depth, max_depth)?;
    let kind = TagKind::from_u8(reader.read_u8()?)?;
    let count = read_count(reader, kind.min_payload_len())?;
    if kind == TagKind::End && count != 0 {
        return Err(DocumentError::UnknownTagKind { kind: 0 });
    }
    let mut list = TagList::new(kind);
    for _ in 0..count {
        list.push(read_payload(reader, kind, depth, max_depth)?)?;
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(document: &Document) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        encode_document(document, &mut writer).unwrap();
        writer.finish()
    }

    fn decode(bytes: &[u8], max_depth: usize) -> DocumentResult<Document> {
        let mut reader = ByteReader::new(bytes);
        let document = decode_document(&mut reader, max_depth)?;
        assert!(reader.is_empty(), "decoder left trailing bytes");
        Ok(document)
    }

    #[test]
    fn empty_document_bytes() {
        assert_eq!(encode(&Document::new()), vec![0x0A, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn scalar_entry_bytes() {
        let document = Document::new().with("hp", 20i16);
        assert_eq!(
            encode(&document),
            vec![0x0A, 0x00, 0x00, 0x02, 0x00, 0x02, b'h', b'p', 0x00, 0x14, 0x00]
        );
    }

    #[test]
    fn nested_roundtrip() {
        let mut items = TagList::new(TagKind::Compound);
        items
            .push(Tag::Compound(Document::new().with("id", "stone").with("count", 64i8)))
            .unwrap();
        let document = Document::new()
            .with("name", "chest")
            .with("pos", Tag::IntArray(vec![1, -64, 300]))
            .with("seed", i64::MIN)
            .with("ratio", 0.5f32)
            .with("blob", Tag::ByteArray(vec![0, 255]))
            .with("stamps", Tag::LongArray(vec![]))
            .with("items", items)
            .with("inner", Document::new().with("x", 1.25f64));

        let bytes = encode(&document);
        assert_eq!(decode(&bytes, 8).unwrap(), document);
    }

    #[test]
    fn empty_list_roundtrip() {
        let document = Document::new().with("empty", TagList::new(TagKind::End));
        let bytes = encode(&document);
        assert_eq!(decode(&bytes, 4).unwrap(), document);
    }

    #[test]
    fn rejects_non_compound_root() {
        assert_eq!(
            decode(&[0x08, 0x00, 0x00, 0x00, 0x00], 4),
            Err(DocumentError::RootNotCompound { kind: 8 })
        );
    }

    #[test]
    fn rejects_excess_depth() {
        let document = Document::new().with("a", Document::new().with("b", Document::new()));
        assert_eq!(document.depth(), 3);
        let bytes = encode(&document);
        assert!(decode(&bytes, 3).is_ok());
        assert_eq!(
            decode(&bytes, 2),
            Err(DocumentError::DepthExceeded { limit: 2 })
        );
    }

    #[test]
    fn list_counts_toward_depth() {
        let inner = TagList::from_tags(vec![Tag::Int(1)]).unwrap();
        let outer = TagList::from_tags(vec![Tag::List(inner)]).unwrap();
        let document = Document::new().with("l", outer);
        assert_eq!(document.depth(), 3);
        let bytes = encode(&document);
        assert!(decode(&bytes, 3).is_ok());
        assert!(matches!(
            decode(&bytes, 2),
            Err(DocumentError::DepthExceeded { .. })
        ));
    }

    #[test]
    fn rejects_negative_length() {
        let bytes = [0x0A, 0x00, 0x00, 0x0B, 0x00, 0x01, b'a', 0xFF, 0xFF, 0xFF, 0xFF, 0x00];
        assert_eq!(
            decode(&bytes, 4),
            Err(DocumentError::NegativeLength { length: -1 })
        );
    }

    #[test]
    fn rejects_oversized_count_before_allocating() {
        let bytes = [0x0A, 0x00, 0x00, 0x0B, 0x00, 0x01, b'a', 0x7F, 0xFF, 0xFF, 0xFF];
        assert!(matches!(
            decode(&bytes, 4),
            Err(DocumentError::Bitstream(BitError::UnexpectedEof { .. }))
        ));
    }

    #[test]
    fn rejects_duplicate_keys() {
        let bytes = [
            0x0A, 0x00, 0x00, //
            0x01, 0x00, 0x01, b'a', 0x01, //
            0x01, 0x00, 0x01, b'a', 0x02, //
            0x00,
        ];
        assert_eq!(
            decode(&bytes, 4),
            Err(DocumentError::DuplicateKey {
                name: "a".to_string()
            })
        );
    }

    #[test]
    fn rejects_unknown_kind() {
        let bytes = [0x0A, 0x00, 0x00, 0x2A, 0x00, 0x00];
        assert_eq!(
            decode(&bytes, 4),
            Err(DocumentError::UnknownTagKind { kind: 0x2A })
        );
    }

    #[test]
    fn rejects_end_list_with_elements() {
        let bytes = [0x0A, 0x00, 0x00, 0x09, 0x00, 0x01, b'l', 0x00, 0x00, 0x00, 0x00, 0x01, 0x00];
        assert_eq!(
            decode(&bytes, 4),
            Err(DocumentError::UnknownTagKind { kind: 0 })
        );
    }

    #[test]
    fn truncated_input_fails() {
        let bytes = encode(&Document::new().with("name", "chest"));
        for len in 0..bytes.len() {
            assert!(decode(&bytes[..len], 4).is_err(), "prefix {len} decoded");
        }
    }

    #[test]
    fn rejects_long_names_on_encode() {
        let long = "x".repeat(usize::from(u16::MAX) + 1);
        let mut writer = ByteWriter::new();
        let err = encode_document(&Document::new().with(long, 1i8), &mut writer).unwrap_err();
        assert!(matches!(err, DocumentError::StringTooLong { .. }));
    }
}
