//! NBT encoding.
//!
//! Nodes still holding their payload cache are copied verbatim, everything
//! else is encoded from its decoded form.
use crate::compression::Compression;
use crate::error::NbtError;
use crate::node::{Data, Node};
use crate::tag::TagKind;
use crate::value::Value;
use byteorder::{BigEndian, WriteBytesExt};
use bytes::Bytes;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Number of array elements encoded per write call.
pub const ARRAY_WRITE_WINDOW: usize = 1024;

enum Fresh {
    Encoded(Bytes),
    List(TagKind, Vec<Node>),
    Compound(Vec<(String, Node)>),
}

fn write_str<W: Write>(out: &mut W, value: &str) -> Result<(), NbtError> {
    let length = u16::try_from(value.len()).map_err(|_| NbtError::ValueOutOfRange {
        kind: TagKind::String,
        value: value.len() as i64,
    })?;

    out.write_u16::<BigEndian>(length)?;
    out.write_all(value.as_bytes())?;

    Ok(())
}

fn write_length<W: Write>(out: &mut W, kind: TagKind, length: usize) -> Result<(), NbtError> {
    let length = i32::try_from(length).map_err(|_| NbtError::ValueOutOfRange {
        kind,
        value: length as i64,
    })?;

    out.write_i32::<BigEndian>(length)?;

    Ok(())
}

fn encode_value(kind: TagKind, value: &Value) -> Result<Bytes, NbtError> {
    let mismatch = || NbtError::WrongKind {
        expected: "scalar tag",
        found: kind,
    };
    let mut buffer = Vec::with_capacity(kind.descriptor().size.max(2));

    match kind {
        TagKind::Byte => buffer.write_i8(value.as_i64().ok_or_else(mismatch)? as i8)?,
        TagKind::Short => {
            buffer.write_i16::<BigEndian>(value.as_i64().ok_or_else(mismatch)? as i16)?
        }
        TagKind::Int => {
            buffer.write_i32::<BigEndian>(value.as_i64().ok_or_else(mismatch)? as i32)?
        }
        TagKind::Long => buffer.write_i64::<BigEndian>(value.as_i64().ok_or_else(mismatch)?)?,
        TagKind::Float => {
            buffer.write_f32::<BigEndian>(value.as_f64().ok_or_else(mismatch)? as f32)?
        }
        TagKind::Double => buffer.write_f64::<BigEndian>(value.as_f64().ok_or_else(mismatch)?)?,
        TagKind::String => write_str(&mut buffer, value.as_str().ok_or_else(mismatch)?)?,
        _ => return Err(mismatch()),
    }

    Ok(Bytes::from(buffer))
}

fn write_array<W: Write>(out: &mut W, kind: TagKind, values: &[i64]) -> Result<(), NbtError> {
    let element = kind.element().ok_or(NbtError::WrongKind {
        expected: "array",
        found: kind,
    })?;

    write_length(out, kind, values.len())?;

    let mut buffer = Vec::with_capacity(ARRAY_WRITE_WINDOW * element.descriptor().size);

    for window in values.chunks(ARRAY_WRITE_WINDOW) {
        buffer.clear();

        for &value in window {
            match element {
                TagKind::Byte => buffer.write_i8(value as i8)?,
                TagKind::Int => buffer.write_i32::<BigEndian>(value as i32)?,
                _ => buffer.write_i64::<BigEndian>(value)?,
            }
        }

        out.write_all(&buffer)?;
    }

    Ok(())
}

impl Node {
    /// Writes the tag id, the name when given, and the payload.
    ///
    /// `End` tags are written as their id alone.
    pub fn write_to<W: Write>(&self, out: &mut W, name: Option<&str>) -> Result<(), NbtError> {
        let kind = self.kind();
        out.write_u8(kind.id())?;

        if kind == TagKind::End {
            return Ok(());
        }

        if let Some(name) = name {
            write_str(out, name)?;
        }

        self.write_payload(out)
    }

    /// Writes the node as a root tag with an empty name.
    pub fn write<W: Write>(&self, out: &mut W) -> Result<(), NbtError> {
        self.write_to(out, Some(""))
    }

    pub fn to_bytes(&self, name: Option<&str>) -> Result<Vec<u8>, NbtError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer, name)?;

        Ok(buffer)
    }

    pub(crate) fn write_payload<W: Write>(&self, out: &mut W) -> Result<(), NbtError> {
        if let Some(payload) = self.payload() {
            out.write_all(&payload)?;
            return Ok(());
        }

        let fresh = {
            let inner = self.0.borrow();

            match &inner.data {
                Data::End => return Ok(()),
                Data::Proxy(raw) => {
                    out.write_all(raw)?;
                    return Ok(());
                }
                Data::Value(value) => Fresh::Encoded(encode_value(inner.kind, value)?),
                Data::Array(values) => return write_array(out, inner.kind, values),
                Data::BitPack { words, .. } => {
                    let words: Vec<i64> = words.iter().map(|&word| word as i64).collect();
                    return write_array(out, inner.kind, &words);
                }
                Data::List { child, items } => Fresh::List(*child, items.clone()),
                Data::Compound(entries) => Fresh::Compound(entries.clone()),
            }
        };

        match fresh {
            Fresh::Encoded(payload) => {
                out.write_all(&payload)?;
                self.0.borrow_mut().payload = Some(payload);
            }
            Fresh::List(child, items) => {
                out.write_u8(child.id())?;
                write_length(out, TagKind::List, items.len())?;

                for item in &items {
                    item.write_payload(out)?;
                }
            }
            Fresh::Compound(entries) => {
                for (name, node) in &entries {
                    node.write_to(out, Some(name))?;
                }

                out.write_u8(TagKind::End.id())?;
            }
        }

        Ok(())
    }
}

/// Writes `node` as the root of an NBT file.
pub fn write_file<P: AsRef<Path>>(
    path: P,
    node: &Node,
    compression: Compression,
) -> Result<(), NbtError> {
    let data = compression.compress(&node.to_bytes(Some(""))?)?;
    fs::write(path, data)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::compression::Compression;
    use crate::node::Node;
    use crate::read::{parse_file, parse_slice};
    use crate::tag::TagKind;
    use crate::write::{write_file, ARRAY_WRITE_WINDOW};
    use tempfile::NamedTempFile;

    #[test]
    fn test_write_scalars() {
        assert_eq!(Node::byte(-1).to_bytes(None).unwrap(), vec![1, 0xFF]);
        assert_eq!(
            Node::short(0x1234).to_bytes(Some("a")).unwrap(),
            vec![2, 0, 1, b'a', 0x12, 0x34]
        );
        assert_eq!(
            Node::double(1.0).to_bytes(None).unwrap(),
            vec![6, 0x3F, 0xF0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            Node::string("hi").to_bytes(None).unwrap(),
            vec![8, 0, 2, b'h', b'i']
        );
    }

    #[test]
    fn test_write_caches_values() {
        let node = Node::int(7);

        assert!(!node.is_cached());
        node.to_bytes(None).unwrap();
        assert_eq!(node.payload().unwrap().as_ref(), &[0, 0, 0, 7]);
    }

    #[test]
    fn test_end_has_no_name() {
        let (end, _, _) = parse_slice(&[0]).unwrap();

        assert_eq!(end.to_bytes(Some("ignored")).unwrap(), vec![0]);
    }

    #[test]
    fn test_compound_keeps_insertion_order() {
        let root = Node::compound();
        root.set("b", Node::byte(1)).unwrap();
        root.set("a", Node::byte(2)).unwrap();

        assert_eq!(
            root.to_bytes(Some("")).unwrap(),
            vec![10, 0, 0, 1, 0, 1, b'b', 1, 1, 0, 1, b'a', 2, 0]
        );
    }

    #[test]
    fn test_write_list() {
        let list = Node::list(TagKind::Short);
        list.push(Node::short(1)).unwrap();
        list.push(Node::short(-1)).unwrap();

        assert_eq!(
            list.to_bytes(None).unwrap(),
            vec![9, 2, 0, 0, 0, 2, 0, 1, 0xFF, 0xFF]
        );
        assert_eq!(
            Node::list(TagKind::End).to_bytes(None).unwrap(),
            vec![9, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_write_large_array() {
        let values: Vec<i32> = (0..(ARRAY_WRITE_WINDOW as i32 * 2 + 5)).collect();
        let array = Node::int_array(values.clone());
        let bytes = array.to_bytes(Some("")).unwrap();

        assert_eq!(bytes.len(), 3 + 4 + values.len() * 4);

        let (parsed, _, _) = parse_slice(&bytes).unwrap();
        let expected: Vec<i64> = values.into_iter().map(i64::from).collect();
        assert_eq!(parsed.elements().unwrap(), expected);
        assert!(!array.is_cached());
    }

    #[test]
    fn test_rewrite_only_dirty_branches() {
        let root = Node::compound();
        let kept = Node::compound();
        let dirty = Node::compound();

        kept.set("value", Node::float(f32::from_bits(0x7FC0_0001))).unwrap();
        dirty.set("value", Node::int(1)).unwrap();
        root.set("kept", kept).unwrap();
        root.set("dirty", dirty).unwrap();

        let bytes = root.to_bytes(Some("")).unwrap();
        let (parsed, _, _) = parse_slice(&bytes).unwrap();

        parsed.get("dirty").unwrap().set_value("value", 2).unwrap();

        let kept = parsed.get("kept").unwrap();
        assert!(kept.is_cached());
        assert!(!parsed.is_cached());

        let rewritten = parsed.to_bytes(Some("")).unwrap();
        let (reparsed, _, _) = parse_slice(&rewritten).unwrap();

        assert_eq!(reparsed.get("dirty").unwrap().get("value").unwrap(), 2);
        assert_eq!(
            reparsed.get("kept").unwrap().payload(),
            kept.payload()
        );
    }

    #[test]
    fn test_write_bit_pack() {
        let pack = Node::bit_pack(4, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 0]).unwrap();
        let bytes = pack.to_bytes(None).unwrap();

        assert_eq!(&bytes[..5], &[12, 0, 0, 0, 1]);
        assert_eq!(&bytes[5..], &0x0FED_CBA9_8765_4321u64.to_be_bytes());
    }

    #[test]
    fn test_write_file_round_trip() {
        let root = Node::compound();
        root.set_value("name", "region").unwrap();
        root.set("data", Node::long_array(vec![1, 2, 3])).unwrap();

        for compression in [Compression::Gzip, Compression::Uncompressed].iter() {
            let file = NamedTempFile::new().unwrap();
            write_file(file.path(), &root, *compression).unwrap();

            assert_eq!(parse_file(file.path()).unwrap(), root);
        }
    }
}
