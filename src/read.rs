//! Lazy NBT decoding.
//!
//! Scalars, strings and arrays are only bounds checked while parsing and
//! become proxies over the input buffer. Composites are built eagerly and
//! cache the exact byte range they were read from.
use crate::error::NbtError;
use crate::node::{Data, Node};
use crate::tag::{Layout, TagKind};
use crate::value::Value;
use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;
use flate2::read::GzDecoder;
use log::debug;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Deepest nesting of lists and compounds accepted by the parser.
pub const MAX_DEPTH: usize = 512;

struct Reader<'a> {
    buffer: &'a Bytes,
    position: usize,
    depth: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, length: usize) -> Result<&'a [u8], NbtError> {
        let buffer: &'a Bytes = self.buffer;
        let available = buffer.len().saturating_sub(self.position);

        if length > available {
            return Err(NbtError::Truncated {
                offset: self.position,
                needed: length - available,
            });
        }

        let start = self.position;
        self.position += length;

        Ok(&buffer[start..start + length])
    }

    fn read_u8(&mut self) -> Result<u8, NbtError> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, NbtError> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    fn read_i32(&mut self) -> Result<i32, NbtError> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    fn read_kind(&mut self) -> Result<TagKind, NbtError> {
        let offset = self.position;
        let id = self.read_u8()?;

        TagKind::from_id(id).ok_or(NbtError::UnknownTag { id, offset })
    }

    fn read_str(&mut self) -> Result<&'a str, NbtError> {
        let length = self.read_u16()? as usize;
        let offset = self.position;

        std::str::from_utf8(self.take(length)?).map_err(|_| NbtError::InvalidUtf8 { offset })
    }

    fn slice(&self, start: usize) -> Bytes {
        self.buffer.slice(start..self.position)
    }

    /// Reads a named tag. `End` tags carry no name.
    fn read_tag(&mut self) -> Result<(Node, Option<String>), NbtError> {
        let kind = self.read_kind()?;

        if kind == TagKind::End {
            return Ok((Node::end(), None));
        }

        let name = self.read_str()?.to_owned();
        let node = self.read_payload(kind)?;

        Ok((node, Some(name)))
    }

    fn read_payload(&mut self, kind: TagKind) -> Result<Node, NbtError> {
        let start = self.position;

        match kind.descriptor().layout {
            Layout::None => Ok(Node::end()),
            Layout::Atom => {
                self.take(kind.descriptor().size)?;

                Ok(Node::proxy(kind, self.slice(start)))
            }
            Layout::String => {
                self.read_str()?;

                Ok(Node::proxy(kind, self.slice(start)))
            }
            Layout::Array { element } => {
                let length = self.read_i32()?;

                if length < 0 {
                    return Err(NbtError::NegativeLength {
                        length,
                        offset: start,
                    });
                }

                self.take(length as usize * element.descriptor().size)?;

                Ok(Node::proxy(kind, self.slice(start)))
            }
            Layout::List => self.nested(|reader| reader.read_list(start)),
            Layout::Compound => self.nested(|reader| reader.read_compound(start)),
        }
    }

    fn nested(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<Node, NbtError>,
    ) -> Result<Node, NbtError> {
        if self.depth >= MAX_DEPTH {
            return Err(NbtError::TooDeep {
                offset: self.position,
            });
        }

        self.depth += 1;
        let node = read(self)?;
        self.depth -= 1;

        Ok(node)
    }

    fn read_list(&mut self, start: usize) -> Result<Node, NbtError> {
        let offset = self.position;
        let id = self.read_u8()?;
        let length = self.read_i32()?;

        // Empty lists are accepted whatever child type they declare.
        if length <= 0 {
            let child = TagKind::from_id(id).unwrap_or(TagKind::End);
            let list = Node::list(child);
            list.0.borrow_mut().payload = Some(self.slice(start));

            return Ok(list);
        }

        let child = TagKind::from_id(id).ok_or(NbtError::UnknownTag { id, offset })?;

        if child == TagKind::End {
            return Err(NbtError::WrongKind {
                expected: "list item",
                found: child,
            });
        }

        let list = Node::list(child);
        let remaining = self.buffer.len() - self.position;
        let mut items = Vec::with_capacity((length as usize).min(remaining));

        for _ in 0..length {
            let item = self.read_payload(child)?;
            item.attach_parsed(&list);
            items.push(item);
        }

        {
            let mut inner = list.0.borrow_mut();
            inner.payload = Some(self.slice(start));
            inner.data = Data::List { child, items };
        }

        Ok(list)
    }

    fn read_compound(&mut self, start: usize) -> Result<Node, NbtError> {
        let compound = Node::compound();
        let mut entries = Vec::new();

        loop {
            let (child, name) = self.read_tag()?;

            let name = match name {
                Some(name) => name,
                None => break,
            };

            child.attach_parsed(&compound);
            entries.push((name, child));
        }

        {
            let mut inner = compound.0.borrow_mut();
            inner.payload = Some(self.slice(start));
            inner.data = Data::Compound(entries);
        }

        Ok(compound)
    }
}

/// Decodes a proxy payload previously validated by the parser.
pub(crate) fn decode(kind: TagKind, raw: &[u8]) -> Data {
    match kind {
        TagKind::Byte => Data::Value(Value::Integer(raw[0] as i8 as i64)),
        TagKind::Short => Data::Value(Value::Integer(BigEndian::read_i16(raw) as i64)),
        TagKind::Int => Data::Value(Value::Integer(BigEndian::read_i32(raw) as i64)),
        TagKind::Long => Data::Value(Value::Integer(BigEndian::read_i64(raw))),
        TagKind::Float => Data::Value(Value::Float(BigEndian::read_f32(raw) as f64)),
        TagKind::Double => Data::Value(Value::Float(BigEndian::read_f64(raw))),
        TagKind::String => Data::Value(Value::String(
            String::from_utf8_lossy(&raw[2..]).into_owned(),
        )),
        TagKind::ByteArray | TagKind::IntArray | TagKind::LongArray => {
            let element = kind.element().unwrap_or(TagKind::Byte);
            let values = raw[4..]
                .chunks_exact(element.descriptor().size)
                .map(|item| match element {
                    TagKind::Byte => item[0] as i8 as i64,
                    TagKind::Int => BigEndian::read_i32(item) as i64,
                    _ => BigEndian::read_i64(item),
                })
                .collect();

            Data::Array(values)
        }
        _ => Data::End,
    }
}

/// Parses one named tag of `buffer` starting at `offset`.
///
/// Returns the root node, its name (`None` for an `End` tag) and the offset
/// right after the tag. Decoded nodes share the memory of `buffer`.
pub fn parse(buffer: &Bytes, offset: usize) -> Result<(Node, Option<String>, usize), NbtError> {
    let mut reader = Reader {
        buffer,
        position: offset,
        depth: 0,
    };

    let (node, name) = reader.read_tag()?;

    Ok((node, name, reader.position))
}

/// Copies `data` into a shared buffer and parses its first tag.
pub fn parse_slice(data: &[u8]) -> Result<(Node, Option<String>, usize), NbtError> {
    parse(&Bytes::copy_from_slice(data), 0)
}

/// Reads a whole NBT file, gzip compressed or raw.
///
/// The file must hold exactly one root tag.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Node, NbtError> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let mut decoded = Vec::new();

    let buffer = match GzDecoder::new(&data[..]).read_to_end(&mut decoded) {
        Ok(_) => Bytes::from(decoded),
        Err(_) => {
            debug!(target: "anvil-nbt", "File {} is not gzip compressed, reading raw", path.display());

            Bytes::from(data)
        }
    };

    let (node, _, offset) = parse(&buffer, 0)?;

    if offset != buffer.len() {
        return Err(NbtError::TrailingData {
            offset,
            remaining: buffer.len() - offset,
        });
    }

    Ok(node)
}
