use std::fmt::{self, Display};

/// Tag type identifier as stored in the first byte of every tag.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum TagKind {
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

/// How the payload of a tag is laid out in the binary stream.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Layout {
    /// No payload at all.
    None,
    /// Fixed size big-endian scalar.
    Atom,
    /// 2 bytes length followed by UTF-8 bytes.
    String,
    /// 4 bytes signed count followed by fixed size elements.
    Array {
        /// Tag kind of a single element.
        element: TagKind,
    },
    /// 1 byte child kind, 4 bytes signed count, unnamed children payloads.
    List,
    /// Named tags terminated by an `End` tag.
    Compound,
}

/// Which kind of decoded value a tag materializes into.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ValueClass {
    None,
    Integer,
    Float,
    String,
    Array,
    List,
    Compound,
}

/// Static description of a tag type.
#[derive(Debug)]
pub struct TagDescriptor {
    pub kind: TagKind,
    pub name: &'static str,
    /// Payload size in bytes, 0 when the payload is variable length.
    pub size: usize,
    pub layout: Layout,
    pub value: ValueClass,
}

macro_rules! descriptor {
    ($kind:ident, $size:expr, $layout:expr, $value:ident) => {
        TagDescriptor {
            kind: TagKind::$kind,
            name: stringify!($kind),
            size: $size,
            layout: $layout,
            value: ValueClass::$value,
        }
    };
}

/// Registry indexed by tag id.
static DESCRIPTORS: [TagDescriptor; 13] = [
    descriptor!(End, 0, Layout::None, None),
    descriptor!(Byte, 1, Layout::Atom, Integer),
    descriptor!(Short, 2, Layout::Atom, Integer),
    descriptor!(Int, 4, Layout::Atom, Integer),
    descriptor!(Long, 8, Layout::Atom, Integer),
    descriptor!(Float, 4, Layout::Atom, Float),
    descriptor!(Double, 8, Layout::Atom, Float),
    descriptor!(ByteArray, 0, Layout::Array { element: TagKind::Byte }, Array),
    descriptor!(String, 0, Layout::String, String),
    descriptor!(List, 0, Layout::List, List),
    descriptor!(Compound, 0, Layout::Compound, Compound),
    descriptor!(IntArray, 0, Layout::Array { element: TagKind::Int }, Array),
    descriptor!(LongArray, 0, Layout::Array { element: TagKind::Long }, Array),
];

impl TagKind {
    pub fn from_id(id: u8) -> Option<TagKind> {
        DESCRIPTORS.get(id as usize).map(|descriptor| descriptor.kind)
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn descriptor(self) -> &'static TagDescriptor {
        &DESCRIPTORS[self as usize]
    }

    /// Element kind of an array tag.
    pub fn element(self) -> Option<TagKind> {
        match self.descriptor().layout {
            Layout::Array { element } => Some(element),
            _ => None,
        }
    }

    pub fn is_integer(self) -> bool {
        self.descriptor().value == ValueClass::Integer
    }

    pub fn is_float(self) -> bool {
        self.descriptor().value == ValueClass::Float
    }

    pub fn is_array(self) -> bool {
        self.descriptor().value == ValueClass::Array
    }

    /// Inclusive range of values an integer tag can hold.
    pub(crate) fn integer_range(self) -> Option<(i64, i64)> {
        match self {
            TagKind::Byte => Some((i8::MIN as i64, i8::MAX as i64)),
            TagKind::Short => Some((i16::MIN as i64, i16::MAX as i64)),
            TagKind::Int => Some((i32::MIN as i64, i32::MAX as i64)),
            TagKind::Long => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

impl Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().name)
    }
}

#[cfg(test)]
mod tests {
    use crate::tag::{Layout, TagKind, ValueClass};

    #[test]
    fn test_registry_is_indexed_by_id() {
        for id in 0..=12u8 {
            let kind = TagKind::from_id(id).unwrap();
            assert_eq!(kind.id(), id);
            assert_eq!(kind.descriptor().kind, kind);
        }

        assert_eq!(TagKind::from_id(13), None);
        assert_eq!(TagKind::from_id(0xFF), None);
    }

    #[test]
    fn test_atom_sizes() {
        assert_eq!(TagKind::Byte.descriptor().size, 1);
        assert_eq!(TagKind::Short.descriptor().size, 2);
        assert_eq!(TagKind::Int.descriptor().size, 4);
        assert_eq!(TagKind::Long.descriptor().size, 8);
        assert_eq!(TagKind::Float.descriptor().size, 4);
        assert_eq!(TagKind::Double.descriptor().size, 8);
        assert_eq!(TagKind::Compound.descriptor().size, 0);
    }

    #[test]
    fn test_array_elements() {
        assert_eq!(TagKind::ByteArray.element(), Some(TagKind::Byte));
        assert_eq!(TagKind::IntArray.element(), Some(TagKind::Int));
        assert_eq!(TagKind::LongArray.element(), Some(TagKind::Long));
        assert_eq!(TagKind::List.element(), None);
        assert_eq!(
            TagKind::LongArray.descriptor().layout,
            Layout::Array {
                element: TagKind::Long
            }
        );
        assert_eq!(TagKind::End.descriptor().value, ValueClass::None);
    }

    #[test]
    fn test_value_classes() {
        for kind in &[TagKind::Byte, TagKind::Short, TagKind::Int, TagKind::Long] {
            assert!(kind.is_integer());
            assert!(!kind.is_float());
        }

        assert!(TagKind::Float.is_float());
        assert!(TagKind::Double.is_float());
        assert!(!TagKind::String.is_integer());
        assert!(!TagKind::LongArray.is_integer());
        assert!(TagKind::LongArray.is_array());
    }
}
