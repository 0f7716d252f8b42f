//! Mutable NBT document graph.
//!
//! A [`Node`] is a shared handle. Composites own their children through
//! strong handles while every child keeps weak links back to each composite
//! it belongs to, so a node may sit under several parents at once and
//! parents never keep a node alive.
//!
//! Parsed nodes keep the exact bytes they were read from as a payload cache.
//! Any mutation clears the cache of the mutated node and of all its
//! ancestors, and writing falls back to a fresh encoding only for the
//! branches that lost their cache.
use crate::bitpack;
use crate::error::NbtError;
use crate::read;
use crate::tag::{TagKind, ValueClass};
use crate::value::Value;
use bytes::Bytes;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Invalidation stamp shared by every document of the process.
///
/// A traversal only compares stamps against the value it drew itself,
/// so independent documents never observe each other's stamps.
static VERSION: AtomicU64 = AtomicU64::new(0);

pub(crate) enum Data {
    End,
    /// Undecoded payload, replaced by its decoded form on first access.
    Proxy(Bytes),
    Value(Value),
    Array(Vec<i64>),
    BitPack { nbits: u32, words: Vec<u64> },
    List { child: TagKind, items: Vec<Node> },
    Compound(Vec<(String, Node)>),
}

pub(crate) struct Inner {
    pub(crate) kind: TagKind,
    pub(crate) payload: Option<Bytes>,
    parents: Vec<Weak<RefCell<Inner>>>,
    version: u64,
    pub(crate) data: Data,
}

/// Shared handle on a tag of an NBT document.
#[derive(Clone)]
pub struct Node(pub(crate) Rc<RefCell<Inner>>);

fn check_integer(kind: TagKind, value: i64) -> Result<(), NbtError> {
    let (min, max) = kind.integer_range().ok_or(NbtError::WrongKind {
        expected: "integer tag",
        found: kind,
    })?;

    if value < min || value > max {
        return Err(NbtError::ValueOutOfRange { kind, value });
    }

    Ok(())
}

/// Whether a tag of type `kind` can hold `value` without changing class.
fn accepts(kind: TagKind, value: &Value) -> bool {
    match value {
        Value::Integer(_) => kind.is_integer() || kind.is_float(),
        Value::Float(_) => kind.is_float(),
        Value::String(_) => kind == TagKind::String,
    }
}

impl Node {
    pub(crate) fn from_data(kind: TagKind, payload: Option<Bytes>, data: Data) -> Node {
        Node(Rc::new(RefCell::new(Inner {
            kind,
            payload,
            parents: Vec::new(),
            version: 0,
            data,
        })))
    }

    pub(crate) fn proxy(kind: TagKind, raw: Bytes) -> Node {
        Node::from_data(kind, Some(raw.clone()), Data::Proxy(raw))
    }

    pub(crate) fn end() -> Node {
        Node::from_data(TagKind::End, None, Data::End)
    }

    /// Integer tag of any integer type, range checked.
    pub fn integer(kind: TagKind, value: i64) -> Result<Node, NbtError> {
        check_integer(kind, value)?;

        Ok(Node::from_data(kind, None, Data::Value(Value::Integer(value))))
    }

    /// Scalar tag of type `kind` holding `value`.
    pub fn scalar_of(kind: TagKind, value: Value) -> Result<Node, NbtError> {
        match (kind.descriptor().value, value) {
            (ValueClass::Integer, Value::Integer(v)) => Node::integer(kind, v),
            (ValueClass::Float, Value::Integer(v)) => Ok(Node::from_data(
                kind,
                None,
                Data::Value(Value::Float(v as f64)),
            )),
            (ValueClass::Float, value @ Value::Float(_))
            | (ValueClass::String, value @ Value::String(_)) => {
                Ok(Node::from_data(kind, None, Data::Value(value)))
            }
            _ => Err(NbtError::WrongKind {
                expected: "scalar tag",
                found: kind,
            }),
        }
    }

    pub fn byte(value: i8) -> Node {
        Node::from_data(TagKind::Byte, None, Data::Value(Value::Integer(value.into())))
    }

    pub fn short(value: i16) -> Node {
        Node::from_data(TagKind::Short, None, Data::Value(Value::Integer(value.into())))
    }

    pub fn int(value: i32) -> Node {
        Node::from_data(TagKind::Int, None, Data::Value(Value::Integer(value.into())))
    }

    pub fn long(value: i64) -> Node {
        Node::from_data(TagKind::Long, None, Data::Value(Value::Integer(value)))
    }

    pub fn float(value: f32) -> Node {
        Node::from_data(TagKind::Float, None, Data::Value(Value::Float(value.into())))
    }

    pub fn double(value: f64) -> Node {
        Node::from_data(TagKind::Double, None, Data::Value(Value::Float(value)))
    }

    pub fn string<S: Into<String>>(value: S) -> Node {
        Node::from_data(
            TagKind::String,
            None,
            Data::Value(Value::String(value.into())),
        )
    }

    pub fn byte_array(values: Vec<i8>) -> Node {
        let values = values.into_iter().map(i64::from).collect();

        Node::from_data(TagKind::ByteArray, None, Data::Array(values))
    }

    pub fn int_array(values: Vec<i32>) -> Node {
        let values = values.into_iter().map(i64::from).collect();

        Node::from_data(TagKind::IntArray, None, Data::Array(values))
    }

    pub fn long_array(values: Vec<i64>) -> Node {
        Node::from_data(TagKind::LongArray, None, Data::Array(values))
    }

    /// Long array whose elements are `nbits` wide fields packed into 64 bits words.
    pub fn bit_pack(nbits: u32, fields: &[u64]) -> Result<Node, NbtError> {
        let words = bitpack::pack(64, nbits, fields)?;

        Ok(Node::from_data(
            TagKind::LongArray,
            None,
            Data::BitPack { nbits, words },
        ))
    }

    /// Empty list of `child` tags.
    pub fn list(child: TagKind) -> Node {
        Node::from_data(
            TagKind::List,
            None,
            Data::List {
                child,
                items: Vec::new(),
            },
        )
    }

    pub fn compound() -> Node {
        Node::from_data(TagKind::Compound, None, Data::Compound(Vec::new()))
    }

    pub fn kind(&self) -> TagKind {
        self.0.borrow().kind
    }

    /// Whether the node still holds undecoded bytes.
    pub fn is_proxy(&self) -> bool {
        matches!(self.0.borrow().data, Data::Proxy(_))
    }

    pub fn is_cached(&self) -> bool {
        self.0.borrow().payload.is_some()
    }

    /// Cached encoded payload, without tag id and name.
    pub fn payload(&self) -> Option<Bytes> {
        self.0.borrow().payload.clone()
    }

    /// Stamp of the last invalidation that reached this node.
    pub fn version(&self) -> u64 {
        self.0.borrow().version
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Composites currently holding this node.
    pub fn parents(&self) -> Vec<Node> {
        self.0
            .borrow()
            .parents
            .iter()
            .filter_map(Weak::upgrade)
            .map(Node)
            .collect()
    }

    pub(crate) fn materialize(&self) {
        let raw = match &self.0.borrow().data {
            Data::Proxy(raw) => raw.clone(),
            _ => return,
        };

        let data = read::decode(self.kind(), &raw);
        self.0.borrow_mut().data = data;
    }

    /// Decodes a proxy in place and returns the node itself.
    ///
    /// Decoding happens once, every later call returns the same node.
    pub fn value(&self) -> Node {
        self.materialize();
        self.clone()
    }

    /// Decoded scalar, `None` for arrays and composites.
    pub fn scalar(&self) -> Option<Value> {
        self.materialize();

        match &self.0.borrow().data {
            Data::Value(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.scalar()?.as_i64()
    }

    /// Numeric value of an integer or floating point tag.
    pub fn as_f64(&self) -> Option<f64> {
        self.scalar()?.as_f64()
    }

    pub fn as_string(&self) -> Option<String> {
        match self.scalar()? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of an array or of a bit pack.
    pub fn elements(&self) -> Option<Vec<i64>> {
        self.materialize();

        match &self.0.borrow().data {
            Data::Array(values) => Some(values.clone()),
            Data::BitPack { nbits, words } => bitpack::unpack(*nbits, 64, words)
                .ok()
                .map(|fields| fields.into_iter().map(|field| field as i64).collect()),
            _ => None,
        }
    }

    /// Field width of a bit pack.
    pub fn bits(&self) -> Option<u32> {
        match &self.0.borrow().data {
            Data::BitPack { nbits, .. } => Some(*nbits),
            _ => None,
        }
    }

    /// Number of entries, items or elements.
    pub fn len(&self) -> usize {
        self.materialize();

        match &self.0.borrow().data {
            Data::Array(values) => values.len(),
            Data::BitPack { nbits, words } => words.len() * 64 / *nbits as usize,
            Data::List { items, .. } => items.len(),
            Data::Compound(entries) => entries.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn expect(&self, kind: TagKind) -> Result<(), NbtError> {
        let found = self.kind();

        if found != kind {
            return Err(NbtError::WrongKind {
                expected: kind.descriptor().name,
                found,
            });
        }

        Ok(())
    }

    /// Clears the payload cache of this node and of every ancestor.
    ///
    /// Descendants keep their cache. Each node is visited at most once per
    /// call even when it is reachable through several parents.
    pub fn invalidate(&self) {
        let version = VERSION.fetch_add(1, Ordering::Relaxed) + 1;
        let mut queue = vec![self.0.clone()];

        while let Some(link) = queue.pop() {
            let mut inner = link.borrow_mut();

            if inner.version == version {
                continue;
            }

            inner.version = version;
            inner.payload = None;
            inner.parents.retain(|parent| parent.strong_count() > 0);
            queue.extend(inner.parents.iter().filter_map(Weak::upgrade));
        }
    }

    /// Whether `candidate` is this node or one of its ancestors.
    fn has_ancestor_or_self(&self, candidate: &Node) -> bool {
        let mut seen = HashSet::new();
        let mut queue = vec![self.0.clone()];

        while let Some(link) = queue.pop() {
            if Rc::ptr_eq(&link, &candidate.0) {
                return true;
            }

            if !seen.insert(Rc::as_ptr(&link)) {
                continue;
            }

            queue.extend(link.borrow().parents.iter().filter_map(Weak::upgrade));
        }

        false
    }

    /// Registers `parent` as holding this node.
    fn attach(&self, parent: &Node) -> Result<(), NbtError> {
        if parent.has_ancestor_or_self(self) {
            return Err(NbtError::CircularReference);
        }

        self.attach_parsed(parent);

        Ok(())
    }

    /// Registers `parent` without the cycle check, for freshly parsed children.
    pub(crate) fn attach_parsed(&self, parent: &Node) {
        self.0.borrow_mut().parents.push(Rc::downgrade(&parent.0));
    }

    /// Drops one membership of this node in `parent`.
    fn detach(&self, parent: &Node) {
        let mut inner = self.0.borrow_mut();
        let target = Rc::as_ptr(&parent.0);

        if let Some(index) = inner.parents.iter().position(|p| p.as_ptr() == target) {
            inner.parents.swap_remove(index);
        }
    }

    fn with_entries<R>(
        &self,
        f: impl FnOnce(&mut Vec<(String, Node)>) -> R,
    ) -> Result<R, NbtError> {
        let mut inner = self.0.borrow_mut();
        let found = inner.kind;

        match &mut inner.data {
            Data::Compound(entries) => Ok(f(entries)),
            _ => Err(NbtError::WrongKind {
                expected: "Compound",
                found,
            }),
        }
    }

    fn with_items<R>(&self, f: impl FnOnce(&mut TagKind, &mut Vec<Node>) -> R) -> Result<R, NbtError> {
        let mut inner = self.0.borrow_mut();
        let found = inner.kind;

        match &mut inner.data {
            Data::List { child, items } => Ok(f(child, items)),
            _ => Err(NbtError::WrongKind {
                expected: "List",
                found,
            }),
        }
    }

    fn with_array<R>(&self, f: impl FnOnce(&mut Vec<i64>) -> R) -> Result<R, NbtError> {
        self.materialize();

        let mut inner = self.0.borrow_mut();
        let found = inner.kind;

        match &mut inner.data {
            Data::Array(values) => Ok(f(values)),
            _ => Err(NbtError::WrongKind {
                expected: "resizable array",
                found,
            }),
        }
    }

    // Compound.

    /// Child stored under `name`, decoded.
    pub fn get(&self, name: &str) -> Option<Node> {
        let child = match &self.0.borrow().data {
            Data::Compound(entries) => entries
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, node)| node.clone()),
            _ => None,
        }?;

        child.materialize();

        Some(child)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        match &self.0.borrow().data {
            Data::Compound(entries) => entries.iter().any(|(key, _)| key == name),
            _ => false,
        }
    }

    /// Names of a compound in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.entries().into_iter().map(|(name, _)| name).collect()
    }

    /// Entries of a compound in insertion order.
    pub fn entries(&self) -> Vec<(String, Node)> {
        match &self.0.borrow().data {
            Data::Compound(entries) => entries.clone(),
            _ => Vec::new(),
        }
    }

    /// Stores `child` under `name`, returning the replaced child.
    ///
    /// Fails without touching the document when `child` is this compound or
    /// one of its ancestors.
    pub fn set(&self, name: &str, child: Node) -> Result<Option<Node>, NbtError> {
        self.expect(TagKind::Compound)?;
        child.attach(self)?;
        self.invalidate();

        let previous = self.with_entries(|entries| {
            match entries.iter_mut().find(|(key, _)| key == name) {
                Some((_, slot)) => Some(mem::replace(slot, child)),
                None => {
                    entries.push((name.to_owned(), child));
                    None
                }
            }
        })?;

        if let Some(previous) = &previous {
            previous.detach(self);
        }

        Ok(previous)
    }

    /// Stores a native value under `name`.
    ///
    /// A value replacing a scalar of a compatible class keeps the tag type
    /// of the replaced scalar, otherwise the type is inferred from the value.
    pub fn set_value<V: Into<Value>>(&self, name: &str, value: V) -> Result<(), NbtError> {
        let value = value.into();
        let kind = match self.get(name) {
            Some(old) if accepts(old.kind(), &value) => old.kind(),
            _ => value.default_kind(),
        };

        self.set(name, Node::scalar_of(kind, value)?)?;

        Ok(())
    }

    pub fn remove(&self, name: &str) -> Result<Option<Node>, NbtError> {
        self.expect(TagKind::Compound)?;

        if !self.contains_key(name) {
            return Ok(None);
        }

        self.invalidate();

        let removed = self.with_entries(|entries| {
            entries
                .iter()
                .position(|(key, _)| key == name)
                .map(|index| entries.remove(index).1)
        })?;

        if let Some(removed) = &removed {
            removed.detach(self);
        }

        Ok(removed)
    }

    // List.

    /// Tag type shared by the items of a list.
    pub fn child_kind(&self) -> Option<TagKind> {
        match &self.0.borrow().data {
            Data::List { child, .. } => Some(*child),
            _ => None,
        }
    }

    /// Item at `index`, decoded.
    pub fn item(&self, index: usize) -> Option<Node> {
        let item = match &self.0.borrow().data {
            Data::List { items, .. } => items.get(index).cloned(),
            _ => None,
        }?;

        item.materialize();

        Some(item)
    }

    pub fn items(&self) -> Vec<Node> {
        match &self.0.borrow().data {
            Data::List { items, .. } => items.clone(),
            _ => Vec::new(),
        }
    }

    fn check_item(&self, item: &Node) -> Result<(), NbtError> {
        let (expected, empty) = match &self.0.borrow().data {
            Data::List { child, items } => (*child, items.is_empty()),
            _ => {
                return Err(NbtError::WrongKind {
                    expected: "List",
                    found: self.kind(),
                })
            }
        };
        let found = item.kind();

        // An untyped empty list adopts the type of its first item.
        let adopt = expected == TagKind::End && empty;

        if found == TagKind::End || (found != expected && !adopt) {
            return Err(NbtError::ListTypeMismatch { expected, found });
        }

        Ok(())
    }

    /// Replaces the item at `index`, returning the previous item.
    pub fn set_item(&self, index: usize, item: Node) -> Result<Node, NbtError> {
        self.check_item(&item)?;

        let len = self.len();

        if index >= len {
            return Err(NbtError::IndexOutOfBounds { index, len });
        }

        item.attach(self)?;
        self.invalidate();

        let previous = self.with_items(|_, items| mem::replace(&mut items[index], item))?;
        previous.detach(self);

        Ok(previous)
    }

    pub fn insert(&self, index: usize, item: Node) -> Result<(), NbtError> {
        self.check_item(&item)?;

        let len = self.len();

        if index > len {
            return Err(NbtError::IndexOutOfBounds { index, len });
        }

        item.attach(self)?;
        self.invalidate();

        self.with_items(|child, items| {
            if *child == TagKind::End {
                *child = item.kind();
            }

            items.insert(index, item);
        })
    }

    pub fn push(&self, item: Node) -> Result<(), NbtError> {
        self.insert(self.len(), item)
    }

    pub fn remove_item(&self, index: usize) -> Result<Node, NbtError> {
        self.expect(TagKind::List)?;

        let len = self.len();

        if index >= len {
            return Err(NbtError::IndexOutOfBounds { index, len });
        }

        self.invalidate();

        let removed = self.with_items(|_, items| items.remove(index))?;
        removed.detach(self);

        Ok(removed)
    }

    // Arrays and bit packs.

    pub fn element(&self, index: usize) -> Option<i64> {
        self.materialize();

        match &self.0.borrow().data {
            Data::Array(values) => values.get(index).copied(),
            Data::BitPack { nbits, words } => {
                if index < words.len() * 64 / *nbits as usize {
                    Some(bitpack::read_field(words, *nbits, index) as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn check_element(&self, value: i64) -> Result<(), NbtError> {
        let kind = self.kind();

        match (&self.0.borrow().data, kind.element()) {
            // 64 bits wide fields read back as any i64.
            (Data::BitPack { nbits: 64, .. }, _) => Ok(()),
            (Data::BitPack { nbits, .. }, _) => {
                if value < 0 || !bitpack::fits(value as u64, *nbits) {
                    return Err(NbtError::ValueOutOfRange { kind, value });
                }

                Ok(())
            }
            (Data::Array(_), Some(element)) => check_integer(element, value),
            _ => Err(NbtError::WrongKind {
                expected: "array",
                found: kind,
            }),
        }
    }

    pub fn set_element(&self, index: usize, value: i64) -> Result<(), NbtError> {
        self.materialize();
        self.check_element(value)?;

        let len = self.len();

        if index >= len {
            return Err(NbtError::IndexOutOfBounds { index, len });
        }

        self.invalidate();

        let mut inner = self.0.borrow_mut();

        match &mut inner.data {
            Data::Array(values) => values[index] = value,
            Data::BitPack { nbits, words } => {
                bitpack::write_field(words, *nbits, index, value as u64)
            }
            _ => {}
        }

        Ok(())
    }

    pub fn insert_element(&self, index: usize, value: i64) -> Result<(), NbtError> {
        self.materialize();
        self.check_element(value)?;

        let len = self.len();

        if index > len {
            return Err(NbtError::IndexOutOfBounds { index, len });
        }

        if self.bits().is_some() {
            return Err(NbtError::WrongKind {
                expected: "resizable array",
                found: self.kind(),
            });
        }

        self.invalidate();
        self.with_array(|values| values.insert(index, value))
    }

    pub fn push_element(&self, value: i64) -> Result<(), NbtError> {
        self.insert_element(self.len(), value)
    }

    pub fn remove_element(&self, index: usize) -> Result<i64, NbtError> {
        self.materialize();

        if self.bits().is_some() || !self.kind().is_array() {
            return Err(NbtError::WrongKind {
                expected: "resizable array",
                found: self.kind(),
            });
        }

        let len = self.len();

        if index >= len {
            return Err(NbtError::IndexOutOfBounds { index, len });
        }

        self.invalidate();
        self.with_array(|values| values.remove(index))
    }

    /// Views a long array as `nbits` wide packed fields.
    ///
    /// The returned node is detached and shares the cached payload of the
    /// array, since both encode to the same bytes.
    pub fn unpack_bits(&self, nbits: u32) -> Result<Node, NbtError> {
        self.expect(TagKind::LongArray)?;

        let words: Vec<u64> = self
            .elements()
            .unwrap_or_default()
            .into_iter()
            .map(|word| word as u64)
            .collect();

        // Rejects word counts that do not hold a whole number of fields.
        bitpack::unpack(nbits, 64, &words)?;

        Ok(Node::from_data(
            TagKind::LongArray,
            self.payload(),
            Data::BitPack { nbits, words },
        ))
    }

    /// Changes the field width of a bit pack, keeping every field value.
    pub fn reshape(&self, new_bits: u32) -> Result<(), NbtError> {
        let (old_bits, words) = match &self.0.borrow().data {
            Data::BitPack { nbits, words } => (*nbits, words.clone()),
            _ => {
                return Err(NbtError::WrongKind {
                    expected: "bit pack",
                    found: self.kind(),
                })
            }
        };

        let reshaped = bitpack::reshape(&words, 64, old_bits, new_bits)?;
        self.invalidate();

        if let Data::BitPack { nbits, words } = &mut self.0.borrow_mut().data {
            *nbits = new_bits;
            *words = reshaped;
        }

        Ok(())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();

        write!(f, "{}", inner.kind)?;

        if inner.payload.is_some() {
            f.write_str("(cached)")?;
        }

        match &inner.data {
            Data::End => Ok(()),
            Data::Proxy(raw) => write!(f, " <{} bytes>", raw.len()),
            Data::Value(value) => write!(f, " {:?}", value),
            Data::Array(values) => write!(f, " {:?}", values),
            Data::BitPack { nbits, words } => {
                write!(f, " <{} bits in {} words>", nbits, words.len())
            }
            Data::List { items, .. } => {
                f.write_str(" ")?;
                f.debug_list().entries(items.iter()).finish()
            }
            Data::Compound(entries) => {
                f.write_str(" ")?;
                f.debug_map()
                    .entries(entries.iter().map(|(name, node)| (name, node)))
                    .finish()
            }
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Node) -> bool {
        if self.ptr_eq(other) {
            return true;
        }

        if let (Some(a), Some(b)) = (self.scalar(), other.scalar()) {
            return a == b;
        }

        if let (Some(a), Some(b)) = (self.elements(), other.elements()) {
            return a == b;
        }

        match (self.kind(), other.kind()) {
            (TagKind::List, TagKind::List) => self.items() == other.items(),
            (TagKind::Compound, TagKind::Compound) => {
                let entries = self.entries();

                entries.len() == other.len()
                    && entries
                        .iter()
                        .all(|(name, node)| other.get(name).map_or(false, |o| *node == o))
            }
            (TagKind::End, TagKind::End) => true,
            _ => false,
        }
    }
}

impl PartialEq<i64> for Node {
    fn eq(&self, other: &i64) -> bool {
        self.scalar().map_or(false, |value| value == *other)
    }
}

impl PartialEq<i32> for Node {
    fn eq(&self, other: &i32) -> bool {
        *self == i64::from(*other)
    }
}

impl PartialEq<f64> for Node {
    fn eq(&self, other: &f64) -> bool {
        self.scalar().map_or(false, |value| value == *other)
    }
}

impl PartialEq<&str> for Node {
    fn eq(&self, other: &&str) -> bool {
        self.scalar().map_or(false, |value| value == *other)
    }
}

impl From<i8> for Node {
    fn from(value: i8) -> Self {
        Node::byte(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::byte(value as i8)
    }
}

impl From<i16> for Node {
    fn from(value: i16) -> Self {
        Node::short(value)
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Node::int(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::long(value)
    }
}

impl From<f32> for Node {
    fn from(value: f32) -> Self {
        Node::float(value)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::double(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::string(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::string(value)
    }
}
