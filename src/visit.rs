//! Depth first traversal of documents.
use crate::node::{Data, Node};
use crate::tag::TagKind;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Whether a traversal descends into the entered node.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Walk {
    Continue,
    /// Skips the children of the node and its `leave` call.
    Skip,
}

/// Callbacks of a depth first traversal.
///
/// `path` holds the names from the root down to the visited node, the root
/// itself having an empty path.
pub trait Visitor {
    type Output;

    fn enter(&mut self, _path: &[String], _name: &str, _node: &Node) -> Walk {
        Walk::Continue
    }

    fn leave(&mut self, _path: &[String], _name: &str, _node: &Node) {}

    fn close(self) -> Self::Output;
}

fn walk<V: Visitor>(node: &Node, name: &str, path: &mut Vec<String>, visitor: &mut V) {
    if visitor.enter(path, name, node) == Walk::Skip {
        return;
    }

    for (child_name, child) in node.children() {
        path.push(child_name.clone());
        walk(&child, &child_name, path, visitor);
        path.pop();
    }

    visitor.leave(path, name, node);
}

impl Node {
    /// Named children in traversal order.
    ///
    /// Compound entries are sorted by name, list items and array elements
    /// are named by their index.
    pub fn children(&self) -> Vec<(String, Node)> {
        match self.kind() {
            TagKind::Compound => {
                let mut entries = self.entries();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                entries
            }
            TagKind::List => self
                .items()
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item.value()))
                .collect(),
            kind if kind.is_array() => {
                let element = match self.bits() {
                    Some(_) => TagKind::Long,
                    None => kind.element().unwrap_or(TagKind::Long),
                };

                self.elements()
                    .unwrap_or_default()
                    .into_iter()
                    .enumerate()
                    .map(|(index, value)| {
                        let node =
                            Node::from_data(element, None, Data::Value(Value::Integer(value)));
                        (index.to_string(), node)
                    })
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn visit<V: Visitor>(&self, mut visitor: V) -> V::Output {
        let mut path = Vec::new();
        walk(self, "", &mut path, &mut visitor);

        visitor.close()
    }

    /// Converts the document into native values.
    ///
    /// Returns `None` for an `End` tag.
    pub fn export(&self) -> Option<Native> {
        self.visit(Exporter::new())
    }

    /// Like [`Node::export`], keeping only the named top level entries.
    pub fn export_scoped(&self, names: &[&str]) -> Option<Native> {
        self.visit(Exporter::scoped(names.iter().copied()))
    }

    /// Indented human readable listing of the document.
    pub fn dump(&self) -> String {
        self.visit(Dump::default())
    }
}

/// Native form of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Native {
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<i64>),
    List(Vec<Native>),
    Compound(BTreeMap<String, Native>),
}

impl From<Value> for Native {
    fn from(value: Value) -> Self {
        match value {
            Value::Integer(v) => Native::Integer(v),
            Value::Float(v) => Native::Float(v),
            Value::String(v) => Native::String(v),
        }
    }
}

enum Frame {
    List(Vec<Native>),
    Compound(BTreeMap<String, Native>),
}

/// Builds the [`Native`] form of the visited document.
#[derive(Default)]
pub struct Exporter {
    stack: Vec<Frame>,
    result: Option<Native>,
    scope: Option<Vec<String>>,
}

impl Exporter {
    pub fn new() -> Exporter {
        Exporter::default()
    }

    /// Exports only the top level entries named in `names`.
    pub fn scoped<I, S>(names: I) -> Exporter
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Exporter {
            scope: Some(names.into_iter().map(Into::into).collect()),
            ..Exporter::default()
        }
    }

    fn emit(&mut self, name: &str, value: Native) {
        match self.stack.last_mut() {
            Some(Frame::List(items)) => items.push(value),
            Some(Frame::Compound(entries)) => {
                entries.insert(name.to_owned(), value);
            }
            None => self.result = Some(value),
        }
    }
}

impl Visitor for Exporter {
    type Output = Option<Native>;

    fn enter(&mut self, path: &[String], name: &str, node: &Node) -> Walk {
        if let Some(scope) = &self.scope {
            if path.len() == 1 && !scope.iter().any(|entry| entry == name) {
                return Walk::Skip;
            }
        }

        match node.kind() {
            TagKind::End => Walk::Skip,
            TagKind::List => {
                self.stack.push(Frame::List(Vec::new()));
                Walk::Continue
            }
            TagKind::Compound => {
                self.stack.push(Frame::Compound(BTreeMap::new()));
                Walk::Continue
            }
            kind if kind.is_array() => {
                self.emit(name, Native::Array(node.elements().unwrap_or_default()));
                Walk::Skip
            }
            _ => {
                if let Some(value) = node.scalar() {
                    self.emit(name, value.into());
                }

                Walk::Skip
            }
        }
    }

    fn leave(&mut self, _path: &[String], name: &str, _node: &Node) {
        let value = match self.stack.pop() {
            Some(Frame::List(items)) => Native::List(items),
            Some(Frame::Compound(entries)) => Native::Compound(entries),
            None => return,
        };

        self.emit(name, value);
    }

    fn close(self) -> Option<Native> {
        self.result
    }
}

/// Renders one line per tag, indented by depth.
#[derive(Default)]
pub struct Dump {
    out: String,
}

impl Visitor for Dump {
    type Output = String;

    fn enter(&mut self, path: &[String], name: &str, node: &Node) -> Walk {
        let kind = node.kind();
        let _ = write!(self.out, "{:indent$}{}: {}", "", name, kind, indent = path.len() * 2);

        let walk = match kind {
            TagKind::List | TagKind::Compound => {
                let _ = write!(self.out, " ({} entries)", node.len());
                Walk::Continue
            }
            kind if kind.is_array() => {
                let _ = write!(self.out, " {:?}", node.elements().unwrap_or_default());
                Walk::Skip
            }
            _ => {
                match node.scalar() {
                    Some(Value::Integer(v)) => {
                        let _ = write!(self.out, " = {}", v);
                    }
                    Some(Value::Float(v)) => {
                        let _ = write!(self.out, " = {}", v);
                    }
                    Some(Value::String(v)) => {
                        let _ = write!(self.out, " = {:?}", v);
                    }
                    None => {}
                }

                Walk::Skip
            }
        };

        self.out.push('\n');

        walk
    }

    fn close(self) -> String {
        self.out
    }
}
