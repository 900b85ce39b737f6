//! Values held by graph nodes.
//!
//! A [`Value`] is a primitive, an opaque [`Atom`], or a handle to a
//! container node. The tag is decided once when a value enters the graph;
//! later passes never re-derive whether something is a plain object.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::node::NodeId;

/// A value that can be stored in a mapping field or sequence slot.
///
/// `PartialEq` is strict equality: numbers compare by IEEE equality (so
/// `NaN != NaN`), nodes compare by identity and atoms by identity (dates by
/// instant).
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Absent value.
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    Bool(bool),
    /// Double-precision number.
    Number(f64),
    String(String),
    /// Opaque leaf that is never cloned or merged into.
    Atom(Atom),
    /// Reference to a mapping or sequence node.
    Node(NodeId),
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the node handle if this value references a container.
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Value::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    /// True for primitives and functions: the values compared with strict
    /// equality rather than by serialized form.
    pub fn is_primitive(&self) -> bool {
        !matches!(
            self,
            Value::Node(_) | Value::Atom(Atom::Date(_)) | Value::Atom(Atom::Opaque(_))
        )
    }

    /// Truthiness under the usual loose rules: `undefined`, `null`, `false`,
    /// `0`, `NaN` and `""` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Atom(_) | Value::Node(_) => true,
        }
    }

    /// Short type name used in error messages. Nodes report `"node"`; use
    /// [`Graph::describe`](crate::Graph::describe) to tell mappings from
    /// sequences.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Atom(atom) => atom.type_name(),
            Value::Node(_) => "node",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Value::Node(id)
    }
}

impl From<Atom> for Value {
    fn from(atom: Atom) -> Self {
        Value::Atom(atom)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(date: DateTime<Utc>) -> Self {
        Value::Atom(Atom::Date(date))
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::Atom(Atom::Function(function))
    }
}

/// Leaf values with identity or internal structure the graph does not model.
#[derive(Clone, Debug, PartialEq)]
pub enum Atom {
    /// A point in time.
    Date(DateTime<Utc>),
    /// A callable.
    Function(Function),
    /// Any other host object (class instance, handle, ...).
    Opaque(Opaque),
}

impl Atom {
    pub fn type_name(&self) -> &'static str {
        match self {
            Atom::Date(_) => "date",
            Atom::Function(_) => "function",
            Atom::Opaque(_) => "opaque",
        }
    }
}

type NativeFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// A shared callable. Clones refer to the same function.
#[derive(Clone)]
pub struct Function {
    name: Arc<str>,
    body: Arc<NativeFn>,
}

impl Function {
    pub fn new<F>(name: &str, body: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.body)(args)
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name)
    }
}

/// A type-erased host object carried by reference.
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            payload: Arc::new(payload),
        }
    }

    /// Rust type name of the wrapped payload.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.type_name)
    }
}
