//! Core types for spark-observable.
//!
//! `Value` is what flows through the object graph: scalars, host handles,
//! callables, reactive cells, and the two node kinds (objects and arrays).
//! Nodes are shared handles; cloning a `Value` never copies a node.

use std::fmt;
use std::rc::Rc;
use std::time::SystemTime;

use regex::Regex;

use crate::cell::Observable;
use crate::graph::{ArrayRef, ObjectRef};

// =============================================================================
// Node Identity
// =============================================================================

/// Identity of an object or array node (its allocation address).
///
/// Only meaningful while the node is alive. The marker table pairs every id
/// with a weak handle so a reused address is never mistaken for the old node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

// =============================================================================
// Function
// =============================================================================

/// A plain callable stored in the graph.
///
/// Plain functions are never converted. Reactive cells are not functions here;
/// they are `Value::Cell`.
#[derive(Clone)]
pub struct Function(Rc<dyn Fn(&[Value]) -> Value>);

impl Function {
    /// Wrap a callable taking positional arguments.
    pub fn new(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Wrap a zero-argument callable (arguments are ignored).
    pub fn getter(f: impl Fn() -> Value + 'static) -> Self {
        Self(Rc::new(move |_: &[Value]| f()))
    }

    /// Wrap a single-argument callable, used for write functions.
    pub fn setter(f: impl Fn(Value) + 'static) -> Self {
        Self(Rc::new(move |args: &[Value]| {
            f(args.first().cloned().unwrap_or(Value::Undefined));
            Value::Undefined
        }))
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

// =============================================================================
// Host Objects
// =============================================================================

/// What kind of externally-owned object a `HostObject` stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostKind {
    /// A UI element owned by the view layer.
    Element,
    /// An object managed by another library (collections, wrappers).
    Foreign,
    /// The reactive system's own namespace object.
    Namespace,
}

/// Opaque handle to something the graph references but must never convert.
#[derive(Clone)]
pub struct HostObject(Rc<HostData>);

struct HostData {
    kind: HostKind,
    label: String,
}

impl HostObject {
    pub fn new(kind: HostKind, label: impl Into<String>) -> Self {
        Self(Rc::new(HostData {
            kind,
            label: label.into(),
        }))
    }

    pub fn element(label: impl Into<String>) -> Self {
        Self::new(HostKind::Element, label)
    }

    pub fn kind(&self) -> HostKind {
        self.0.kind
    }

    pub fn label(&self) -> &str {
        &self.0.label
    }

    pub fn ptr_eq(&self, other: &HostObject) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.0.kind, self.0.label)
    }
}

// =============================================================================
// Value
// =============================================================================

/// Any value reachable in an object graph.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Date(SystemTime),
    RegExp(Regex),
    Function(Function),
    /// A reactive cell stored directly as a value.
    Cell(Observable),
    Host(HostObject),
    Object(ObjectRef),
    Array(ArrayRef),
}

impl Value {
    /// Falsy in the usual dynamic-language sense.
    pub fn is_falsy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => *n == 0.0 || n.is_nan(),
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_cell(&self) -> Option<&Observable> {
        match self {
            Value::Cell(c) => Some(c),
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

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String form used by the default array sort.
    pub fn to_display_string(&self) -> String {
        self.display_with(&mut Vec::new())
    }

    /// `visiting` holds the arrays currently being rendered; a nested
    /// reference to one of them renders as an empty string.
    fn display_with(&self, visiting: &mut Vec<NodeId>) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.to_string(),
            Value::Date(d) => match d.duration_since(SystemTime::UNIX_EPOCH) {
                Ok(elapsed) => elapsed.as_millis().to_string(),
                Err(_) => "Invalid Date".to_string(),
            },
            Value::RegExp(re) => format!("/{}/", re.as_str()),
            Value::Function(_) | Value::Cell(_) => "function".to_string(),
            Value::Host(h) => format!("[object {}]", h.label()),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Array(a) => {
                let id = a.id();
                if visiting.contains(&id) {
                    return String::new();
                }
                visiting.push(id);
                let rendered = a
                    .to_vec()
                    .iter()
                    .map(|v| match v {
                        Value::Undefined | Value::Null => String::new(),
                        other => other.display_with(visiting),
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                visiting.pop();
                rendered
            }
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// Scalars compare by value; nodes, callables, cells and host objects by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::RegExp(a), Value::RegExp(b)) => a.as_str() == b.as_str(),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Cell(a), Value::Cell(b)) => a.ptr_eq(b),
            (Value::Host(a), Value::Host(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

// Shallow on purpose: graphs may be cyclic.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Date(d) => write!(f, "Date({d:?})"),
            Value::RegExp(re) => write!(f, "/{}/", re.as_str()),
            Value::Function(func) => func.fmt(f),
            Value::Cell(cell) => cell.fmt(f),
            Value::Host(host) => host.fmt(f),
            Value::Object(obj) => obj.fmt(f),
            Value::Array(arr) => arr.fmt(f),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Rc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Rc::from(value))
    }
}

impl From<SystemTime> for Value {
    fn from(value: SystemTime) -> Self {
        Value::Date(value)
    }
}

impl From<Regex> for Value {
    fn from(value: Regex) -> Self {
        Value::RegExp(value)
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Self {
        Value::Function(value)
    }
}

impl From<Observable> for Value {
    fn from(value: Observable) -> Self {
        Value::Cell(value)
    }
}

impl From<HostObject> for Value {
    fn from(value: HostObject) -> Self {
        Value::Host(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Object(value)
    }
}

impl From<ArrayRef> for Value {
    fn from(value: ArrayRef) -> Self {
        Value::Array(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
