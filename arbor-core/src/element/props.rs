//! Element Properties
//!
//! Props are an ordered mapping from names to loosely-typed values, plus the
//! element's normalized children. Children live in their own slot so the host
//! layer never sees them as an attribute.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::Element;
use crate::host::Event;

/// A callable event listener.
///
/// Two handlers are equal only if they share the same allocation, so a closure
/// created on every render counts as a changed prop.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    /// Wrap a closure as an event handler.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Event) + 'static,
    {
        Self(Rc::new(handler))
    }

    /// Invoke the handler.
    pub fn call(&self, event: &Event) {
        (self.0)(event);
    }

    /// Whether both handles point at the same closure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0))
    }
}

/// A single property value.
#[derive(Clone)]
pub enum PropValue {
    /// Explicit absence.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Nested mapping, e.g. an inline style object.
    Map(IndexMap<String, PropValue>),
    List(Vec<PropValue>),
    /// An event listener or any other callback.
    Handler(EventHandler),
    /// An element passed through props (render props, slots).
    Element(Element),
    /// Arbitrary application data, compared by identity.
    Opaque(Rc<dyn Any>),
}

impl PropValue {
    /// Wrap arbitrary application data.
    pub fn opaque<T: 'static>(value: T) -> Self {
        Self::Opaque(Rc::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Handler(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, PropValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            Self::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Borrow opaque application data as `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Opaque(value) => value.downcast_ref(),
            _ => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => a == b,
            (Self::Element(a), Self::Element(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Map(map) => f.debug_map().entries(map.iter()).finish(),
            Self::List(items) => f.debug_list().entries(items.iter()).finish(),
            Self::Handler(handler) => fmt::Debug::fmt(handler, f),
            Self::Element(element) => fmt::Debug::fmt(element, f),
            Self::Opaque(value) => write!(f, "Opaque({:p})", Rc::as_ptr(value)),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or(Self::Float(value as f64), Self::Int)
    }
}

impl From<f32> for PropValue {
    fn from(value: f32) -> Self {
        Self::Float(value.into())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        Self::Handler(value)
    }
}

impl From<Element> for PropValue {
    fn from(value: Element) -> Self {
        Self::Element(value)
    }
}

impl From<IndexMap<String, PropValue>> for PropValue {
    fn from(value: IndexMap<String, PropValue>) -> Self {
        Self::Map(value)
    }
}

impl From<Vec<PropValue>> for PropValue {
    fn from(value: Vec<PropValue>) -> Self {
        Self::List(value)
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for PropValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Value::String(s) => Self::Str(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// The property mapping of an element.
#[derive(Clone, Default, PartialEq)]
pub struct Props {
    values: IndexMap<String, PropValue>,
    children: Vec<Element>,
}

impl Props {
    /// Create an empty property mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// ```rust
    /// use arbor_core::Props;
    ///
    /// let props = Props::new().with("className", "card").with("width", 150);
    /// assert_eq!(props.get("className").and_then(|v| v.as_str()), Some("card"));
    /// ```
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Register an event handler under `name` (e.g. `onClick`).
    pub fn on<F>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Event) + 'static,
    {
        self.with(name, EventHandler::new(handler))
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Option<PropValue> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterate over named values in insertion order. Children are not included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of named values, not counting children.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The normalized child elements.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub(crate) fn set_children(&mut self, children: Vec<Element>) {
        self.children = children;
    }

    /// Compare named values only, ignoring children.
    pub fn same_values(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        map.entries(self.values.iter());
        if !self.children.is_empty() {
            map.entry(&"children", &self.children);
        }
        map.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Props
where
    K: Into<String>,
    V: Into<PropValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            children: Vec::new(),
        }
    }
}
