//! Typed readings and path identifiers
//!
//! A [`Value`] is the only thing that moves along graph edges. It is a small
//! `Copy` scalar, so fan-out duplicates it for free and a new reading simply
//! replaces the previous one.
//!
//! Numeric kinds interconvert: an `Int` feeds a float consumer unchanged,
//! and a `Float` feeds an integer consumer when it holds a whole number.
//! Booleans only feed boolean consumers.

use core::fmt;

use heapless::String;

use crate::constants::buffers::MAX_PATH_LEN;
use crate::errors::{GraphError, GraphResult};

/// A single reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// Continuous measurement (distance, level, percentage)
    Float(f32),
    /// Integer code (driver status, counters)
    Int(i32),
    /// Flag (sensor health)
    Bool(bool),
}

/// The kind of a [`Value`], used to type-check graphs before they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValueKind {
    /// Floating point
    Float,
    /// Signed integer
    Int,
    /// Boolean
    Bool,
}

impl ValueKind {
    /// Lowercase name for messages
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Float => "float",
            ValueKind::Int => "int",
            ValueKind::Bool => "bool",
        }
    }

    /// Whether a consumer of this kind can be fed values of kind `found`
    pub const fn accepts(self, found: ValueKind) -> bool {
        match (self, found) {
            (ValueKind::Bool, ValueKind::Bool) => true,
            (ValueKind::Bool, _) | (_, ValueKind::Bool) => false,
            _ => true,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Kind of this value
    pub const fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Int(_) => ValueKind::Int,
            Value::Bool(_) => ValueKind::Bool,
        }
    }

    /// Numeric view; `None` for booleans
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::Float(v) => Some(v),
            Value::Int(v) => Some(v as f32),
            Value::Bool(_) => None,
        }
    }

    /// Integer view; floats convert only when finite and whole
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::Int(v) => Some(v),
            Value::Float(v) if v.is_finite() && libm::truncf(v) == v => Some(v as i32),
            _ => None,
        }
    }

    /// Boolean view
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Convert to `kind`, if the conversion is defined
    pub fn coerce(self, kind: ValueKind) -> Option<Value> {
        match kind {
            ValueKind::Float => self.as_f32().map(Value::Float),
            ValueKind::Int => self.as_i32().map(Value::Int),
            ValueKind::Bool => self.as_bool().map(Value::Bool),
        }
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Value {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Value::Float(v) => defmt::write!(fmt, "{}", v),
            Value::Int(v) => defmt::write!(fmt, "{}", v),
            Value::Bool(v) => defmt::write!(fmt, "{}", v),
        }
    }
}

/// Rust types that can travel through the graph as a [`Value`]
///
/// Lets typed closures (see [`Lambda`](crate::transforms::Lambda)) and typed
/// sensor callbacks be written against `f32`, `i32` or `bool` directly.
pub trait ValueType: Copy + 'static {
    /// Kind produced by [`into_value`](Self::into_value)
    const KIND: ValueKind;

    /// Extract from a value; `None` when the conversion is not defined
    fn from_value(value: Value) -> Option<Self>;

    /// Wrap into a value
    fn into_value(self) -> Value;
}

impl ValueType for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_value(value: Value) -> Option<Self> {
        value.as_f32()
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl ValueType for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: Value) -> Option<Self> {
        value.as_i32()
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl ValueType for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

/// Identifier under which a sink publishes, or a transform is configured
///
/// Stored inline; the core never interprets the content beyond equality.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Path(String<MAX_PATH_LEN>);

impl Path {
    /// Copy `path` into inline storage
    pub fn new(path: &str) -> GraphResult<Self> {
        if path.is_empty() {
            return Err(GraphError::EmptyPath);
        }

        let mut inner = String::new();
        inner.push_str(path).map_err(|_| GraphError::PathTooLong {
            len: path.len(),
            max: MAX_PATH_LEN,
        })?;

        Ok(Self(inner))
    }

    /// Borrow as a string slice
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for Path {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
