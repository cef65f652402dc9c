//! Value types for csvmap
//!
//! This module defines:
//! - Value: the dynamic value stored in a mapped property
//! - Object: a dynamically shaped instance of a mapped type
//!
//! ## Value Model
//!
//! - Null, Bool, Int, Float, String, Object
//! - No implicit coercions: `Int(1) != Float(1.0)`
//! - Float uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`
//!
//! Text never appears here unconverted: turning field text into a `Value`
//! is the job of a [`crate::convert::TypeConverter`].

use std::collections::BTreeMap;
use std::fmt;

use crate::path::{MemberPath, PathSegment};
use crate::shape::ScalarKind;

/// Dynamic property value
#[derive(Debug, Clone)]
pub enum Value {
    /// Null / unset value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Nested instance
    Object(Object),
}

// Custom PartialEq implementation for IEEE-754 float semantics
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Object(_) => "Object",
        }
    }

    /// Scalar kind of this value (None for Null and Object)
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Value::Bool(_) => Some(ScalarKind::Bool),
            Value::Int(_) => Some(ScalarKind::Int),
            Value::Float(_) => Some(ScalarKind::Float),
            Value::String(_) => Some(ScalarKind::String),
            Value::Null | Value::Object(_) => None,
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float value
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as &Object if this is an Object value
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::Object(o) => write!(f, "{}{{..}}", o.type_name()),
        }
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

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

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

// ============================================================================
// Object
// ============================================================================

/// A constructed instance of a mapped type
///
/// `type_name` is the *concrete* type that produced the instance, which may
/// differ from the declared property type when a contract resolver picked
/// an implementation for an abstract type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
    type_name: String,
    fields: BTreeMap<String, Value>,
}

impl Object {
    /// Create an empty instance of `type_name`
    pub fn new(type_name: impl Into<String>) -> Self {
        Object {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Concrete type name
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Get a direct field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a direct field mutably
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Set a direct field, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Builder-style [`Object::set`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Check whether a direct field is present
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate over direct fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of direct fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Follow a member path through nested objects
    ///
    /// Returns `None` if any segment is missing or an intermediate value is
    /// not an object. The empty path is not a value and yields `None`.
    pub fn get_path(&self, path: &MemberPath) -> Option<&Value> {
        let (last, parents) = path.segments().split_last()?;
        let mut current = self;
        for PathSegment(name) in parents {
            current = current.get(name)?.as_object()?;
        }
        current.get(&last.0)
    }

    /// The object that owns the last segment of `path`
    pub fn get_parent(&self, path: &MemberPath) -> Option<&Object> {
        let (_, parents) = path.segments().split_last()?;
        let mut current = self;
        for PathSegment(name) in parents {
            current = current.get(name)?.as_object()?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_different_types_never_equal() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::String("1".to_string()), Value::Int(1));
        assert_ne!(Value::Null, Value::Bool(false));
    }

    #[test]
    fn test_float_ieee_equality() {
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_eq!(Value::Float(-0.0), Value::Float(0.0));
    }

    #[test]
    fn test_scalar_kind() {
        assert_eq!(Value::Int(3).scalar_kind(), Some(ScalarKind::Int));
        assert_eq!(Value::from("x").scalar_kind(), Some(ScalarKind::String));
        assert_eq!(Value::Null.scalar_kind(), None);
        assert_eq!(Value::Object(Object::new("A")).scalar_kind(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_object_set_get() {
        let mut obj = Object::new("Customer");
        assert!(obj.is_empty());
        assert_eq!(obj.set("Id", 7), None);
        assert_eq!(obj.set("Id", 8), Some(Value::Int(7)));
        assert_eq!(obj.get("Id"), Some(&Value::Int(8)));
        assert!(obj.contains("Id"));
        assert_eq!(obj.len(), 1);
        assert_eq!(obj.type_name(), "Customer");
    }

    #[test]
    fn test_object_get_path() {
        let d = Object::new("D").with("DId", 4);
        let c = Object::new("C").with("CId", 3).with("D", d);
        let a = Object::new("A").with("AId", 1).with("C", c);

        let path: MemberPath = "C.D.DId".parse().unwrap();
        assert_eq!(a.get_path(&path), Some(&Value::Int(4)));

        let parent = a.get_parent(&path).unwrap();
        assert_eq!(parent.type_name(), "D");

        let missing: MemberPath = "C.X.DId".parse().unwrap();
        assert_eq!(a.get_path(&missing), None);
        assert_eq!(a.get_path(&MemberPath::root()), None);
    }

    #[test]
    fn test_get_path_through_scalar_is_none() {
        let a = Object::new("A").with("AId", 1);
        let path: MemberPath = "AId.X".parse().unwrap();
        assert_eq!(a.get_path(&path), None);
    }
}
