// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Values exchanged between the runtime, native capabilities and executors
//!
//! Objects and arrays have reference identity: cloning a [`Value::Object`]
//! or [`Value::Array`] clones the handle, not the contents. Module `exports`
//! rely on this so that every consumer of a module observes the same value.

use crate::native::CapabilityWrapper;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Nesting depth past which [`Value::to_json`] stops descending
const MAX_JSON_DEPTH: usize = 64;

/// A shared, mutable property bag
#[derive(Clone, Default)]
pub struct Object(Arc<RwLock<BTreeMap<String, Value>>>);

impl Object {
    /// Create an empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a property value
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    /// Set a property value
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.write().insert(key.into(), value.into());
    }

    /// Remove a property, returning its previous value
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.write().remove(key)
    }

    /// Check if a property exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    /// Property names in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.0.read().keys().cloned().collect()
    }

    /// Snapshot of all properties
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Check if the object has no properties
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Object {
    // Objects may be cyclic, so only the shape is printed
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object").field("keys", &self.keys()).finish()
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Object(Arc::new(RwLock::new(iter.into_iter().collect())))
    }
}

/// A shared, mutable list
#[derive(Clone, Default)]
pub struct Array(Arc<RwLock<Vec<Value>>>);

impl Array {
    /// Create an empty array
    pub fn new() -> Self {
        Self::default()
    }

    /// Element at `index`
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// Append an element
    pub fn push(&self, value: impl Into<Value>) {
        self.0.write().push(value.into());
    }

    /// Snapshot of the elements
    pub fn items(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Check if the array has no elements
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Array) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array").field("len", &self.len()).finish()
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Array(Arc::new(RwLock::new(iter.into_iter().collect())))
    }
}

/// A dynamically typed value
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// undefined
    #[default]
    Undefined,
    /// null
    Null,
    /// Boolean
    Boolean(bool),
    /// Number
    Number(f64),
    /// String
    String(String),
    /// Array (reference semantics)
    Array(Array),
    /// Object (reference semantics)
    Object(Object),
    /// Consumer-specific wrapper around a native module
    Capability(Arc<CapabilityWrapper>),
}

impl Value {
    /// Check if undefined
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check if null or undefined
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Name reported by `typeof`
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Array(_) | Value::Object(_) | Value::Capability(_) => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }

    /// The string payload, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The number payload, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The array handle, if this is an array
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// The object handle, if this is an object
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The native wrapper, if this is one
    pub fn as_capability(&self) -> Option<&Arc<CapabilityWrapper>> {
        match self {
            Value::Capability(wrapper) => Some(wrapper),
            _ => None,
        }
    }

    /// Property lookup on objects and native wrappers
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(obj) => obj.get(key),
            Value::Capability(wrapper) => wrapper.get(key),
            _ => None,
        }
    }

    /// `===` semantics: identity for objects, wrappers and arrays
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Capability(a), Value::Capability(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Convert to JSON for display; wrappers become a descriptive string
    pub fn to_json(&self) -> serde_json::Value {
        self.to_json_at(0)
    }

    fn to_json_at(&self, depth: usize) -> serde_json::Value {
        use serde_json::Value as Json;

        if depth > MAX_JSON_DEPTH {
            return Json::String("[Circular]".into());
        }
        match self {
            Value::Undefined | Value::Null => Json::Null,
            Value::Boolean(b) => Json::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(array) => Json::Array(
                array
                    .items()
                    .iter()
                    .map(|v| v.to_json_at(depth + 1))
                    .collect(),
            ),
            Value::Object(obj) => Json::Object(
                obj.entries()
                    .into_iter()
                    .map(|(k, v)| (k, v.to_json_at(depth + 1)))
                    .collect(),
            ),
            Value::Capability(wrapper) => Json::String(format!("[native {}]", wrapper.id())),
        }
    }
}

impl PartialEq for Value {
    /// Structural for arrays, identity for objects and wrappers
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b) || a.items() == b.items(),
            _ => self.strict_equals(other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(array) => {
                let parts: Vec<String> = array.items().iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Capability(wrapper) => write!(f, "[native {}]", wrapper.id()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Value::Array(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_identity() {
        let a = Object::new();
        let b = a.clone();
        b.set("x", 1.0);

        assert_eq!(a.get("x"), Some(Value::Number(1.0)));
        assert!(Value::Object(a.clone()).strict_equals(&Value::Object(b)));
        assert!(!Value::Object(a).strict_equals(&Value::Object(Object::new())));
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({ "name": "pkg", "main": "lib/index.js", "n": 2 }));
        let obj = value.as_object().unwrap();
        assert_eq!(obj.keys(), vec!["main", "n", "name"]);
        assert_eq!(obj.get("main").unwrap().as_str(), Some("lib/index.js"));
        assert_eq!(obj.get("n"), Some(Value::Number(2.0)));
    }

    #[test]
    fn test_array_identity() {
        let a: Array = vec![Value::Number(1.0)].into_iter().collect();
        let b = a.clone();
        b.push("two");

        assert_eq!(a.len(), 2);
        assert_eq!(a.get(1), Some(Value::from("two")));
        assert!(Value::Array(a.clone()).strict_equals(&Value::Array(b)));

        let copy = Value::from(a.items());
        assert!(!Value::Array(a.clone()).strict_equals(&copy));
        assert_eq!(Value::Array(a), copy);
    }

    #[test]
    fn test_to_json_survives_cycles() {
        let obj = Object::new();
        obj.set("self", obj.clone());
        let json = Value::Object(obj).to_json();
        assert!(json.to_string().contains("[Circular]"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Undefined.to_string(), "undefined");
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(
            Value::from(vec![Value::from("a"), Value::Null]).to_string(),
            "a,null"
        );
        assert_eq!(Value::Object(Object::new()).to_string(), "[object Object]");
    }
}
