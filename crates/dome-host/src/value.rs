//! Dynamic values exchanged between the engine and the host.

use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

use crate::{Function, HostError, HostObject, ObjectRef, PathStep};

/// Any value a host property can hold.
///
/// `List` and `Map` are plain data held by value; `Object` and `Function` are
/// shared references compared by identity.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Object(ObjectRef),
    Function(Function),
}

impl Value {
    /// Wraps a host object.
    pub fn object<T: HostObject + 'static>(object: Rc<T>) -> Self {
        Value::Object(object)
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(obj) => obj.type_name(),
            Value::Function(_) => "function",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Whether this value is a node of the host tree.
    pub fn is_node(&self) -> bool {
        matches!(self, Value::Object(obj) if obj.is_node())
    }

    /// JavaScript-style truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Reads `key` from this value. `None` means undefined.
    pub fn get(&self, key: &PathStep) -> Option<Value> {
        match self {
            Value::Object(obj) => obj.get(key),
            Value::List(items) => match key {
                PathStep::Key(k) if k == "length" => Some(Value::Number(items.len() as f64)),
                _ => items.get(key.as_index()?).cloned(),
            },
            Value::Map(map) => match key {
                PathStep::Key(k) => map.get(k).cloned(),
                PathStep::Index(idx) => map.get(&idx.to_string()).cloned(),
            },
            Value::String(s) => match key {
                PathStep::Key(k) if k == "length" => {
                    Some(Value::Number(s.chars().count() as f64))
                }
                _ => s
                    .chars()
                    .nth(key.as_index()?)
                    .map(|c| Value::String(c.to_string())),
            },
            _ => None,
        }
    }

    /// Assigns `key` on this value. Only live host objects accept writes.
    pub fn set(&self, key: &PathStep, value: Value) -> Result<(), HostError> {
        match self {
            Value::Object(obj) => obj.set(key, value),
            other => Err(HostError::not_writable(other.type_name(), key.to_string())),
        }
    }

    /// Calls the method `name` with this value as the receiver.
    ///
    /// A property holding a [`Function`] wins over the host's native method.
    pub fn invoke(&self, name: &PathStep, args: &[Value]) -> Result<Value, HostError> {
        if let Some(Value::Function(f)) = self.get(name) {
            return f.call(self, args);
        }
        match self {
            Value::Object(obj) => obj.invoke(&name.to_string(), args),
            other => Err(HostError::not_callable(other.type_name(), name.to_string())),
        }
    }

    /// The members of an iterable value, or `None` if it is not iterable.
    pub fn items(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items.clone()),
            Value::String(s) => Some(s.chars().map(|c| Value::String(c.to_string())).collect()),
            Value::Object(obj) => obj.items(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Formats a number the way a script engine stringifies it (`1`, not `1.0`).
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_owned()
    } else if n == 0.0 {
        "0".to_owned()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Map(_) => f.write_str("[object Object]"),
            Value::Object(obj) => write!(f, "[object {}]", obj.type_name()),
            Value::Function(_) => f.write_str("function"),
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

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::List(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}
