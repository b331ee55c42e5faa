//! Untyped property values.
//!
//! Elements expose configuration and read-only state (URIs, stream counts,
//! sink selections) as named properties. The control core treats them as
//! opaque key/value pairs.

use std::fmt;
use thiserror::Error;

/// Why an element refused a property access.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyError {
    /// The element has no property with this name.
    #[error("no such property")]
    Unknown,

    /// The value has the wrong type or is out of range.
    #[error("invalid value '{0}'")]
    InvalidValue(Value),

    /// The property is read-only or cannot change in the current state.
    #[error("not writable: {0}")]
    NotWritable(String),
}

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string value.
    String(String),
    /// A signed integer value.
    Int(i64),
    /// An unsigned integer value.
    UInt(u64),
    /// A floating-point value.
    Double(f64),
    /// A boolean value.
    Bool(bool),
}

impl Value {
    /// Get as a string slice if this is a String.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as a u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(n) => Some(*n),
            Value::Int(n) => u64::try_from(*n).ok(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to get as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::UInt(n) => i64::try_from(*n).ok(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to get as a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(i) => Some(*i != 0),
            Value::UInt(i) => Some(*i != 0),
            Value::String(s) => match s.to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            Value::Double(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::UInt(n) => write!(f, "{n}"),
            Value::Double(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::UInt(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::UInt(n as u64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::UInt(n as u64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from("file:///a.webm").as_str(), Some("file:///a.webm"));
        assert_eq!(Value::from(3usize).as_u64(), Some(3));
        assert_eq!(Value::from(-1i64).as_u64(), None);
        assert_eq!(Value::from("42").as_i64(), Some(42));
        assert_eq!(Value::from("yes").as_bool(), Some(true));
        assert_eq!(Value::from(0u32).as_bool(), Some(false));
    }
}
