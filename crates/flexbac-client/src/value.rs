use serde::Serialize;
use std::fmt;

/// Decoded value of one register.
///
/// Serializes without a type tag: floats and ints as JSON numbers, bools
/// as booleans, multi-state values as `{"index": n, "label": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Enum { index: u32, label: Option<String> },
}

impl TypedValue {
    /// Enum value without a state-text label.
    pub const fn state(index: u32) -> Self {
        Self::Enum { index, label: None }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v),
            Self::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Multi-state index (1-based, as on the wire).
    pub fn as_index(&self) -> Option<u32> {
        match *self {
            Self::Enum { index, .. } => Some(index),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Enum {
                index,
                label: Some(label),
            } => write!(f, "{label} ({index})"),
            Self::Enum { index, label: None } => write!(f, "state {index}"),
        }
    }
}

impl From<f64> for TypedValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for TypedValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}
