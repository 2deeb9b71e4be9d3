// SPDX-License-Identifier: MIT OR Apache-2.0

//! Value types a watched setting is parsed into.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The typed representation a raw stored value is parsed into.
///
/// `String` is the default: the raw value is delivered unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Raw string value.
    #[default]
    String,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit float.
    Float,
}

impl ValueType {
    /// Returns the lowercase type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Long => "long",
            ValueType::Float => "float",
        }
    }

    /// Returns `true` for the numeric types.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ValueType::String)
    }

    /// The value a missing numeric setting resolves to when no default was given.
    pub fn zero(&self) -> TypedValue {
        match self {
            ValueType::String => TypedValue::String(String::new()),
            ValueType::Int => TypedValue::Int(0),
            ValueType::Long => TypedValue::Long(0),
            ValueType::Float => TypedValue::Float(0.0),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A setting value after it was parsed into its [`ValueType`].
///
/// The `Display` form is what listeners receive. Floats always carry a
/// fractional part (`1.0`, not `1`).
///
/// # Examples
///
/// ```
/// use settings_observer::domain::{TypedValue, ValueType};
///
/// assert_eq!(TypedValue::Float(1.0).to_string(), "1.0");
/// assert_eq!(TypedValue::Long(7).cast(ValueType::Float), Some(TypedValue::Float(7.0)));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// A 32-bit integer.
    Int(i32),
    /// A 64-bit integer.
    Long(i64),
    /// A 32-bit float.
    Float(f32),
    /// A raw string.
    String(String),
}

impl TypedValue {
    /// Returns the type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            TypedValue::String(_) => ValueType::String,
            TypedValue::Int(_) => ValueType::Int,
            TypedValue::Long(_) => ValueType::Long,
            TypedValue::Float(_) => ValueType::Float,
        }
    }

    /// Converts this value to `target`.
    ///
    /// Numeric values convert between each other with `as` semantics; strings
    /// are parsed. Returns `None` when a string does not parse.
    pub fn cast(&self, target: ValueType) -> Option<TypedValue> {
        match (self, target) {
            (TypedValue::String(s), ValueType::String) => Some(TypedValue::String(s.clone())),
            (TypedValue::String(s), ValueType::Int) => s.trim().parse().ok().map(TypedValue::Int),
            (TypedValue::String(s), ValueType::Long) => s.trim().parse().ok().map(TypedValue::Long),
            (TypedValue::String(s), ValueType::Float) => {
                s.trim().parse().ok().map(TypedValue::Float)
            }
            (v, ValueType::String) => Some(TypedValue::String(v.to_string())),
            (TypedValue::Int(n), ValueType::Int) => Some(TypedValue::Int(*n)),
            (TypedValue::Int(n), ValueType::Long) => Some(TypedValue::Long(i64::from(*n))),
            (TypedValue::Int(n), ValueType::Float) => Some(TypedValue::Float(*n as f32)),
            (TypedValue::Long(n), ValueType::Int) => Some(TypedValue::Int(*n as i32)),
            (TypedValue::Long(n), ValueType::Long) => Some(TypedValue::Long(*n)),
            (TypedValue::Long(n), ValueType::Float) => Some(TypedValue::Float(*n as f32)),
            (TypedValue::Float(n), ValueType::Int) => Some(TypedValue::Int(*n as i32)),
            (TypedValue::Float(n), ValueType::Long) => Some(TypedValue::Long(*n as i64)),
            (TypedValue::Float(n), ValueType::Float) => Some(TypedValue::Float(*n)),
        }
    }

    /// Returns `true` when both values have the same type and representation.
    ///
    /// Floats compare by bit pattern, so a `NaN` matches an identical `NaN`.
    pub fn same_as(&self, other: &TypedValue) -> bool {
        match (self, other) {
            (TypedValue::Float(a), TypedValue::Float(b)) => a.to_bits() == b.to_bits(),
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::String(s) => f.write_str(s),
            TypedValue::Int(n) => write!(f, "{}", n),
            TypedValue::Long(n) => write!(f, "{}", n),
            // Debug keeps the trailing ".0" on whole floats
            TypedValue::Float(n) => write!(f, "{:?}", n),
        }
    }
}

impl From<i32> for TypedValue {
    fn from(n: i32) -> Self {
        TypedValue::Int(n)
    }
}

impl From<i64> for TypedValue {
    fn from(n: i64) -> Self {
        TypedValue::Long(n)
    }
}

impl From<f32> for TypedValue {
    fn from(n: f32) -> Self {
        TypedValue::Float(n)
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        TypedValue::String(s.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(s: String) -> Self {
        TypedValue::String(s)
    }
}
