// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw setting value type with type-safe conversions.
//!
//! Stores hold every setting as a string. This module provides the
//! `SettingValue` wrapper and the conversions the observer applies before a
//! value reaches listeners.

use crate::domain::errors::{Result, SettingsError};
use crate::domain::{TypedValue, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw setting value as held by a store.
///
/// # Examples
///
/// ```
/// use settings_observer::domain::setting_value::SettingValue;
///
/// let value = SettingValue::from("128");
/// assert_eq!(value.as_str(), "128");
/// assert_eq!(value.as_i32("screen_brightness").unwrap(), 128);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingValue(String);

impl SettingValue {
    /// Creates a new `SettingValue` from a `String`.
    pub fn new(value: String) -> Self {
        SettingValue(value)
    }

    /// Returns the value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the value to an `i32`.
    pub fn as_i32(&self, key: &str) -> Result<i32> {
        self.0
            .parse::<i32>()
            .map_err(|e| SettingsError::from_parse_int_error(key.to_string(), e))
    }

    /// Converts the value to an `i64`.
    ///
    /// # Examples
    ///
    /// ```
    /// use settings_observer::domain::setting_value::SettingValue;
    ///
    /// let value = SettingValue::from("1700000000000");
    /// assert_eq!(value.as_i64("last_update").unwrap(), 1_700_000_000_000);
    /// ```
    pub fn as_i64(&self, key: &str) -> Result<i64> {
        self.0
            .parse::<i64>()
            .map_err(|e| SettingsError::from_parse_int_error(key.to_string(), e))
    }

    /// Converts the value to an `f32`.
    pub fn as_f32(&self, key: &str) -> Result<f32> {
        self.0
            .parse::<f32>()
            .map_err(|e| SettingsError::from_parse_float_error(key.to_string(), e))
    }

    /// Parses the value into its [`ValueType`].
    ///
    /// # Examples
    ///
    /// ```
    /// use settings_observer::domain::{SettingValue, TypedValue, ValueType};
    ///
    /// let value = SettingValue::from("1.15");
    /// assert_eq!(
    ///     value.to_typed("font_scale", ValueType::Float).unwrap(),
    ///     TypedValue::Float(1.15)
    /// );
    /// assert!(value.to_typed("font_scale", ValueType::Int).is_err());
    /// ```
    pub fn to_typed(&self, key: &str, value_type: ValueType) -> Result<TypedValue> {
        match value_type {
            ValueType::String => Ok(TypedValue::String(self.0.clone())),
            ValueType::Int => self.as_i32(key).map(TypedValue::Int),
            ValueType::Long => self.as_i64(key).map(TypedValue::Long),
            ValueType::Float => self.as_f32(key).map(TypedValue::Float),
        }
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue(s)
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue(s.to_string())
    }
}

impl From<i32> for SettingValue {
    fn from(n: i32) -> Self {
        SettingValue(n.to_string())
    }
}

impl From<&TypedValue> for SettingValue {
    fn from(value: &TypedValue) -> Self {
        SettingValue(value.to_string())
    }
}

impl From<SettingValue> for String {
    fn from(value: SettingValue) -> Self {
        value.0
    }
}

impl AsRef<str> for SettingValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
