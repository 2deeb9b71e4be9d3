// SPDX-License-Identifier: MIT OR Apache-2.0

//! Setting key newtype for type-safe key handling.
//!
//! This module provides the `SettingKey` type, a newtype wrapper around `String`
//! that keeps setting names apart from the values stored under them.

use std::borrow::Borrow;
use std::fmt;

/// A type-safe wrapper for setting keys such as `screen_brightness`.
///
/// # Examples
///
/// ```
/// use settings_observer::domain::setting_key::SettingKey;
///
/// let key = SettingKey::from("screen_brightness");
/// let key2 = SettingKey::from("adb_enabled".to_string());
///
/// assert_eq!(key.as_str(), "screen_brightness");
/// assert_ne!(key, key2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SettingKey(String);

impl SettingKey {
    /// Creates a new `SettingKey` from a `String`.
    pub fn new(key: String) -> Self {
        SettingKey(key)
    }

    /// Returns the key as a string slice.
    ///
    /// # Examples
    ///
    /// ```
    /// use settings_observer::domain::setting_key::SettingKey;
    ///
    /// let key = SettingKey::from("font_scale");
    /// assert_eq!(key.as_str(), "font_scale");
    /// ```
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `SettingKey` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for SettingKey {
    fn from(s: String) -> Self {
        SettingKey(s)
    }
}

impl From<&str> for SettingKey {
    fn from(s: &str) -> Self {
        SettingKey(s.to_string())
    }
}

impl From<&SettingKey> for SettingKey {
    fn from(key: &SettingKey) -> Self {
        key.clone()
    }
}

impl From<SettingKey> for String {
    fn from(key: SettingKey) -> Self {
        key.0
    }
}

impl AsRef<str> for SettingKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SettingKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
