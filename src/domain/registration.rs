// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registration options for a watched key.
//!
//! A `Registration` collects everything the observer needs to know about a key
//! besides its name: the namespace it lives in, the type its raw value is
//! parsed into, the default used when the setting is missing and the user
//! scope it is read for. The first registration of a key is recorded and every
//! later registration of the same key must match it.

use crate::domain::errors::{Result, SettingsError};
use crate::domain::{Namespace, SettingKey, SettingValue, TypedValue, UserId, ValueType};

/// Options for watching a key.
///
/// All fields are optional; `Registration::new()` watches a system setting as
/// a plain string for the observer's current user.
///
/// # Examples
///
/// ```
/// use settings_observer::domain::{Namespace, Registration, UserId, ValueType};
///
/// let registration = Registration::secure()
///     .with_value_type(ValueType::Int)
///     .with_default(1)
///     .for_user(UserId(10));
///
/// assert_eq!(registration.namespace(), Namespace::Secure);
/// assert_eq!(registration.value_type(), ValueType::Int);
/// assert_eq!(registration.user(), Some(UserId(10)));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Registration {
    namespace: Namespace,
    value_type: ValueType,
    default: Option<TypedValue>,
    user: Option<UserId>,
}

impl Registration {
    /// Creates a registration for a system string setting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registration for a system setting.
    pub fn system() -> Self {
        Self::new().in_namespace(Namespace::System)
    }

    /// Creates a registration for a secure setting.
    pub fn secure() -> Self {
        Self::new().in_namespace(Namespace::Secure)
    }

    /// Creates a registration for a global setting.
    pub fn global() -> Self {
        Self::new().in_namespace(Namespace::Global)
    }

    /// Sets the namespace the key lives in.
    pub fn in_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    /// Sets the type the raw value is parsed into.
    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Sets the value delivered when a numeric setting is missing.
    ///
    /// The default is converted to the registration's value type when the
    /// value is resolved. String settings ignore it.
    pub fn with_default(mut self, default: impl Into<TypedValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Reads and writes the key for `user` instead of the observer's current user.
    pub fn for_user(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }

    /// The namespace the key lives in.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// The type the raw value is parsed into.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// The default for missing numeric values, as given.
    pub fn default_value(&self) -> Option<&TypedValue> {
        self.default.as_ref()
    }

    /// The explicit user scope, if any.
    pub fn user(&self) -> Option<UserId> {
        self.user
    }

    /// The value a missing setting resolves to, or `None` for string settings.
    pub fn fallback(&self) -> Option<TypedValue> {
        if !self.value_type.is_numeric() {
            return None;
        }
        let fallback = self
            .default
            .as_ref()
            .and_then(|d| d.cast(self.value_type))
            .unwrap_or_else(|| self.value_type.zero());
        Some(fallback)
    }

    /// Resolves a raw store value into the typed value listeners receive.
    ///
    /// * `Ok(Some(value))` - the setting exists, or is missing and has a numeric fallback
    /// * `Ok(None)` - a string setting that is missing
    /// * `Err(_)` - the stored value does not parse as the registered type
    ///
    /// # Examples
    ///
    /// ```
    /// use settings_observer::domain::{
    ///     Registration, SettingKey, SettingValue, TypedValue, ValueType,
    /// };
    ///
    /// let key = SettingKey::from("screen_brightness");
    /// let registration = Registration::system().with_value_type(ValueType::Int).with_default(100);
    ///
    /// let raw = SettingValue::from("128");
    /// assert_eq!(registration.resolve(&key, Some(&raw)).unwrap(), Some(TypedValue::Int(128)));
    /// assert_eq!(registration.resolve(&key, None).unwrap(), Some(TypedValue::Int(100)));
    /// ```
    pub fn resolve(
        &self,
        key: &SettingKey,
        raw: Option<&SettingValue>,
    ) -> Result<Option<TypedValue>> {
        match raw {
            Some(raw) => raw.to_typed(key.as_str(), self.value_type).map(Some),
            None => Ok(self.fallback()),
        }
    }

    /// Checks `requested` against this (already recorded) registration.
    ///
    /// Returns the conflict describing the first differing attribute.
    pub fn check_compatible(&self, key: &SettingKey, requested: &Registration) -> Result<()> {
        let conflict = |field: &'static str, existing: String, requested: String| {
            Err(SettingsError::RegistrationConflict {
                key: key.to_string(),
                field,
                existing,
                requested,
            })
        };

        if self.value_type != requested.value_type {
            return conflict(
                "value type",
                self.value_type.to_string(),
                requested.value_type.to_string(),
            );
        }
        let same_default = match (&self.default, &requested.default) {
            (Some(a), Some(b)) => a.same_as(b),
            (a, b) => a.is_none() && b.is_none(),
        };
        if !same_default {
            return conflict(
                "default",
                format!("{:?}", self.default),
                format!("{:?}", requested.default),
            );
        }
        if self.namespace != requested.namespace {
            return conflict(
                "namespace",
                self.namespace.to_string(),
                requested.namespace.to_string(),
            );
        }
        if self.user != requested.user {
            return conflict(
                "user",
                format!("{:?}", self.user),
                format!("{:?}", requested.user),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SettingKey {
        SettingKey::from("screen_off_timeout")
    }

    #[test]
    fn test_new_is_system_string() {
        let registration = Registration::new();
        assert_eq!(registration.namespace(), Namespace::System);
        assert_eq!(registration.value_type(), ValueType::String);
        assert!(registration.default_value().is_none());
        assert!(registration.user().is_none());
    }

    #[test]
    fn test_fallback_for_string_is_none() {
        let registration = Registration::new().with_default(5);
        assert_eq!(registration.fallback(), None);
    }

    #[test]
    fn test_fallback_without_default_is_zero() {
        let registration = Registration::new().with_value_type(ValueType::Long);
        assert_eq!(registration.fallback(), Some(TypedValue::Long(0)));
    }

    #[test]
    fn test_fallback_casts_default() {
        let registration = Registration::new()
            .with_value_type(ValueType::Float)
            .with_default(30000i64);
        assert_eq!(registration.fallback(), Some(TypedValue::Float(30000.0)));
    }

    #[test]
    fn test_fallback_unparsable_default_is_zero() {
        let registration = Registration::new()
            .with_value_type(ValueType::Int)
            .with_default("soon");
        assert_eq!(registration.fallback(), Some(TypedValue::Int(0)));
    }

    #[test]
    fn test_resolve_missing_string() {
        let registration = Registration::new();
        assert_eq!(registration.resolve(&key(), None).unwrap(), None);
    }

    #[test]
    fn test_resolve_parse_failure() {
        let registration = Registration::new().with_value_type(ValueType::Int);
        let raw = SettingValue::from("never");
        assert!(registration.resolve(&key(), Some(&raw)).is_err());
    }

    #[test]
    fn test_identical_registrations_are_compatible() {
        let a = Registration::secure().with_value_type(ValueType::Int).with_default(1);
        let b = a.clone();
        assert!(a.check_compatible(&key(), &b).is_ok());
    }

    #[test]
    fn test_conflicting_value_type() {
        let a = Registration::new().with_value_type(ValueType::Int);
        let b = Registration::new().with_value_type(ValueType::Float);
        let err = a.check_compatible(&key(), &b).unwrap_err();
        match err {
            SettingsError::RegistrationConflict {
                field,
                existing,
                requested,
                ..
            } => {
                assert_eq!(field, "value type");
                assert_eq!(existing, "int");
                assert_eq!(requested, "float");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_conflicting_default() {
        let a = Registration::new().with_value_type(ValueType::Int).with_default(1);
        let b = Registration::new().with_value_type(ValueType::Int).with_default(2);
        assert!(a.check_compatible(&key(), &b).is_err());
    }

    #[test]
    fn test_nan_default_is_compatible_with_itself() {
        let a = Registration::new()
            .with_value_type(ValueType::Float)
            .with_default(f32::NAN);
        assert!(a.check_compatible(&key(), &a.clone()).is_ok());

        let b = Registration::new()
            .with_value_type(ValueType::Float)
            .with_default(1.0f32);
        assert!(a.check_compatible(&key(), &b).is_err());
    }

    #[test]
    fn test_conflicting_namespace_and_user() {
        let a = Registration::system();
        assert!(a.check_compatible(&key(), &Registration::global()).is_err());
        assert!(a
            .check_compatible(&key(), &Registration::system().for_user(UserId(10)))
            .is_err());
    }
}
