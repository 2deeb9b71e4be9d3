// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings store trait definition.
//!
//! This module defines the `SettingsStore` trait, the port through which the
//! observer reads, writes and subscribes to settings. Platform specific storage
//! lives in adapters implementing this trait.

use crate::domain::{Namespace, Result, SettingKey, SettingUri, SettingValue, UserId};
use std::sync::Arc;

/// Type alias for store change notifications.
///
/// The store invokes this callback with the URI of the setting that changed.
/// It may be called from any thread and must not block.
pub type ChangeCallback = Arc<dyn Fn(&SettingUri) + Send + Sync>;

/// A trait for settings stores.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; all methods take `&self` so a store
/// can be shared between the observer's registration path and its dispatch
/// thread.
///
/// # Examples
///
/// ```rust
/// use settings_observer::ports::{ChangeCallback, SettingsStore};
/// use settings_observer::domain::{
///     Namespace, Result, SettingKey, SettingUri, SettingValue, UserId,
/// };
///
/// struct EmptyStore;
///
/// impl SettingsStore for EmptyStore {
///     fn name(&self) -> &str {
///         "empty"
///     }
///
///     fn read(
///         &self,
///         _ns: Namespace,
///         _key: &SettingKey,
///         _user: UserId,
///     ) -> Result<Option<SettingValue>> {
///         Ok(None)
///     }
///
///     fn write(
///         &self,
///         _ns: Namespace,
///         _key: &SettingKey,
///         _value: SettingValue,
///         _user: UserId,
///     ) -> Result<bool> {
///         Ok(false)
///     }
///
///     fn subscribe(&self, _uri: &SettingUri, _callback: ChangeCallback) -> Result<()> {
///         Ok(())
///     }
///
///     fn unsubscribe(&self, _uri: &SettingUri) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait SettingsStore: Send + Sync {
    /// Returns a short name for this store, used in logs and errors.
    fn name(&self) -> &str;

    /// Reads the raw value of `key` in `namespace` for `user`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(SettingValue))` - The setting exists
    /// * `Ok(None)` - The setting does not exist
    /// * `Err(SettingsError)` - The store could not be read
    fn read(
        &self,
        namespace: Namespace,
        key: &SettingKey,
        user: UserId,
    ) -> Result<Option<SettingValue>>;

    /// Writes `value` to `key` in `namespace` for `user`.
    ///
    /// Returns whether the store accepted the write. A successful write must
    /// notify the subscribers of the setting's URI.
    fn write(
        &self,
        namespace: Namespace,
        key: &SettingKey,
        value: SettingValue,
        user: UserId,
    ) -> Result<bool>;

    /// Starts delivering change notifications for `uri` to `callback`.
    ///
    /// Subscribing the same URI again replaces the previous callback.
    fn subscribe(&self, uri: &SettingUri, callback: ChangeCallback) -> Result<()>;

    /// Stops delivering change notifications for `uri`.
    fn unsubscribe(&self, uri: &SettingUri) -> Result<()>;

    /// Reads a setting by key string.
    ///
    /// Equivalent to `read(namespace, &SettingKey::from(key), user)`.
    fn read_str(
        &self,
        namespace: Namespace,
        key: &str,
        user: UserId,
    ) -> Result<Option<SettingValue>> {
        self.read(namespace, &SettingKey::from(key), user)
    }
}

impl<S: SettingsStore + ?Sized> SettingsStore for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read(
        &self,
        namespace: Namespace,
        key: &SettingKey,
        user: UserId,
    ) -> Result<Option<SettingValue>> {
        (**self).read(namespace, key, user)
    }

    fn write(
        &self,
        namespace: Namespace,
        key: &SettingKey,
        value: SettingValue,
        user: UserId,
    ) -> Result<bool> {
        (**self).write(namespace, key, value, user)
    }

    fn subscribe(&self, uri: &SettingUri, callback: ChangeCallback) -> Result<()> {
        (**self).subscribe(uri, callback)
    }

    fn unsubscribe(&self, uri: &SettingUri) -> Result<()> {
        (**self).unsubscribe(uri)
    }
}
