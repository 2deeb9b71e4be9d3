// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory settings store adapter.
//!
//! This module provides a store that keeps settings in process memory and
//! notifies subscribers synchronously when a value is written or removed. It
//! is the store used by tests and demos, and a template for platform adapters.

use crate::domain::{Namespace, Result, SettingKey, SettingUri, SettingValue, UserId};
use crate::ports::{ChangeCallback, SettingsStore};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

type Slot = (Namespace, UserId, SettingKey);

/// Settings store backed by a `HashMap`.
///
/// Values in the system and secure namespaces are kept per user; global values
/// are shared by all users. Subscribers are notified on the writer's thread
/// after the value is stored.
///
/// # Examples
///
/// ```rust
/// use settings_observer::adapters::MemoryStore;
/// use settings_observer::domain::{Namespace, SettingKey, UserId};
/// use settings_observer::ports::SettingsStore;
///
/// let store = MemoryStore::new().with_value(Namespace::System, "font_scale", "1.0");
///
/// let key = SettingKey::from("font_scale");
/// let value = store.read(Namespace::System, &key, UserId::CURRENT).unwrap();
/// assert_eq!(value.unwrap().as_str(), "1.0");
/// ```
#[derive(Default)]
pub struct MemoryStore {
    /// Stored values
    values: RwLock<HashMap<Slot, SettingValue>>,
    /// One callback per subscribed URI
    subscribers: RwLock<HashMap<SettingUri, ChangeCallback>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value for the current user without notifying anyone.
    pub fn with_value(self, namespace: Namespace, key: &str, value: &str) -> Self {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                Self::slot(namespace, SettingKey::from(key), UserId::CURRENT),
                SettingValue::from(value),
            );
        self
    }

    /// Writes a value for the current user and notifies subscribers.
    pub fn put(&self, namespace: Namespace, key: &str, value: &str) {
        let key = SettingKey::from(key);
        self.store_value(namespace, &key, SettingValue::from(value), UserId::CURRENT);
    }

    /// Removes a value and notifies subscribers. Returns the removed value.
    pub fn remove(&self, namespace: Namespace, key: &str, user: UserId) -> Option<SettingValue> {
        let key = SettingKey::from(key);
        let removed = self
            .values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&Self::slot(namespace, key.clone(), user));
        if removed.is_some() {
            self.notify(&namespace.uri_for(&key));
        }
        removed
    }

    /// Delivers a change notification for `uri` to its subscriber, if any.
    ///
    /// Returns whether a subscriber was notified.
    pub fn notify(&self, uri: &SettingUri) -> bool {
        // Clone out of the lock so the callback may call back into the store
        let callback = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uri)
            .cloned();
        match callback {
            Some(callback) => {
                tracing::debug!("Notifying change of '{}'", uri);
                callback(uri);
                true
            }
            None => false,
        }
    }

    /// Returns whether `uri` currently has a subscriber.
    pub fn is_subscribed(&self, uri: &SettingUri) -> bool {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(uri)
    }

    /// Number of subscribed URIs.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn slot(namespace: Namespace, key: SettingKey, user: UserId) -> Slot {
        let user = match namespace {
            Namespace::Global => UserId::ALL,
            _ => user,
        };
        (namespace, user, key)
    }

    fn store_value(
        &self,
        namespace: Namespace,
        key: &SettingKey,
        value: SettingValue,
        user: UserId,
    ) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Self::slot(namespace, key.clone(), user), value);
        self.notify(&namespace.uri_for(key));
    }
}

impl SettingsStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn read(
        &self,
        namespace: Namespace,
        key: &SettingKey,
        user: UserId,
    ) -> Result<Option<SettingValue>> {
        Ok(self
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&Self::slot(namespace, key.clone(), user))
            .cloned())
    }

    fn write(
        &self,
        namespace: Namespace,
        key: &SettingKey,
        value: SettingValue,
        user: UserId,
    ) -> Result<bool> {
        self.store_value(namespace, key, value, user);
        Ok(true)
    }

    fn subscribe(&self, uri: &SettingUri, callback: ChangeCallback) -> Result<()> {
        tracing::debug!("Subscribing to '{}'", uri);
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uri.clone(), callback);
        Ok(())
    }

    fn unsubscribe(&self, uri: &SettingUri) -> Result<()> {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(uri);
        Ok(())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field(
                "values",
                &self.values.read().unwrap_or_else(PoisonError::into_inner).len(),
            )
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter(store: &MemoryStore, uri: &SettingUri) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        store
            .subscribe(
                uri,
                Arc::new(move |_: &SettingUri| {
                    count_clone.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        count
    }

    #[test]
    fn test_memory_store_name() {
        assert_eq!(MemoryStore::new().name(), "memory");
    }

    #[test]
    fn test_read_missing() {
        let store = MemoryStore::new();
        let value = store.read_str(Namespace::Secure, "adb_enabled", UserId::CURRENT).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_values_are_per_namespace() {
        let store = MemoryStore::new().with_value(Namespace::System, "font_scale", "1.0");
        assert!(store
            .read_str(Namespace::Secure, "font_scale", UserId::CURRENT)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_values_are_per_user_except_global() {
        let store = MemoryStore::new();
        let key = SettingKey::from("k");
        store.write(Namespace::System, &key, "a".into(), UserId(10)).unwrap();
        store.write(Namespace::Global, &key, "g".into(), UserId(10)).unwrap();

        assert!(store.read(Namespace::System, &key, UserId::CURRENT).unwrap().is_none());
        assert_eq!(
            store.read(Namespace::Global, &key, UserId::CURRENT).unwrap().unwrap().as_str(),
            "g"
        );
    }

    #[test]
    fn test_write_notifies_subscriber() {
        let store = MemoryStore::new();
        let uri = Namespace::System.uri_for(&SettingKey::from("font_scale"));
        let count = counter(&store, &uri);

        store.put(Namespace::System, "font_scale", "1.15");
        store.put(Namespace::Secure, "font_scale", "1.15");

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_notifies_only_when_present() {
        let store = MemoryStore::new().with_value(Namespace::Global, "airplane_mode_on", "1");
        let uri = Namespace::Global.uri_for(&SettingKey::from("airplane_mode_on"));
        let count = counter(&store, &uri);

        assert!(store.remove(Namespace::Global, "airplane_mode_on", UserId::CURRENT).is_some());
        assert!(store.remove(Namespace::Global, "airplane_mode_on", UserId::CURRENT).is_none());

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let store = MemoryStore::new();
        let uri = Namespace::System.uri_for(&SettingKey::from("font_scale"));
        let count = counter(&store, &uri);
        assert!(store.is_subscribed(&uri));

        store.unsubscribe(&uri).unwrap();
        store.put(Namespace::System, "font_scale", "2.0");

        assert!(!store.is_subscribed(&uri));
        assert_eq!(store.subscriber_count(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
