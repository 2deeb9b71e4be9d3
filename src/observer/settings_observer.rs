// SPDX-License-Identifier: MIT OR Apache-2.0

//! The settings observer.
//!
//! `SettingsObserver` maps watched keys to their notification URIs and to the
//! listeners interested in them. When the store reports a change it re-reads
//! the value, applies the key's recorded type and default, and hands the result
//! to every listener of that key.

use crate::domain::{Namespace, Registration, Result, SettingKey, SettingUri, SettingValue, UserId};
use crate::observer::dispatcher::{Dispatch, Dispatcher};
use crate::observer::registry::Registry;
use crate::ports::{ChangeCallback, ListenerId, SettingsListener, SettingsStore};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

/// Default name of the dispatch thread.
pub const DEFAULT_DISPATCH_THREAD: &str = "settings-dispatch";

/// State shared between the observer handle and its dispatch thread.
struct Shared<S> {
    store: S,
    registry: RwLock<Registry>,
    current_user: UserId,
    /// Posts store notifications to the dispatch thread
    notify_tx: Mutex<Sender<Dispatch>>,
}

impl<S: SettingsStore> Shared<S> {
    fn registry(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The callback handed to the store for every subscribed URI.
    fn change_callback(&self) -> ChangeCallback {
        let tx = self
            .notify_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let tx = Mutex::new(tx);
        Arc::new(move |uri: &SettingUri| {
            let sent = tx
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .send(Dispatch::Changed(uri.clone()));
            if sent.is_err() {
                tracing::debug!("Dropping change for '{}': dispatcher stopped", uri);
            }
        })
    }

    /// Registration and effective user for `key`, falling back to the plain
    /// registration in `namespace` for keys nobody watches.
    fn scope_for(&self, key: &SettingKey, namespace: Option<Namespace>) -> (Registration, UserId) {
        let registration = self.registry().record(key.as_str()).cloned();
        let registration = match (registration, namespace) {
            (Some(r), None) => r,
            (Some(r), Some(ns)) if r.namespace() == ns => r,
            (_, ns) => Registration::new().in_namespace(ns.unwrap_or_default()),
        };
        let user = registration.user().unwrap_or(self.current_user);
        (registration, user)
    }

    /// Reads `key` and renders it for listeners. Never fails: errors are
    /// logged and yield an empty string.
    fn current_value(&self, key: &SettingKey) -> String {
        let (registration, user) = self.scope_for(key, None);

        let raw = match self.store.read(registration.namespace(), key, user) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    "Failed to read '{}' from store '{}': {}",
                    key,
                    self.store.name(),
                    e
                );
                return String::new();
            }
        };

        let value = match registration.resolve(key, raw.as_ref()) {
            Ok(Some(value)) => value.to_string(),
            Ok(None) => String::new(),
            Err(e) => {
                tracing::warn!("Failed to resolve '{}': {}", key, e);
                String::new()
            }
        };

        tracing::debug!(
            "Read '{}' = '{}' (namespace={}, type={}, user={})",
            key,
            value,
            registration.namespace(),
            registration.value_type(),
            user
        );
        value
    }

    fn subscribe(&self, uri: &SettingUri) -> Result<()> {
        self.store.subscribe(uri, self.change_callback())
    }

    fn on_change(&self, uri: &SettingUri) {
        let (key, listeners) = {
            let mut registry = self.registry_mut();
            let Some(key) = registry.key_for(uri).cloned() else {
                tracing::debug!("Ignoring change for unknown uri '{}'", uri);
                return;
            };
            let listeners = registry.begin_change(&key);
            (key, listeners)
        };

        if listeners.is_empty() {
            return;
        }

        let value = self.current_value(&key);
        tracing::debug!(
            "Delivering '{}' = '{}' to {} listener(s)",
            key,
            value,
            listeners.len()
        );
        for listener in listeners {
            listener.on_setting_changed(&key, &value);
        }
    }

    /// Delivers the current value of `key` outside the dispatch thread.
    ///
    /// `seen` is the key's change count from before the read. If a change was
    /// dispatched meanwhile, the value just delivered may be older than the
    /// dispatched one, so it is read and delivered again.
    fn deliver_current(
        &self,
        key: &SettingKey,
        listeners: &[Arc<dyn SettingsListener>],
        mut seen: u64,
    ) {
        loop {
            let value = self.current_value(key);
            for listener in listeners {
                listener.on_setting_changed(key, &value);
            }

            let now = self.registry().version(key);
            if now == seen {
                return;
            }
            tracing::debug!("'{}' changed during delivery, delivering again", key);
            seen = now;
        }
    }
}

/// Observes settings in a [`SettingsStore`] and dispatches changes to listeners.
///
/// Registration may happen from any thread. Change notifications are handled
/// on one background thread owned by the observer; it is stopped when the
/// observer is dropped or [`shutdown`](Self::shutdown) is called.
///
/// # Examples
///
/// ```rust
/// use settings_observer::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// # fn main() -> Result<()> {
/// let store = Arc::new(MemoryStore::new());
/// let observer = SettingsObserver::new(Arc::clone(&store))?;
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let seen_clone = Arc::clone(&seen);
/// let listener: Arc<dyn SettingsListener> = Arc::new(move |key: &SettingKey, value: &str| {
///     seen_clone.lock().unwrap().push(format!("{key}={value}"));
/// });
///
/// let registration = Registration::system().with_value_type(ValueType::Int).with_default(100);
/// observer.register(listener, "screen_brightness", registration)?;
///
/// // The current value is delivered right away
/// assert_eq!(*seen.lock().unwrap(), vec!["screen_brightness=100".to_string()]);
/// # Ok(())
/// # }
/// ```
pub struct SettingsObserver<S: SettingsStore + 'static> {
    shared: Arc<Shared<S>>,
    dispatcher: Dispatcher,
}

impl<S: SettingsStore + 'static> SettingsObserver<S> {
    /// Creates an observer over `store` and starts its dispatch thread.
    pub fn new(store: S) -> Result<Self> {
        Self::builder(store).build()
    }

    /// Creates an observer builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use settings_observer::prelude::*;
    ///
    /// # fn main() -> Result<()> {
    /// let observer = SettingsObserver::builder(MemoryStore::new())
    ///     .with_current_user(UserId(10))
    ///     .with_thread_name("my-settings")
    ///     .build()?;
    /// assert_eq!(observer.current_user(), UserId(10));
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder(store: S) -> SettingsObserverBuilder<S> {
        SettingsObserverBuilder::new(store)
    }

    /// Watches `key` with the options in `registration` and adds `listener` to it.
    ///
    /// The first registration of a key records its namespace, value type,
    /// default and user. A later registration that differs in any of them is
    /// rejected: it is logged and `SettingsError::RegistrationConflict` is
    /// returned without changing anything.
    ///
    /// On success the key's URI is subscribed (once per key) and `listener`
    /// receives the current value before this method returns. When a change of
    /// the key is dispatched while that value is read, the value is read and
    /// delivered again so the last delivery is never older than the store.
    pub fn register(
        &self,
        listener: Arc<dyn SettingsListener>,
        key: impl Into<SettingKey>,
        registration: Registration,
    ) -> Result<()> {
        let key = key.into();

        let added = {
            let mut registry = self.shared.registry_mut();
            registry.add(&key, &registration, Arc::clone(&listener))
        };
        let added = match added {
            Ok(added) => added,
            Err(e) => {
                tracing::error!("Registration of '{}' rejected: {}", key, e);
                return Err(e);
            }
        };

        tracing::debug!(
            "Registered listener for '{}' (namespace={}, type={}, user={:?})",
            key,
            registration.namespace(),
            registration.value_type(),
            registration.user()
        );

        if added.newly_listening {
            if let Err(e) = self.shared.subscribe(&added.uri) {
                tracing::warn!(
                    "Failed to subscribe to '{}' on store '{}': {}",
                    added.uri,
                    self.shared.store.name(),
                    e
                );
                self.shared.registry_mut().forget_uri(&added.uri);
            }
        }

        self.shared.deliver_current(&key, &[listener], added.version);
        Ok(())
    }

    /// Registers `listener` for each of `keys` with the same options.
    ///
    /// Stops at the first key whose registration conflicts; keys before it
    /// stay registered.
    pub fn register_all<I, K>(
        &self,
        listener: Arc<dyn SettingsListener>,
        keys: I,
        registration: Registration,
    ) -> Result<()>
    where
        I: IntoIterator<Item = K>,
        K: Into<SettingKey>,
    {
        for key in keys {
            self.register(Arc::clone(&listener), key, registration.clone())?;
        }
        Ok(())
    }

    /// Removes `listener` from every key it was registered for.
    ///
    /// Subscriptions at the store stay active. Returns the number of keys the
    /// listener was removed from.
    pub fn unregister(&self, listener: &Arc<dyn SettingsListener>) -> usize {
        let removed = self
            .shared
            .registry_mut()
            .remove_listener(ListenerId::of(listener));
        tracing::debug!("Removed listener from {} key(s)", removed);
        removed
    }

    /// Handles a change notification for `uri` on the calling thread.
    ///
    /// The store's notifications reach this through the dispatch thread;
    /// calling it directly is useful when an adapter delivers notifications
    /// some other way. Unknown URIs are ignored.
    pub fn on_change(&self, uri: &SettingUri) {
        self.shared.on_change(uri);
    }

    /// Re-reads every watched key and delivers its value to all of its listeners.
    pub fn reload_all(&self) {
        let keys = self.shared.registry().keys();
        for key in keys {
            let (listeners, version) = {
                let registry = self.shared.registry();
                (registry.listeners(&key), registry.version(&key))
            };
            if listeners.is_empty() {
                continue;
            }
            tracing::debug!("Reloading '{}' for {} listener(s)", key, listeners.len());
            self.shared.deliver_current(&key, &listeners, version);
        }
    }

    /// Drops and re-creates every store subscription.
    ///
    /// Failures are logged; the remaining URIs are still processed.
    pub fn resubscribe_all(&self) {
        let uris = self.shared.registry().uris();
        for uri in uris {
            if let Err(e) = self.shared.store.unsubscribe(&uri) {
                tracing::warn!("Failed to unsubscribe from '{}': {}", uri, e);
            }
            if let Err(e) = self.shared.subscribe(&uri) {
                tracing::warn!("Failed to resubscribe to '{}': {}", uri, e);
            }
        }
    }

    /// Reads `key` as a string, returning `default` when it does not exist.
    ///
    /// Uses the user recorded for `key` when it is watched in `namespace`.
    pub fn get_value(
        &self,
        key: impl Into<SettingKey>,
        namespace: Namespace,
        default: &str,
    ) -> Result<String> {
        let key = key.into();
        let (_, user) = self.shared.scope_for(&key, Some(namespace));
        let value = self.shared.store.read(namespace, &key, user)?;
        Ok(value.map_or_else(|| default.to_string(), String::from))
    }

    /// Reads `key` as an `i32`, returning `default` when it does not exist.
    ///
    /// A stored value that is not an integer is an error.
    pub fn get_int_value(
        &self,
        key: impl Into<SettingKey>,
        namespace: Namespace,
        default: i32,
    ) -> Result<i32> {
        let key = key.into();
        let (_, user) = self.shared.scope_for(&key, Some(namespace));
        match self.shared.store.read(namespace, &key, user)? {
            Some(value) => value.as_i32(key.as_str()),
            None => Ok(default),
        }
    }

    /// Writes a string value. Returns whether the store accepted it.
    pub fn set_value(
        &self,
        key: impl Into<SettingKey>,
        value: &str,
        namespace: Namespace,
    ) -> Result<bool> {
        self.write(key.into(), SettingValue::from(value), namespace)
    }

    /// Writes an integer value. Returns whether the store accepted it.
    pub fn set_int_value(
        &self,
        key: impl Into<SettingKey>,
        value: i32,
        namespace: Namespace,
    ) -> Result<bool> {
        self.write(key.into(), SettingValue::from(value), namespace)
    }

    fn write(&self, key: SettingKey, value: SettingValue, namespace: Namespace) -> Result<bool> {
        let (_, user) = self.shared.scope_for(&key, Some(namespace));
        let written = self.shared.store.write(namespace, &key, value, user)?;
        if !written {
            tracing::warn!(
                "Store '{}' refused write of '{}' in {}",
                self.shared.store.name(),
                key,
                namespace
            );
        }
        Ok(written)
    }

    /// The registration recorded for `key`, if it is watched.
    pub fn registration(&self, key: &str) -> Option<Registration> {
        self.shared.registry().record(key).cloned()
    }

    /// Every key that has been registered, sorted.
    pub fn watched_keys(&self) -> Vec<SettingKey> {
        self.shared.registry().keys()
    }

    /// Number of listeners currently registered for `key`.
    pub fn listener_count(&self, key: &str) -> usize {
        self.shared.registry().listener_count(key)
    }

    /// The user keys without an explicit user scope are read for.
    pub fn current_user(&self) -> UserId {
        self.shared.current_user
    }

    /// The store this observer reads from.
    pub fn store(&self) -> &S {
        &self.shared.store
    }

    /// Stops the dispatch thread after it has delivered queued changes.
    ///
    /// Later store notifications are dropped; direct calls keep working.
    pub fn shutdown(&mut self) -> Result<()> {
        self.dispatcher.stop()
    }
}

/// Builder for constructing a `SettingsObserver`.
pub struct SettingsObserverBuilder<S> {
    store: S,
    current_user: UserId,
    thread_name: String,
}

impl<S: SettingsStore + 'static> SettingsObserverBuilder<S> {
    /// Creates a builder over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            current_user: UserId::CURRENT,
            thread_name: DEFAULT_DISPATCH_THREAD.to_string(),
        }
    }

    /// Sets the user keys without an explicit user scope are read for.
    pub fn with_current_user(mut self, user: UserId) -> Self {
        self.current_user = user;
        self
    }

    /// Sets the name of the dispatch thread.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Builds the observer and starts its dispatch thread.
    pub fn build(self) -> Result<SettingsObserver<S>> {
        let mut dispatcher = Dispatcher::new();
        let shared = Arc::new(Shared {
            store: self.store,
            registry: RwLock::new(Registry::default()),
            current_user: self.current_user,
            notify_tx: Mutex::new(dispatcher.sender()),
        });

        let weak: Weak<Shared<S>> = Arc::downgrade(&shared);
        dispatcher.start(&self.thread_name, move |uri| {
            if let Some(shared) = weak.upgrade() {
                shared.on_change(uri);
            }
        })?;

        tracing::debug!(
            "Settings observer started on store '{}' (user={}, thread={})",
            shared.store.name(),
            self.current_user,
            self.thread_name
        );

        Ok(SettingsObserver { shared, dispatcher })
    }
}

impl<S: SettingsStore + 'static> std::fmt::Debug for SettingsObserver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsObserver")
            .field("store", &self.shared.store.name())
            .field("current_user", &self.shared.current_user)
            .field("watched_keys", &self.watched_keys())
            .finish()
    }
}
