// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping tables behind the observer.
//!
//! `Registry` is plain data: which URIs are subscribed and which key each one
//! belongs to, the registration recorded for every key, and the listener set
//! of every key. Locking and store access live in the observer.

use crate::domain::{Registration, Result, SettingKey, SettingUri};
use crate::ports::{ListenerId, SettingsListener};
use std::collections::HashMap;
use std::sync::Arc;

/// Listener set of one key, keyed by listener identity.
pub(crate) type ListenerSet = HashMap<ListenerId, Arc<dyn SettingsListener>>;

/// What `Registry::add` did, so the caller knows whether to subscribe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Added {
    /// The URI the key is observed through
    pub uri: SettingUri,
    /// `true` when the URI was not listened on before this call
    pub newly_listening: bool,
    /// Change count of the key when the listener was added
    pub version: u64,
}

#[derive(Default)]
pub(crate) struct Registry {
    /// Subscribed notification URIs and the key each routes to
    listening_uris: HashMap<SettingUri, SettingKey>,
    /// First registration recorded for each key
    records: HashMap<SettingKey, Registration>,
    /// Listeners per key
    callbacks: HashMap<SettingKey, ListenerSet>,
    /// Number of change notifications handled per key
    versions: HashMap<SettingKey, u64>,
}

impl Registry {
    /// Records `registration` for `key` (or checks it against the recorded one)
    /// and adds `listener` to the key's listener set.
    ///
    /// Nothing is changed when the registration conflicts.
    pub(crate) fn add(
        &mut self,
        key: &SettingKey,
        registration: &Registration,
        listener: Arc<dyn SettingsListener>,
    ) -> Result<Added> {
        match self.records.get(key) {
            Some(existing) => existing.check_compatible(key, registration)?,
            None => {
                self.records.insert(key.clone(), registration.clone());
            }
        }

        self.callbacks
            .entry(key.clone())
            .or_default()
            .insert(ListenerId::of(&listener), listener);

        let uri = registration.namespace().uri_for(key);
        let newly_listening = !self.listening_uris.contains_key(&uri);
        if newly_listening {
            self.listening_uris.insert(uri.clone(), key.clone());
        }

        Ok(Added {
            uri,
            newly_listening,
            version: self.version(key),
        })
    }

    /// Counts a change of `key` and returns the listeners to notify of it.
    ///
    /// The count and the snapshot are taken together, so a listener added
    /// after this call sees the count move.
    pub(crate) fn begin_change(&mut self, key: &SettingKey) -> Vec<Arc<dyn SettingsListener>> {
        *self.versions.entry(key.clone()).or_default() += 1;
        self.listeners(key)
    }

    /// Number of changes of `key` seen so far.
    pub(crate) fn version(&self, key: &SettingKey) -> u64 {
        self.versions.get(key).copied().unwrap_or_default()
    }

    /// Forgets a URI whose subscription failed so the next registration retries it.
    pub(crate) fn forget_uri(&mut self, uri: &SettingUri) {
        self.listening_uris.remove(uri);
    }

    /// Removes `id` from every listener set. Returns how many keys it was removed from.
    pub(crate) fn remove_listener(&mut self, id: ListenerId) -> usize {
        self.callbacks
            .values_mut()
            .filter_map(|set| set.remove(&id))
            .count()
    }

    /// Resolves a notification URI to its key.
    pub(crate) fn key_for(&self, uri: &SettingUri) -> Option<&SettingKey> {
        self.listening_uris.get(uri)
    }

    /// The registration recorded for `key`.
    pub(crate) fn record(&self, key: &str) -> Option<&Registration> {
        self.records.get(key)
    }

    /// A snapshot of the listeners of `key`.
    pub(crate) fn listeners(&self, key: &SettingKey) -> Vec<Arc<dyn SettingsListener>> {
        self.callbacks
            .get(key)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of listeners registered for `key`.
    pub(crate) fn listener_count(&self, key: &str) -> usize {
        self.callbacks.get(key).map_or(0, |set| set.len())
    }

    /// Every key that has a listener set, in sorted order.
    pub(crate) fn keys(&self) -> Vec<SettingKey> {
        let mut keys: Vec<SettingKey> = self.callbacks.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Every subscribed URI.
    pub(crate) fn uris(&self) -> Vec<SettingUri> {
        self.listening_uris.keys().cloned().collect()
    }
}
