// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared helpers for the integration tests.

#![allow(dead_code)]

use settings_observer::domain::{
    Namespace, Result, SettingKey, SettingUri, SettingValue, SettingsError, UserId,
};
use settings_observer::ports::{ChangeCallback, SettingsListener, SettingsStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// A store with switchable failures and call counters.
#[derive(Default)]
pub struct MockStore {
    values: Mutex<HashMap<(Namespace, UserId, String), String>>,
    subscribers: Mutex<HashMap<SettingUri, ChangeCallback>>,
    fail_reads: AtomicBool,
    fail_subscribe: AtomicBool,
    refuse_writes: AtomicBool,
    stall_next_read: Mutex<Option<Duration>>,
    pub read_calls: AtomicUsize,
    pub subscribe_calls: AtomicUsize,
    pub unsubscribe_calls: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value for the current user without notifying.
    pub fn set(&self, namespace: Namespace, key: &str, value: &str) {
        self.set_for(namespace, key, value, UserId::CURRENT);
    }

    /// Sets a value for `user` without notifying.
    pub fn set_for(&self, namespace: Namespace, key: &str, value: &str, user: UserId) {
        self.values
            .lock()
            .unwrap()
            .insert((namespace, user, key.to_string()), value.to_string());
    }

    pub fn get_for(&self, namespace: Namespace, key: &str, user: UserId) -> Option<String> {
        self.values
            .lock()
            .unwrap()
            .get(&(namespace, user, key.to_string()))
            .cloned()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    pub fn refuse_writes(&self, refuse: bool) {
        self.refuse_writes.store(refuse, Ordering::SeqCst);
    }

    /// Makes the next read return its value only after `delay`.
    ///
    /// The value is taken before the delay, so a write made meanwhile is
    /// not seen by that read.
    pub fn stall_next_read(&self, delay: Duration) {
        *self.stall_next_read.lock().unwrap() = Some(delay);
    }

    pub fn is_subscribed(&self, uri: &SettingUri) -> bool {
        self.subscribers.lock().unwrap().contains_key(uri)
    }

    /// Fires the subscriber of `uri` the way a platform store would.
    pub fn notify(&self, uri: &SettingUri) -> bool {
        let callback = self.subscribers.lock().unwrap().get(uri).cloned();
        match callback {
            Some(callback) => {
                callback(uri);
                true
            }
            None => false,
        }
    }
}

impl SettingsStore for MockStore {
    fn name(&self) -> &str {
        "mock"
    }

    fn read(
        &self,
        namespace: Namespace,
        key: &SettingKey,
        user: UserId,
    ) -> Result<Option<SettingValue>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SettingsError::store("mock", "read failed"));
        }
        let value = self.get_for(namespace, key.as_str(), user);
        let stall = self.stall_next_read.lock().unwrap().take();
        if let Some(delay) = stall {
            thread::sleep(delay);
        }
        Ok(value.map(SettingValue::from))
    }

    fn write(
        &self,
        namespace: Namespace,
        key: &SettingKey,
        value: SettingValue,
        user: UserId,
    ) -> Result<bool> {
        if self.refuse_writes.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.set_for(namespace, key.as_str(), value.as_str(), user);
        self.notify(&namespace.uri_for(key));
        Ok(true)
    }

    fn subscribe(&self, uri: &SettingUri, callback: ChangeCallback) -> Result<()> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(SettingsError::store("mock", "subscribe failed"));
        }
        self.subscribers.lock().unwrap().insert(uri.clone(), callback);
        Ok(())
    }

    fn unsubscribe(&self, uri: &SettingUri) -> Result<()> {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        self.subscribers.lock().unwrap().remove(uri);
        Ok(())
    }
}

/// A listener that records every delivery.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<(String, String)>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<(String, String)> {
        self.events.lock().unwrap().clone()
    }

    pub fn values_for(&self, key: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl SettingsListener for Recorder {
    fn on_setting_changed(&self, key: &SettingKey, value: &str) {
        self.events
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
    }
}

/// Creates a recorder and the listener handle that shares its identity.
pub fn recorder() -> (Arc<Recorder>, Arc<dyn SettingsListener>) {
    let recorder = Arc::new(Recorder::default());
    let listener: Arc<dyn SettingsListener> = recorder.clone();
    (recorder, listener)
}

/// Polls `condition` until it holds or two seconds pass.
pub fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}
