// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings listener trait definition.
//!
//! This module defines the `SettingsListener` trait, the callback interface
//! through which the observer delivers the current value of a watched key.

use crate::domain::SettingKey;
use std::sync::Arc;

/// A listener for setting changes.
///
/// `on_setting_changed` receives the key and its current value rendered as a
/// string. Missing string settings and values that could not be read arrive as
/// an empty string. Listeners are called from the observer's dispatch thread
/// (and once from the registering thread) and should return quickly.
///
/// Any `Fn(&SettingKey, &str) + Send + Sync` closure is a listener.
///
/// # Examples
///
/// ```rust
/// use settings_observer::ports::SettingsListener;
/// use settings_observer::domain::SettingKey;
///
/// struct Logger;
///
/// impl SettingsListener for Logger {
///     fn on_setting_changed(&self, key: &SettingKey, value: &str) {
///         println!("{key} = {value}");
///     }
/// }
///
/// let closure = |key: &SettingKey, value: &str| println!("{key} -> {value}");
/// closure.on_setting_changed(&SettingKey::from("font_scale"), "1.0");
/// ```
pub trait SettingsListener: Send + Sync {
    /// Called with the current value of `key`.
    fn on_setting_changed(&self, key: &SettingKey, value: &str);
}

impl<F> SettingsListener for F
where
    F: Fn(&SettingKey, &str) + Send + Sync,
{
    fn on_setting_changed(&self, key: &SettingKey, value: &str) {
        self(key, value)
    }
}

/// Identity of a registered listener.
///
/// Two `Arc`s pointing at the same listener share an id; this is what the
/// observer uses for set semantics and removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

impl ListenerId {
    /// Returns the identity of `listener`.
    pub fn of(listener: &Arc<dyn SettingsListener>) -> Self {
        ListenerId(Arc::as_ptr(listener) as *const () as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_is_listener() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let listener = move |key: &SettingKey, value: &str| {
            seen_clone.lock().unwrap().push(format!("{key}={value}"));
        };

        listener.on_setting_changed(&SettingKey::from("adb_enabled"), "1");

        assert_eq!(*seen.lock().unwrap(), vec!["adb_enabled=1".to_string()]);
    }

    #[test]
    fn test_listener_id_follows_arc_identity() {
        let a: Arc<dyn SettingsListener> = Arc::new(|_: &SettingKey, _: &str| {});
        let b: Arc<dyn SettingsListener> = Arc::new(|_: &SettingKey, _: &str| {});
        let a2 = Arc::clone(&a);

        assert_eq!(ListenerId::of(&a), ListenerId::of(&a2));
        assert_ne!(ListenerId::of(&a), ListenerId::of(&b));
    }

    #[test]
    fn test_listener_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SettingsListener>();
    }
}
