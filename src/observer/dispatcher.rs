// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background dispatch thread.
//!
//! Store notifications may arrive on any thread. They are posted into a
//! channel and handled one at a time on a single named thread, so listeners
//! never run concurrently with each other for change notifications.

use crate::domain::{Result, SettingUri, SettingsError};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// Messages understood by the dispatch thread.
#[derive(Debug)]
pub(crate) enum Dispatch {
    /// A setting changed
    Changed(SettingUri),
    /// Exit the loop
    Stop,
}

/// Owner of the dispatch thread.
#[derive(Debug)]
pub(crate) struct Dispatcher {
    /// Sender side, cloned into every store callback
    tx: Sender<Dispatch>,
    /// Receiver waiting for `start`
    rx: Mutex<Option<Receiver<Dispatch>>>,
    /// Thread handle once started
    handle: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// Creates the channel without starting the thread.
    pub(crate) fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
            handle: None,
        }
    }

    /// A sender that posts into this dispatcher.
    pub(crate) fn sender(&self) -> Sender<Dispatch> {
        self.tx.clone()
    }

    /// Spawns the thread; `handler` is called for every change.
    pub(crate) fn start<F>(&mut self, thread_name: &str, handler: F) -> Result<()>
    where
        F: Fn(&SettingUri) + Send + 'static,
    {
        let rx = self
            .rx
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| SettingsError::WatcherError {
                message: "Dispatcher is already running".to_string(),
                source: None,
            })?;

        let handle = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || {
                while let Ok(message) = rx.recv() {
                    match message {
                        Dispatch::Changed(uri) => handler(&uri),
                        Dispatch::Stop => break,
                    }
                }
                tracing::debug!("Settings dispatch thread exiting");
            })?;

        self.handle = Some(handle);
        Ok(())
    }

    /// Stops the thread and waits for it to finish.
    ///
    /// Changes queued before the stop are still delivered.
    pub(crate) fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        let _ = self.tx.send(Dispatch::Stop);

        // A listener dropping the observer would otherwise join itself
        if handle.thread().id() == thread::current().id() {
            return Ok(());
        }

        handle.join().map_err(|_| SettingsError::WatcherError {
            message: "Failed to join settings dispatch thread".to_string(),
            source: None,
        })
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_dispatch_runs_handler_on_named_thread() {
        let mut dispatcher = Dispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        dispatcher
            .start("dispatch-test", move |uri| {
                let name = thread::current().name().map(str::to_string);
                seen_clone.lock().unwrap().push((uri.to_string(), name));
            })
            .unwrap();

        dispatcher
            .sender()
            .send(Dispatch::Changed(SettingUri::new("content://settings/system/a")))
            .unwrap();
        dispatcher.stop().unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "content://settings/system/a");
        assert_eq!(seen[0].1.as_deref(), Some("dispatch-test"));
    }

    #[test]
    fn test_start_twice_fails() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.start("dispatch-test", |_| {}).unwrap();
        assert!(dispatcher.start("dispatch-test", |_| {}).is_err());
    }

    #[test]
    fn test_stop_without_start_is_ok() {
        let mut dispatcher = Dispatcher::new();
        assert!(dispatcher.stop().is_ok());
    }

    #[test]
    fn test_messages_after_stop_are_dropped() {
        let mut dispatcher = Dispatcher::new();
        let count = Arc::new(Mutex::new(0));
        let count_clone = Arc::clone(&count);
        dispatcher
            .start("dispatch-test", move |_| *count_clone.lock().unwrap() += 1)
            .unwrap();
        let sender = dispatcher.sender();
        dispatcher.stop().unwrap();

        // receiver is gone once the thread exits
        assert!(sender
            .send(Dispatch::Changed(SettingUri::new("content://settings/system/a")))
            .is_err());
        assert_eq!(*count.lock().unwrap(), 0);
    }
}
