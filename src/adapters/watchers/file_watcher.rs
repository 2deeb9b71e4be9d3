// SPDX-License-Identifier: MIT OR Apache-2.0

//! File system watcher for settings files.
//!
//! This module provides a watcher that monitors a `YamlFileStore`'s file for
//! edits made outside the store and reloads the store when they settle. The
//! store then notifies subscribers of the settings that changed.

use crate::adapters::YamlFileStore;
use crate::domain::{Result, SettingsError};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default quiet period before a reload.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// How often the watch thread checks for a stop request.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Reloads a [`YamlFileStore`] when its file changes on disk.
///
/// Events are debounced: the store is reloaded once no further events for the
/// file arrived during the debounce delay.
///
/// # Examples
///
/// ```rust,no_run
/// use settings_observer::adapters::{FileWatcher, YamlFileStore};
/// use std::sync::Arc;
///
/// # fn main() -> settings_observer::domain::Result<()> {
/// let store = Arc::new(YamlFileStore::from_file("/path/to/settings.yaml")?);
/// let mut watcher = FileWatcher::new(Arc::clone(&store), None);
/// watcher.start()?;
///
/// // Later, stop watching
/// watcher.stop()?;
/// # Ok(())
/// # }
/// ```
pub struct FileWatcher {
    /// Store reloaded on change
    store: Arc<YamlFileStore>,
    /// Debounce delay (default 500ms)
    debounce_delay: Duration,
    /// Internal watcher
    watcher: Option<RecommendedWatcher>,
    /// Thread handle for the watcher thread
    watch_thread: Option<JoinHandle<()>>,
    /// Stop signal sender
    stop_tx: Option<Sender<()>>,
}

impl FileWatcher {
    /// Creates a watcher for `store`'s file. Call [`start`](Self::start) to begin.
    pub fn new(store: Arc<YamlFileStore>, debounce_delay: Option<Duration>) -> Self {
        Self {
            store,
            debounce_delay: debounce_delay.unwrap_or(DEFAULT_DEBOUNCE),
            watcher: None,
            watch_thread: None,
            stop_tx: None,
        }
    }

    /// Returns whether the watcher is running.
    pub fn is_running(&self) -> bool {
        self.watcher.is_some()
    }

    /// Starts watching the file.
    pub fn start(&mut self) -> Result<()> {
        if self.watcher.is_some() {
            return Err(SettingsError::WatcherError {
                message: "Watcher is already running".to_string(),
                source: None,
            });
        }

        let (event_tx, event_rx) = channel();
        let (stop_tx, stop_rx) = channel::<()>();

        let mut watcher =
            RecommendedWatcher::new(event_tx, notify::Config::default()).map_err(|e| {
                SettingsError::WatcherError {
                    message: format!("Failed to create file watcher: {}", e),
                    source: Some(Box::new(e)),
                }
            })?;

        // Editors replace files, so watch the directory rather than the file
        let file_path = self.store.file_path().to_path_buf();
        let watch_path = file_path
            .parent()
            .ok_or_else(|| SettingsError::WatcherError {
                message: "Failed to get parent directory".to_string(),
                source: None,
            })?
            .to_path_buf();

        watcher
            .watch(&watch_path, RecursiveMode::NonRecursive)
            .map_err(|e| SettingsError::WatcherError {
                message: format!("Failed to start watching: {}", e),
                source: Some(Box::new(e)),
            })?;

        let store = Arc::clone(&self.store);
        let debounce_delay = self.debounce_delay;
        let watch_thread = thread::Builder::new()
            .name("settings-file-watch".to_string())
            .spawn(move || watch_loop(store, file_path, event_rx, stop_rx, debounce_delay))?;

        self.watcher = Some(watcher);
        self.stop_tx = Some(stop_tx);
        self.watch_thread = Some(watch_thread);

        tracing::debug!("Watching {}", self.store.file_path().display());
        Ok(())
    }

    /// Stops watching. Pending, not yet debounced changes are discarded.
    pub fn stop(&mut self) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(handle) = self.watch_thread.take() {
            handle.join().map_err(|_| SettingsError::WatcherError {
                message: "Failed to join watcher thread".to_string(),
                source: None,
            })?;
        }

        self.watcher = None;
        Ok(())
    }
}

fn watch_loop(
    store: Arc<YamlFileStore>,
    file_path: PathBuf,
    event_rx: Receiver<notify::Result<Event>>,
    stop_rx: Receiver<()>,
    debounce_delay: Duration,
) {
    let mut last_event: Option<Instant> = None;

    loop {
        if stop_rx.try_recv().is_ok() {
            break;
        }

        match event_rx.recv_timeout(POLL_INTERVAL) {
            Ok(Ok(event)) => {
                if event.paths.iter().any(|p| p == &file_path) {
                    last_event = Some(Instant::now());
                }
            }
            Ok(Err(e)) => tracing::warn!("File watcher error: {}", e),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }

        let settled = last_event
            .map(|at| at.elapsed() >= debounce_delay)
            .unwrap_or(false);
        if settled {
            last_event = None;
            if let Err(e) = store.reload() {
                tracing::warn!("Failed to reload {}: {}", file_path.display(), e);
            }
        }
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("file_path", &self.store.file_path())
            .field("debounce_delay", &self.debounce_delay)
            .field("running", &self.is_running())
            .finish()
    }
}
