// SPDX-License-Identifier: MIT OR Apache-2.0

//! Watchers that turn external changes into store notifications.

#[cfg(feature = "reload")]
pub mod file_watcher;

#[cfg(feature = "reload")]
pub use file_watcher::FileWatcher;
