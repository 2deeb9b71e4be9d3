// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing settings store implementations.
//!
//! This module contains concrete implementations of the `SettingsStore` port.
//! `MemoryStore` is always available; the YAML file store and its watcher are
//! behind feature flags.

pub mod memory;
#[cfg(feature = "yaml")]
pub mod yaml_file;

pub mod watchers;

// Re-export adapters based on feature flags
pub use memory::MemoryStore;
#[cfg(feature = "reload")]
pub use watchers::FileWatcher;
#[cfg(feature = "yaml")]
pub use yaml_file::YamlFileStore;
