// SPDX-License-Identifier: MIT OR Apache-2.0

//! A hexagonal architecture settings observer crate.
//!
//! This crate watches settings that live in one of three namespaces (system,
//! secure and global) and dispatches their values to registered listeners
//! whenever they change. It also offers convenience getters and setters for
//! those settings.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types (`SettingKey`, `SettingValue`, `Namespace`,
//!   `ValueType`, `Registration`, errors)
//! - **Ports**: Trait definitions (`SettingsStore`, `SettingsListener`)
//! - **Adapters**: Store implementations (in-memory, YAML file)
//! - **Observer**: The registry and dispatcher tying everything together
//!
//! # How dispatch works
//!
//! Registering a listener for a key records the key's namespace, value type,
//! default and user scope (first registration wins), subscribes to the key's
//! URI at the store, and immediately delivers the current value. When the
//! store reports a change, the observer's background thread re-reads the
//! value, parses it into the registered type and hands it to every listener of
//! that key. Unreadable or unparsable values are logged and delivered as an
//! empty string.
//!
//! # Feature Flags
//!
//! - `yaml`: Enable the YAML file store (default)
//! - `reload`: Enable reloading the YAML file store when the file changes
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust
//! use settings_observer::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let observer = SettingsObserver::new(Arc::clone(&store))?;
//!
//! let listener: Arc<dyn SettingsListener> = Arc::new(|key: &SettingKey, value: &str| {
//!     println!("{key} is now '{value}'");
//! });
//! observer.register(listener, "font_scale", Registration::system())?;
//!
//! // Delivered on the observer's dispatch thread
//! store.put(Namespace::System, "font_scale", "1.15");
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod observer;
pub mod ports;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::adapters::MemoryStore;
    pub use crate::domain::{
        Namespace, Registration, Result, SettingKey, SettingUri, SettingValue, SettingsError,
        TypedValue, UserId, ValueType,
    };
    pub use crate::observer::{SettingsObserver, SettingsObserverBuilder};
    pub use crate::ports::{ChangeCallback, SettingsListener, SettingsStore};

    // Re-export adapters based on feature flags
    #[cfg(feature = "reload")]
    pub use crate::adapters::FileWatcher;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::YamlFileStore;
}
