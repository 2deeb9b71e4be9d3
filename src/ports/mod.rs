// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the trait definitions (ports) the observer depends on:
//! the settings store it reads from and subscribes to, and the listener
//! interface it delivers values through. Stores are implemented by adapters.

pub mod listener;
pub mod store;

// Re-export commonly used types
pub use listener::{ListenerId, SettingsListener};
pub use store::{ChangeCallback, SettingsStore};
