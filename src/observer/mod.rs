// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observer layer.
//!
//! This module contains the settings observer, which ties the domain types and
//! the store port together: it records registrations, subscribes to the store
//! and dispatches change notifications to listeners on a background thread.

mod dispatcher;
mod registry;
pub mod settings_observer;

pub use settings_observer::{SettingsObserver, SettingsObserverBuilder, DEFAULT_DISPATCH_THREAD};
