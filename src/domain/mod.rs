// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types.
//!
//! This module contains the core domain types of the settings observer: keys,
//! raw and typed values, namespaces, registrations and errors. It is
//! independent of any store implementation.

pub mod errors;
pub mod namespace;
pub mod registration;
pub mod setting_key;
pub mod setting_value;
pub mod value_type;

// Re-export commonly used types
pub use errors::{Result, SettingsError};
pub use namespace::{Namespace, SettingUri, UserId};
pub use registration::Registration;
pub use setting_key::SettingKey;
pub use setting_value::SettingValue;
pub use value_type::{TypedValue, ValueType};
