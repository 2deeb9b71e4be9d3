// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the settings observer crate.
//!
//! This module defines the error types that can occur when registering listeners,
//! reading settings from a store or converting stored values to typed values.
//! All errors use `thiserror` for proper error handling and conversion.

use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// The main error type for settings operations.
///
/// Most of these never escape the observer's dispatch path: read failures are
/// logged and degrade to an empty value. They are returned from the direct
/// accessors and from the store ports, and `RegistrationConflict` is returned
/// from `register` after it has been logged.
///
/// # Examples
///
/// ```
/// use settings_observer::domain::errors::SettingsError;
///
/// fn read_brightness() -> Result<String, SettingsError> {
///     Err(SettingsError::store("memory", "store closed"))
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    /// A key was registered again with attributes that differ from the first registration.
    #[error(
        "Registration conflict for key '{key}': {field} already set to {existing}, refusing {requested}"
    )]
    RegistrationConflict {
        /// The key being registered
        key: String,
        /// The attribute that conflicts (value type, default, namespace or user)
        field: &'static str,
        /// The attribute recorded by the first registration
        existing: String,
        /// The attribute requested by the rejected registration
        requested: String,
    },

    /// Failed to convert a stored value to the requested type.
    #[error("Failed to convert setting '{key}' to type {target_type}: {source}")]
    TypeConversionError {
        /// The key being converted
        key: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An error occurred in a settings store.
    #[error("Settings store '{store_name}' error: {message}")]
    StoreError {
        /// The name of the store that encountered the error
        store_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to parse a settings document.
    #[error("Failed to parse settings: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error occurred in a file watcher or in the dispatch thread.
    #[error("Settings watcher error: {message}")]
    WatcherError {
        /// The error message
        message: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An I/O error occurred while reading or writing settings.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SettingsError {
    /// Creates a TypeConversionError from a ParseIntError.
    pub fn from_parse_int_error(key: String, err: ParseIntError) -> Self {
        SettingsError::TypeConversionError {
            key,
            target_type: "integer".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a TypeConversionError from a ParseFloatError.
    pub fn from_parse_float_error(key: String, err: ParseFloatError) -> Self {
        SettingsError::TypeConversionError {
            key,
            target_type: "float".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a StoreError without an underlying cause.
    pub fn store(store_name: impl Into<String>, message: impl Into<String>) -> Self {
        SettingsError::StoreError {
            store_name: store_name.into(),
            message: message.into(),
            source: None,
        }
    }
}

/// A specialized Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_conflict_error() {
        let error = SettingsError::RegistrationConflict {
            key: "screen_brightness".to_string(),
            field: "value type",
            existing: "int".to_string(),
            requested: "float".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Registration conflict for key 'screen_brightness': value type already set to int, refusing float"
        );
    }

    #[test]
    fn test_type_conversion_error() {
        let source_error = "bright".parse::<i32>().unwrap_err();
        let error = SettingsError::TypeConversionError {
            key: "screen_brightness".to_string(),
            target_type: "i32".to_string(),
            source: Box::new(source_error),
        };
        assert!(error.to_string().contains("screen_brightness"));
        assert!(error.to_string().contains("i32"));
    }

    #[test]
    fn test_store_error() {
        let error = SettingsError::store("memory", "store closed");
        assert_eq!(
            error.to_string(),
            "Settings store 'memory' error: store closed"
        );
    }

    #[test]
    fn test_parse_error() {
        let error = SettingsError::ParseError {
            message: "Invalid YAML".to_string(),
            source: None,
        };
        assert_eq!(error.to_string(), "Failed to parse settings: Invalid YAML");
    }

    #[test]
    fn test_watcher_error() {
        let error = SettingsError::WatcherError {
            message: "File watcher failed".to_string(),
            source: None,
        };
        assert_eq!(
            error.to_string(),
            "Settings watcher error: File watcher failed"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = SettingsError::from(io_error);
        assert!(matches!(error, SettingsError::IoError(_)));
    }

    #[test]
    fn test_from_parse_int_error() {
        let parse_err = "not_a_number".parse::<i64>().unwrap_err();
        let error = SettingsError::from_parse_int_error("test.key".to_string(), parse_err);
        assert!(matches!(error, SettingsError::TypeConversionError { .. }));
        assert!(error.to_string().contains("integer"));
    }

    #[test]
    fn test_from_parse_float_error() {
        let parse_err = "not_a_float".parse::<f32>().unwrap_err();
        let error = SettingsError::from_parse_float_error("test.key".to_string(), parse_err);
        assert!(matches!(error, SettingsError::TypeConversionError { .. }));
        assert!(error.to_string().contains("float"));
    }
}
