// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings namespaces, notification URIs and user scopes.
//!
//! Every setting lives in exactly one of three partitions. A watched key is
//! identified towards the store by a [`SettingUri`] built from its namespace
//! and name, e.g. `content://settings/secure/adb_enabled`.

use crate::domain::errors::SettingsError;
use crate::domain::SettingKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Common prefix of all settings notification URIs.
pub const CONTENT_URI_PREFIX: &str = "content://settings/";

/// One of the three settings partitions.
///
/// # Examples
///
/// ```
/// use settings_observer::domain::Namespace;
///
/// let ns: Namespace = "secure".parse().unwrap();
/// assert_eq!(ns, Namespace::Secure);
/// assert_eq!(ns.as_str(), "secure");
/// assert_eq!(Namespace::default(), Namespace::System);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// User-facing device preferences.
    #[default]
    System,
    /// Preferences the user can only change through the system UI.
    Secure,
    /// Device-wide preferences shared by all users.
    Global,
}

impl Namespace {
    /// All namespaces, in declaration order.
    pub const ALL: [Namespace; 3] = [Namespace::System, Namespace::Secure, Namespace::Global];

    /// Returns the lowercase name used in URIs and documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::System => "system",
            Namespace::Secure => "secure",
            Namespace::Global => "global",
        }
    }

    /// Returns the notification URI for `key` within this namespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use settings_observer::domain::{Namespace, SettingKey};
    ///
    /// let uri = Namespace::Global.uri_for(&SettingKey::from("airplane_mode_on"));
    /// assert_eq!(uri.as_str(), "content://settings/global/airplane_mode_on");
    /// ```
    pub fn uri_for(&self, key: &SettingKey) -> SettingUri {
        SettingUri(format!("{}{}/{}", CONTENT_URI_PREFIX, self.as_str(), key))
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "system" => Ok(Namespace::System),
            "secure" => Ok(Namespace::Secure),
            "global" => Ok(Namespace::Global),
            other => Err(SettingsError::ParseError {
                message: format!("Unknown settings namespace: {}", other),
                source: None,
            }),
        }
    }
}

/// Notification source for a single watched setting.
///
/// The store delivers change notifications identified by these URIs; the
/// observer maps them back to the key that was registered.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SettingUri(String);

impl SettingUri {
    /// Wraps an arbitrary URI string, e.g. one received from a store.
    pub fn new(uri: impl Into<String>) -> Self {
        SettingUri(uri.into())
    }

    /// Returns the URI as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits a settings URI into its namespace and key.
    ///
    /// Returns `None` for URIs that do not follow the
    /// `content://settings/<namespace>/<key>` shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use settings_observer::domain::{Namespace, SettingUri};
    ///
    /// let uri = SettingUri::new("content://settings/secure/adb_enabled");
    /// let (ns, key) = uri.parts().unwrap();
    /// assert_eq!(ns, Namespace::Secure);
    /// assert_eq!(key.as_str(), "adb_enabled");
    ///
    /// assert!(SettingUri::new("file:///tmp/x").parts().is_none());
    /// ```
    pub fn parts(&self) -> Option<(Namespace, SettingKey)> {
        let rest = self.0.strip_prefix(CONTENT_URI_PREFIX)?;
        let (namespace, key) = rest.split_once('/')?;
        if key.is_empty() {
            return None;
        }
        let namespace = namespace.parse().ok()?;
        Some((namespace, SettingKey::from(key)))
    }
}

impl fmt::Display for SettingUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SettingUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// User scope a setting is read from and written to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i32);

impl UserId {
    /// The user the observer runs as.
    pub const CURRENT: UserId = UserId(0);
    /// Every user on the device.
    pub const ALL: UserId = UserId(-1);
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
