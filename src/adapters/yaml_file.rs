// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML file settings store adapter.
//!
//! This module provides a store that keeps settings in a YAML document with
//! one mapping per namespace:
//!
//! ```yaml
//! system:
//!   screen_brightness: 128
//!   font_scale: 1.15
//! secure:
//!   adb_enabled: 0
//! global:
//!   airplane_mode_on: 0
//! ```
//!
//! Scalar values of any YAML type are stored as strings. The file holds a
//! single user's settings; the user argument of the store methods is ignored.

use crate::domain::{Namespace, Result, SettingKey, SettingUri, SettingValue, SettingsError, UserId};
use crate::ports::{ChangeCallback, SettingsStore};
use directories::ProjectDirs;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Maximum allowed size for settings files (10MB)
const MAX_YAML_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default file name used by `from_default_location`.
pub const DEFAULT_SETTINGS_FILE: &str = "settings.yaml";

const STORE_NAME: &str = "yaml-file";

/// Parsed settings: namespace -> key -> raw value.
type Document = BTreeMap<Namespace, BTreeMap<String, SettingValue>>;

/// Parses a settings document.
///
/// An empty document is valid. Unknown namespaces, nested mappings and
/// sequences are rejected; `null` values are treated as missing.
///
/// # Examples
///
/// ```rust
/// use settings_observer::adapters::yaml_file::parse_document;
/// use settings_observer::domain::Namespace;
///
/// let doc = parse_document("system:\n  screen_brightness: 128\n").unwrap();
/// assert_eq!(doc[&Namespace::System]["screen_brightness"].as_str(), "128");
/// ```
pub fn parse_document(
    content: &str,
) -> Result<BTreeMap<Namespace, BTreeMap<String, SettingValue>>> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| SettingsError::ParseError {
            message: format!("Failed to parse YAML: {}", e),
            source: Some(Box::new(e)),
        })?;

    let mut document = Document::new();
    let root = match value {
        serde_yaml::Value::Null => return Ok(document),
        serde_yaml::Value::Mapping(map) => map,
        _ => {
            return Err(SettingsError::ParseError {
                message: "Settings document must be a mapping of namespaces".to_string(),
                source: None,
            })
        }
    };

    for (name, entries) in root {
        let name = name.as_str().ok_or_else(|| SettingsError::ParseError {
            message: "Namespace names must be strings".to_string(),
            source: None,
        })?;
        let namespace: Namespace = name.parse()?;
        let values = document.entry(namespace).or_default();

        let entries = match entries {
            serde_yaml::Value::Null => continue,
            serde_yaml::Value::Mapping(entries) => entries,
            _ => {
                return Err(SettingsError::ParseError {
                    message: format!("Namespace '{}' must be a mapping", name),
                    source: None,
                })
            }
        };

        for (key, value) in entries {
            let key = match key {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                _ => {
                    return Err(SettingsError::ParseError {
                        message: format!("Invalid key in namespace '{}'", name),
                        source: None,
                    })
                }
            };
            let value = match value {
                serde_yaml::Value::Null => continue,
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(SettingsError::ParseError {
                        message: format!("Setting '{}.{}' must be a scalar", name, key),
                        source: None,
                    })
                }
            };
            values.insert(key, SettingValue::from(value));
        }
    }

    Ok(document)
}

fn file_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
}

fn read_document(path: &Path) -> Result<Document> {
    let metadata = fs::metadata(path).map_err(|e| SettingsError::StoreError {
        store_name: STORE_NAME.to_string(),
        message: format!("Failed to read file metadata: {}", file_name(path)),
        source: Some(Box::new(e)),
    })?;

    if metadata.len() > MAX_YAML_FILE_SIZE {
        return Err(SettingsError::store(
            STORE_NAME,
            format!(
                "Settings file too large: {} bytes (max {} bytes)",
                metadata.len(),
                MAX_YAML_FILE_SIZE
            ),
        ));
    }

    let content = fs::read_to_string(path).map_err(|e| SettingsError::StoreError {
        store_name: STORE_NAME.to_string(),
        message: format!("Failed to read settings file: {}", file_name(path)),
        source: Some(Box::new(e)),
    })?;

    parse_document(&content)
}

/// Settings store backed by a YAML file.
///
/// Reads are served from memory. Writes update memory, rewrite the file and
/// notify the subscriber of the written URI. Edits made to the file by other
/// processes are picked up by [`reload`](Self::reload), which the
/// `FileWatcher` (feature `reload`) calls automatically.
///
/// # Examples
///
/// ```rust,no_run
/// use settings_observer::adapters::YamlFileStore;
///
/// // Load from a specific file
/// let store = YamlFileStore::from_file("/path/to/settings.yaml").unwrap();
///
/// // Load from default OS location, creating the file if needed
/// let store = YamlFileStore::from_default_location("myapp", "com.example").unwrap();
/// ```
pub struct YamlFileStore {
    /// Path to the YAML file
    file_path: PathBuf,
    /// Parsed settings
    document: RwLock<Document>,
    /// One callback per subscribed URI
    subscribers: RwLock<HashMap<SettingUri, ChangeCallback>>,
}

impl YamlFileStore {
    /// Opens an existing settings file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();

        let canonical_path = file_path
            .canonicalize()
            .map_err(|e| SettingsError::StoreError {
                store_name: STORE_NAME.to_string(),
                message: format!("Invalid or inaccessible path: {}", file_name(&file_path)),
                source: Some(Box::new(e)),
            })?;

        let document = read_document(&canonical_path)?;
        tracing::debug!(
            "Loaded {} setting(s) from {}",
            document.values().map(BTreeMap::len).sum::<usize>(),
            canonical_path.display()
        );

        Ok(Self {
            file_path: canonical_path,
            document: RwLock::new(document),
            subscribers: RwLock::new(HashMap::new()),
        })
    }

    /// Opens a settings file, creating an empty one (and its directory) first
    /// when it does not exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, "")?;
            tracing::debug!("Created empty settings file {}", path.display());
        }
        Self::from_file(path)
    }

    /// Opens `settings.yaml` in the OS-appropriate configuration directory.
    ///
    /// # Arguments
    ///
    /// * `app_name` - The application name (e.g., "myapp")
    /// * `qualifier` - The organization/qualifier (e.g., "com.example")
    pub fn from_default_location(app_name: &str, qualifier: &str) -> Result<Self> {
        Self::with_filename(app_name, qualifier, DEFAULT_SETTINGS_FILE)
    }

    /// Opens `filename` in the OS-appropriate configuration directory.
    pub fn with_filename(app_name: &str, qualifier: &str, filename: &str) -> Result<Self> {
        let proj_dirs = ProjectDirs::from(qualifier, "", app_name).ok_or_else(|| {
            SettingsError::store(STORE_NAME, "Failed to determine project directories")
        })?;

        Self::open_or_create(proj_dirs.config_dir().join(filename))
    }

    /// Returns the path to the settings file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Re-reads the file and notifies subscribers of every setting whose
    /// value changed, appeared or disappeared.
    ///
    /// Returns the URIs that changed. On error the in-memory settings are
    /// left untouched.
    pub fn reload(&self) -> Result<Vec<SettingUri>> {
        let changed = {
            // Held across the read so a concurrent write cannot be reverted
            let mut document = self.document.write().unwrap_or_else(PoisonError::into_inner);
            let fresh = read_document(&self.file_path)?;
            let changed = Self::diff(&document, &fresh);
            *document = fresh;
            changed
        };

        tracing::debug!(
            "Reloaded {}: {} setting(s) changed",
            self.file_path.display(),
            changed.len()
        );
        for uri in &changed {
            self.notify(uri);
        }
        Ok(changed)
    }

    /// URIs whose value differs between two documents.
    fn diff(old: &Document, new: &Document) -> Vec<SettingUri> {
        let empty = BTreeMap::new();
        let mut changed = Vec::new();
        for namespace in Namespace::ALL {
            let before = old.get(&namespace).unwrap_or(&empty);
            let after = new.get(&namespace).unwrap_or(&empty);
            for (key, value) in before {
                if after.get(key) != Some(value) {
                    changed.push(namespace.uri_for(&SettingKey::from(key.as_str())));
                }
            }
            for key in after.keys() {
                if !before.contains_key(key) {
                    changed.push(namespace.uri_for(&SettingKey::from(key.as_str())));
                }
            }
        }
        changed
    }

    fn persist(&self, document: &Document) -> Result<()> {
        let mut out: BTreeMap<&str, BTreeMap<&str, &str>> = BTreeMap::new();
        for (namespace, values) in document {
            out.insert(
                namespace.as_str(),
                values.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect(),
            );
        }
        let content = serde_yaml::to_string(&out).map_err(|e| SettingsError::ParseError {
            message: format!("Failed to serialize settings: {}", e),
            source: Some(Box::new(e)),
        })?;
        fs::write(&self.file_path, content)?;
        Ok(())
    }

    fn notify(&self, uri: &SettingUri) {
        let callback = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uri)
            .cloned();
        if let Some(callback) = callback {
            callback(uri);
        }
    }
}

impl SettingsStore for YamlFileStore {
    fn name(&self) -> &str {
        STORE_NAME
    }

    fn read(
        &self,
        namespace: Namespace,
        key: &SettingKey,
        _user: UserId,
    ) -> Result<Option<SettingValue>> {
        Ok(self
            .document
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&namespace)
            .and_then(|values| values.get(key.as_str()))
            .cloned())
    }

    fn write(
        &self,
        namespace: Namespace,
        key: &SettingKey,
        value: SettingValue,
        _user: UserId,
    ) -> Result<bool> {
        {
            let mut document = self.document.write().unwrap_or_else(PoisonError::into_inner);
            let previous = document
                .entry(namespace)
                .or_default()
                .insert(key.to_string(), value.clone());

            if let Err(e) = self.persist(&document) {
                // Keep memory and file in agreement
                let values = document.entry(namespace).or_default();
                match previous {
                    Some(previous) => values.insert(key.to_string(), previous),
                    None => values.remove(key.as_str()),
                };
                tracing::warn!(
                    "Failed to persist '{}' to {}: {}",
                    key,
                    self.file_path.display(),
                    e
                );
                return Err(e);
            }
        }

        self.notify(&namespace.uri_for(key));
        Ok(true)
    }

    fn subscribe(&self, uri: &SettingUri, callback: ChangeCallback) -> Result<()> {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uri.clone(), callback);
        Ok(())
    }

    fn unsubscribe(&self, uri: &SettingUri) -> Result<()> {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(uri);
        Ok(())
    }
}

impl std::fmt::Debug for YamlFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YamlFileStore")
            .field("file_path", &self.file_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::NamedTempFile;

    fn temp_settings(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn key(s: &str) -> SettingKey {
        SettingKey::from(s)
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse_document("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_scalars_as_strings() {
        let doc = parse_document(
            "system:\n  screen_brightness: 128\n  font_scale: 1.15\n  auto: true\n  name: pixel\n  gone: ~\n",
        )
        .unwrap();
        let system = &doc[&Namespace::System];
        assert_eq!(system["screen_brightness"].as_str(), "128");
        assert_eq!(system["font_scale"].as_str(), "1.15");
        assert_eq!(system["auto"].as_str(), "true");
        assert_eq!(system["name"].as_str(), "pixel");
        assert!(!system.contains_key("gone"));
    }

    #[test]
    fn test_parse_rejects_unknown_namespace() {
        assert!(parse_document("vendor:\n  a: 1\n").is_err());
    }

    #[test]
    fn test_parse_rejects_nested_values() {
        assert!(parse_document("system:\n  a:\n    b: 1\n").is_err());
        assert!(parse_document("system:\n  a: [1, 2]\n").is_err());
        assert!(parse_document("- system\n").is_err());
    }

    #[test]
    fn test_from_file_nonexistent() {
        assert!(YamlFileStore::from_file("/nonexistent/settings.yaml").is_err());
    }

    #[test]
    fn test_read_values() {
        let file = temp_settings("secure:\n  adb_enabled: 1\n");
        let store = YamlFileStore::from_file(file.path()).unwrap();

        let value = store.read(Namespace::Secure, &key("adb_enabled"), UserId::CURRENT).unwrap();
        assert_eq!(value.unwrap().as_str(), "1");
        assert!(store
            .read(Namespace::System, &key("adb_enabled"), UserId::CURRENT)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_write_persists_and_notifies() {
        let file = temp_settings("");
        let store = YamlFileStore::from_file(file.path()).unwrap();
        let uri = Namespace::Global.uri_for(&key("airplane_mode_on"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        store
            .subscribe(
                &uri,
                Arc::new(move |u: &SettingUri| seen_clone.lock().unwrap().push(u.clone())),
            )
            .unwrap();

        assert!(store
            .write(Namespace::Global, &key("airplane_mode_on"), "1".into(), UserId::CURRENT)
            .unwrap());

        assert_eq!(*seen.lock().unwrap(), vec![uri]);
        let reopened = YamlFileStore::from_file(file.path()).unwrap();
        let value = reopened
            .read(Namespace::Global, &key("airplane_mode_on"), UserId::CURRENT)
            .unwrap();
        assert_eq!(value.unwrap().as_str(), "1");
    }

    #[test]
    fn test_reload_reports_only_changes() {
        let file = temp_settings("system:\n  a: 1\n  b: 2\n  c: 3\n");
        let store = YamlFileStore::from_file(file.path()).unwrap();

        fs::write(file.path(), "system:\n  a: 1\n  b: 20\nsecure:\n  d: 4\n").unwrap();
        let mut changed = store.reload().unwrap();
        changed.sort();

        let mut expected = vec![
            Namespace::System.uri_for(&key("b")),
            Namespace::System.uri_for(&key("c")),
            Namespace::Secure.uri_for(&key("d")),
        ];
        expected.sort();
        assert_eq!(changed, expected);
    }

    #[test]
    fn test_reload_error_keeps_values() {
        let file = temp_settings("system:\n  a: 1\n");
        let store = YamlFileStore::from_file(file.path()).unwrap();

        fs::write(file.path(), "system: [broken\n").unwrap();
        assert!(store.reload().is_err());

        let value = store.read(Namespace::System, &key("a"), UserId::CURRENT).unwrap();
        assert_eq!(value.unwrap().as_str(), "1");
    }

    #[test]
    fn test_reload_during_writes_keeps_last_write() {
        let file = temp_settings("system:\n  screen_brightness: 0\n");
        let store = Arc::new(YamlFileStore::from_file(file.path()).unwrap());
        let done = Arc::new(AtomicBool::new(false));

        let reloader = {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                while !done.load(Ordering::SeqCst) {
                    store.reload().unwrap();
                }
            })
        };

        let brightness = key("screen_brightness");
        for n in 1..=200 {
            store
                .write(Namespace::System, &brightness, SettingValue::from(n), UserId::CURRENT)
                .unwrap();
        }
        done.store(true, Ordering::SeqCst);
        reloader.join().unwrap();

        let value = store.read(Namespace::System, &brightness, UserId::CURRENT).unwrap();
        assert_eq!(value.unwrap().as_str(), "200");
    }

    #[test]
    fn test_open_or_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.yaml");

        let store = YamlFileStore::open_or_create(&path).unwrap();

        assert!(path.exists());
        assert_eq!(store.name(), "yaml-file");
    }
}
