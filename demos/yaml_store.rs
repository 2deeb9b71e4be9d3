// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML file store example.
//!
//! This example demonstrates:
//! - Backing the observer with a YAML settings file
//! - Persisting writes to the file
//! - Reloading the file after it was edited
//!
//! To run this example:
//! ```bash
//! cargo run --example yaml_store --features yaml
//! ```

use settings_observer::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== Settings Observer: YAML Store ===\n");

    let yaml_content = r#"
system:
  font_scale: "1.0"
  screen_brightness: 128
secure:
  adb_enabled: 0
global:
  device_name: pixel
"#;

    let temp_file = tempfile::NamedTempFile::new()?;
    std::fs::write(temp_file.path(), yaml_content)?;
    println!("Created settings file at: {:?}\n", temp_file.path());

    let store = Arc::new(YamlFileStore::from_file(temp_file.path())?);
    let observer = SettingsObserver::new(Arc::clone(&store))?;

    let listener: Arc<dyn SettingsListener> = Arc::new(|key: &SettingKey, value: &str| {
        println!("  {} = '{}'", key, value);
    });

    println!("--- Initial Values ---");
    observer.register(
        Arc::clone(&listener),
        "font_scale",
        Registration::system().with_value_type(ValueType::Float),
    )?;
    observer.register(
        Arc::clone(&listener),
        "screen_brightness",
        Registration::system().with_value_type(ValueType::Int),
    )?;
    observer.register(
        Arc::clone(&listener),
        "adb_enabled",
        Registration::secure().with_value_type(ValueType::Int),
    )?;
    observer.register(Arc::clone(&listener), "device_name", Registration::global())?;

    println!("\n--- Writing Through the Observer ---");
    observer.set_int_value("adb_enabled", 1, Namespace::Secure)?;
    thread::sleep(Duration::from_millis(100));
    println!("File now contains:\n{}", std::fs::read_to_string(temp_file.path())?);

    println!("--- Editing the File and Reloading ---");
    std::fs::write(
        temp_file.path(),
        "system:\n  font_scale: \"1.3\"\n  screen_brightness: 64\nsecure:\n  adb_enabled: 1\n",
    )?;
    let changed = store.reload()?;
    println!("✓ {} setting(s) changed", changed.len());
    thread::sleep(Duration::from_millis(100));

    println!("\n=== Example Complete ===");

    Ok(())
}
