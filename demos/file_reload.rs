// SPDX-License-Identifier: MIT OR Apache-2.0

//! Automatic reload example.
//!
//! This example demonstrates:
//! - Watching a YAML settings file for edits
//! - Debouncing bursts of file events
//! - Delivering the changed settings to listeners
//!
//! To run this example:
//! ```bash
//! cargo run --example file_reload --features reload
//!
//! # In another terminal, modify the settings file:
//! echo "system:
//!   screen_brightness: 40" > /tmp/settings.yaml
//! ```

use settings_observer::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    println!("=== Settings Observer: File Reload Example ===\n");

    let path = std::env::temp_dir().join("settings.yaml");
    std::fs::write(&path, "system:\n  screen_brightness: 128\n")?;
    println!("Created settings file at: {:?}", path);

    let store = Arc::new(YamlFileStore::from_file(&path)?);
    let observer = SettingsObserver::new(Arc::clone(&store))?;

    let listener: Arc<dyn SettingsListener> = Arc::new(|key: &SettingKey, value: &str| {
        println!("\n🔄 {} is now '{}'", key, value);
    });
    observer.register(
        listener,
        "screen_brightness",
        Registration::system()
            .with_value_type(ValueType::Int)
            .with_default(100),
    )?;

    // Create a file watcher with a 1-second debounce delay
    let mut watcher = FileWatcher::new(Arc::clone(&store), Some(Duration::from_secs(1)));
    watcher.start()?;

    println!("\nWatching for changes to: {:?}", path);
    println!("Debounce delay: 1 second");
    println!("\nApplication is running for one minute.");

    for i in 1..=30 {
        thread::sleep(Duration::from_secs(2));
        print!(".");
        std::io::Write::flush(&mut std::io::stdout())?;

        if i % 10 == 0 {
            println!();
        }
    }

    println!("\n\n=== Stopping Watcher ===");
    watcher.stop()?;

    println!("Example complete.");

    Ok(())
}
