// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic usage example for the settings observer.
//!
//! This example demonstrates:
//! - Creating an observer over the in-memory store
//! - Registering listeners with a value type and a default
//! - Receiving changes on the dispatch thread
//! - Reading and writing settings directly
//!
//! To run this example:
//! ```bash
//! cargo run --example basic_usage
//! ```

use settings_observer::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== Settings Observer: Basic Usage ===\n");

    let store = Arc::new(
        MemoryStore::new()
            .with_value(Namespace::System, "font_scale", "1.0")
            .with_value(Namespace::Global, "device_name", "pixel"),
    );
    let observer = SettingsObserver::new(Arc::clone(&store))?;

    let listener: Arc<dyn SettingsListener> = Arc::new(|key: &SettingKey, value: &str| {
        let thread_name = thread::current().name().unwrap_or("?").to_string();
        println!("  [{}] {} = '{}'", thread_name, key, value);
    });

    // Example 1: Registration delivers the current value immediately
    println!("--- Example 1: Registering ---");
    observer.register(
        Arc::clone(&listener),
        "font_scale",
        Registration::system().with_value_type(ValueType::Float),
    )?;
    observer.register(
        Arc::clone(&listener),
        "screen_brightness",
        Registration::system()
            .with_value_type(ValueType::Int)
            .with_default(100),
    )?;
    observer.register_all(
        Arc::clone(&listener),
        ["device_name", "airplane_mode_on"],
        Registration::global(),
    )?;

    // Example 2: Changes arrive on the dispatch thread
    println!("\n--- Example 2: Changes ---");
    store.put(Namespace::System, "font_scale", "1.15");
    store.put(Namespace::System, "screen_brightness", "180");
    observer.set_value("airplane_mode_on", "1", Namespace::Global)?;
    thread::sleep(Duration::from_millis(100));

    // Example 3: A conflicting registration is rejected
    println!("\n--- Example 3: Conflicts ---");
    match observer.register(
        Arc::clone(&listener),
        "font_scale",
        Registration::system().with_value_type(ValueType::Int),
    ) {
        Ok(()) => println!("✗ Unexpectedly accepted"),
        Err(e) => println!("✓ Rejected: {}", e),
    }

    // Example 4: Direct access
    println!("\n--- Example 4: Getters ---");
    let brightness = observer.get_int_value("screen_brightness", Namespace::System, 0)?;
    println!("✓ screen_brightness: {}", brightness);
    let name = observer.get_value("device_name", Namespace::Global, "unknown")?;
    println!("✓ device_name: {}", name);
    let missing = observer.get_value("lock_screen_owner_info", Namespace::Secure, "<none>")?;
    println!("✓ lock_screen_owner_info: {}", missing);

    println!("\nWatched keys: {:?}", observer.watched_keys());

    // Example 5: Unregistering
    println!("\n--- Example 5: Unregistering ---");
    let removed = observer.unregister(&listener);
    println!("✓ Listener removed from {} key(s)", removed);
    store.put(Namespace::System, "font_scale", "2.0");
    thread::sleep(Duration::from_millis(100));
    println!("  (no delivery expected)");

    println!("\n=== Example Complete ===");

    Ok(())
}
