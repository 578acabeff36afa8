//! Debug utility for inspecting the shared app-group store.
//!
//! Prints every key in the namespace, then checks the key names the todo list
//! has been stored under.

use clap::Parser;
use simplist_core::{decode, SharedStore, StorageConfig, WidgetConfig, LEGACY_TODOS_KEYS};

#[derive(Parser)]
#[command(name = "check-defaults")]
#[command(about = "Inspect the SimpList shared app-group store")]
struct Args {
    /// App group to inspect (defaults to the configured one)
    #[arg(long)]
    app_group: Option<String>,

    /// Extra keys to check besides the configured and legacy todo keys
    #[arg(value_name = "KEY")]
    keys: Vec<String>,
}

fn main() {
    let args = Args::parse();

    let storage = match StorageConfig::from_env() {
        Ok(storage) => storage,
        Err(err) => {
            eprintln!("Unable to resolve storage root: {}", err);
            std::process::exit(1);
        }
    };
    let config = WidgetConfig::resolve(&storage);
    let app_group = args.app_group.unwrap_or_else(|| config.app_group.clone());
    let store = SharedStore::open(&storage, &app_group);

    println!("=== Checking Shared App Group Store ===");
    println!("App group: {}", app_group);
    match store.file_path() {
        Some(path) => println!("File: {}", path.display()),
        None => println!("File: (unavailable - invalid app group)"),
    }
    println!();

    let keys = store.keys();
    if keys.is_empty() {
        println!("No keys found or unable to access app group");
    } else {
        println!("All keys found:");
        for key in &keys {
            let versioned = store.get_versioned(key);
            let value = versioned.value.as_deref().unwrap_or("unable to read");
            println!("  - {} (rev {}): {}", key, versioned.revision, value);
        }
    }
    println!();

    let mut checked: Vec<String> = vec![config.todos_key.clone()];
    for key in LEGACY_TODOS_KEYS.iter().map(|k| k.to_string()).chain(args.keys) {
        if !checked.contains(&key) {
            checked.push(key);
        }
    }

    println!("Checking specific keys:");
    for key in &checked {
        match store.get(key) {
            Some(value) => {
                let items = decode(Some(&value));
                println!("  {}: {}", key, value);
                println!("      decoded {} todo item(s)", items.len());
            }
            None => println!("  {}: NOT FOUND", key),
        }
    }
}
