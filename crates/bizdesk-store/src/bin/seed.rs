//! # Seed Data Writer
//!
//! Writes the default dataset (demo catalog, categories, roster, business
//! config, closed register, empty orders and customers) to a data
//! directory.
//!
//! ## Usage
//! ```bash
//! # Platform data directory
//! cargo run -p bizdesk-store --bin seed
//!
//! # Specific directory
//! cargo run -p bizdesk-store --bin seed -- --dir ./data
//! ```
//!
//! Documents that already exist and parse are kept as they are; only
//! missing or corrupt ones are replaced by defaults.

use std::env;

use bizdesk_store::{LocalStore, StoreConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = StoreConfig::default_location()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--dir" => {
                if let Some(dir) = args.get(i + 1) {
                    config = StoreConfig::new(dir);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: seed [--dir <path>]");
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("Seeding bizdesk data");
    println!("  Directory: {}", config.data_dir.display());

    let store = LocalStore::open(config)?;
    store.flush_all()?;

    let items = store.catalog().list()?;
    let team = store.team().list()?;
    println!();
    println!("✓ Catalog items: {}", items.len());
    println!("✓ Team members:  {}", team.len());
    for member in &team {
        println!("    {:<10} {:?}  PIN {}", member.name, member.role, member.pin);
    }
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
