//! `memory-list` — list collections or the entries of one collection.
//!
//! ```bash
//! memory-list                    # all collections with counts
//! memory-list knowledge --limit 10
//! ```

use chrono::DateTime;
use clap::Parser;
use nanomem::models::{Collection, snippet};
use nanomem::store::{ChromaStore, MemoryStore};
use nanomem::{MemoryConfig, observability};
use std::process::ExitCode;

/// List vector-store collections and entries.
#[derive(Parser)]
#[command(name = "memory-list", version, about)]
struct Cli {
    /// Collection to list; omit to list all collections.
    collection: Option<String>,

    /// Maximum entries to list.
    #[arg(long, default_value_t = 20)]
    limit: usize,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    observability::init(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = MemoryConfig::load();
    let store = ChromaStore::from_config(&config);

    match &cli.collection {
        Some(name) => list_entries(&store, name, cli.limit),
        None => list_collections(&store),
    }
}

fn list_collections(store: &dyn MemoryStore) -> anyhow::Result<()> {
    let infos = store.collections()?;

    if infos.is_empty() {
        println!("No collections found.");
        return Ok(());
    }

    println!("{:<20} {:<10}", "Collection", "Documents");
    println!("{}", "-".repeat(30));
    for info in infos {
        println!("{:<20} {:<10}", info.name, info.count);
    }

    Ok(())
}

fn list_entries(store: &dyn MemoryStore, name: &str, limit: usize) -> anyhow::Result<()> {
    let collection = Collection::parse(name)?;
    let entries = store.entries(collection, limit)?;

    if entries.is_empty() {
        println!("No entries in '{collection}'.");
        return Ok(());
    }

    for entry in entries {
        let mut header = format!("[{}]", entry.id);
        if let Some(metadata) = &entry.metadata {
            if let Some(ts) = metadata.timestamp.and_then(format_timestamp) {
                header.push_str(&format!(" {ts}"));
            }
            if let Some(tags) = metadata.tags.as_deref().filter(|t| !t.is_empty()) {
                header.push_str(&format!(" tags={tags}"));
            }
            if let Some(importance) = metadata.importance {
                header.push_str(&format!(" imp={importance}"));
            }
        }
        println!("{header}");
        println!("  {}", snippet(entry.document.as_deref().unwrap_or_default()));
        println!();
    }

    Ok(())
}

/// Renders an epoch timestamp as a UTC date, or `None` if out of range.
fn format_timestamp(epoch_secs: u64) -> Option<String> {
    let secs = i64::try_from(epoch_secs).ok()?;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}
