//! `memory-store` — store text with metadata in the vector store.
//!
//! ```bash
//! memory-store knowledge "User prefers dark mode" --tags preferences --importance 0.8
//! ```

use clap::Parser;
use nanomem::embedding::EmbedServiceClient;
use nanomem::models::Collection;
use nanomem::services::{StoreRequest, store_memory};
use nanomem::store::ChromaStore;
use nanomem::{MemoryConfig, observability};
use std::process::ExitCode;

/// Store a memory in the vector store.
#[derive(Parser)]
#[command(name = "memory-store", version, about)]
struct Cli {
    /// Target collection: conversations, knowledge, or tasks.
    collection: String,

    /// The text to store.
    text: String,

    /// Comma-separated tags.
    #[arg(long, default_value = "")]
    tags: String,

    /// Source reference (session, channel).
    #[arg(long, default_value = "")]
    source: String,

    /// Importance from 0.0 to 1.0.
    #[arg(long, default_value_t = 0.5)]
    importance: f32,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

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
    let collection = Collection::parse(&cli.collection)?;
    let config = MemoryConfig::load();

    let store = ChromaStore::from_config(&config);
    let embedder = EmbedServiceClient::from_config(&config);

    let outcome = store_memory(
        &store,
        &embedder,
        &StoreRequest {
            collection,
            text: cli.text.clone(),
            tags: cli.tags.clone(),
            source: cli.source.clone(),
            importance: cli.importance,
        },
    )?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("Stored in '{}' (id: {})", outcome.collection, outcome.id);
    }

    Ok(())
}
