//! `memory-search` — semantic search over stored memories.
//!
//! ```bash
//! memory-search "dark mode preference" --collection knowledge --top-k 3
//! memory-search "deploy steps" --strategy files --base-dir ~/agent
//! ```
//!
//! Two strategies: `store` ranks inside the vector-store backend,
//! `files` chunks and ranks markdown documents locally with cached
//! embeddings.

use clap::{Parser, ValueEnum};
use nanomem::embedding::{CachedEmbedder, FilesystemCacheStore, OllamaEmbedder};
use nanomem::models::{SearchHit, SearchOptions};
use nanomem::services::{FileSearch, SearchStrategy, SearchTarget, StoreSearch};
use nanomem::store::ChromaStore;
use nanomem::{MemoryConfig, observability};
use std::path::PathBuf;
use std::process::ExitCode;

/// Search memories semantically.
#[derive(Parser)]
#[command(name = "memory-search", version, about)]
struct Cli {
    /// Search query.
    query: String,

    /// Collection to search, or "all".
    #[arg(long, default_value = "all")]
    collection: String,

    /// Maximum number of results.
    #[arg(long, default_value_t = 5)]
    top_k: usize,

    /// Minimum similarity score.
    #[arg(long, default_value_t = 0.3)]
    min_score: f32,

    /// Retrieval strategy.
    #[arg(long, value_enum, default_value = "store")]
    strategy: Strategy,

    /// Base directory for the files strategy.
    #[arg(long, env = "MEMORY_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

/// Selectable retrieval strategies.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    /// Rank inside the vector-store backend.
    Store,
    /// Chunk and rank local markdown documents.
    Files,
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
    let options = SearchOptions::new()
        .with_top_k(cli.top_k)
        .with_min_score(cli.min_score);

    let embedder = OllamaEmbedder::from_config(&config);

    let hits = match cli.strategy {
        Strategy::Store => {
            let target = SearchTarget::parse(&cli.collection)?;
            let store = ChromaStore::from_config(&config);
            StoreSearch::new(&store, &embedder, target).search(&cli.query, &options)?
        }
        Strategy::Files => {
            let base_dir = cli
                .base_dir
                .clone()
                .unwrap_or_else(|| config.memory_base_dir.clone());
            let cached =
                CachedEmbedder::new(embedder, FilesystemCacheStore::new(&config.cache_dir));
            FileSearch::new(&cached, base_dir).search(&cli.query, &options)?
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No relevant memories found.");
        return Ok(());
    }

    for hit in &hits {
        println!("{}", header_line(hit, cli.strategy));
        println!("  {}", hit.snippet);
        println!();
    }

    Ok(())
}

/// Formats the result header: `[score] source/id` for store hits, whose id
/// is a bare record id, and `[score] path:lines` for file hits, whose id
/// already carries the path.
fn header_line(hit: &SearchHit, strategy: Strategy) -> String {
    let location = match strategy {
        Strategy::Store => format!("{}/{}", hit.source, hit.id),
        Strategy::Files => hit.id.clone(),
    };

    let mut line = format!("[{}] {location}", hit.score);
    if let Some(metadata) = &hit.metadata {
        if let Some(tags) = metadata.tags.as_deref().filter(|t| !t.is_empty()) {
            line.push_str(&format!(" tags={tags}"));
        }
        if let Some(importance) = metadata.importance {
            line.push_str(&format!(" imp={importance}"));
        }
    }
    line
}
