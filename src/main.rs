//! # NewsFlow Extract
//!
//! Extracts news article records from the HTML archive produced by the
//! NewsFlow collection pipeline and hands them to the rendering layer as
//! sorted JSON.
//!
//! ## Usage
//!
//! ```sh
//! newsflow_extract -n ./output -j ./json
//! ```
//!
//! ## Architecture
//!
//! One sequential pass per invocation:
//! 1. **Traversal**: walk `<root>/<category>/*.html` in lexicographic order
//! 2. **Parsing**: recover article records from each file's repeated
//!    article blocks (single-language and multi-language markup)
//! 3. **Sorting**: reliability rank descending, publication date descending
//! 4. **Output**: write `articles.json` or print the list to stdout
//!
//! Extraction never fails the process: unreadable directories or files are
//! logged and skipped, and the worst outcome is an empty article list.

use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod extractor;
mod models;
mod outputs;
mod utils;

use cli::Cli;
use models::DEFAULT_LANGUAGE;
use outputs::json;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("newsflow_extract starting up");

    let args = Cli::parse();
    debug!(?args.news_root, ?args.json_output_dir, %args.language, "Parsed CLI arguments");

    // Early check: ensure the JSON output dir is writable before scanning.
    if let Some(ref json_output_dir) = args.json_output_dir {
        if let Err(e) = ensure_writable_dir(json_output_dir).await {
            error!(
                path = %json_output_dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    // ---- Extract articles ----
    let mut articles = extractor::extract_articles(Path::new(&args.news_root));
    info!(count = articles.len(), "Total articles extracted");

    let per_category = articles.iter().counts_by(|article| article.category.clone());
    for (category, count) in per_category.iter().sorted() {
        info!(%category, count = *count, "Articles per category");
    }

    // ---- Resolve display language ----
    if args.language != DEFAULT_LANGUAGE {
        for article in &mut articles {
            article.localize(&args.language);
        }
        info!(language = %args.language, "Resolved display language for flat fields");
    }

    // ---- Output ----
    match args.json_output_dir {
        Some(ref json_output_dir) => {
            if let Err(e) = json::write_articles(&articles, json_output_dir).await {
                error!(error = %e, "Failed to write article JSON");
                return Err(e);
            }
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&articles)?);
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        articles = articles.len(),
        "Execution complete"
    );

    Ok(())
}
