//! JSON output generation for the API.
//!
//! Serializes the extracted article list to pretty-printed JSON with the
//! camelCase field names the frontend consumes. The file is rewritten in
//! full on every run; articles are never appended.

use crate::models::NewsArticle;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write the sorted article list to `{json_output_dir}/articles.json`.
///
/// Creates the output directory if necessary.
///
/// # Errors
///
/// Returns an error if serialization, directory creation, or the file write
/// fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_articles(
    articles: &[NewsArticle],
    json_output_dir: &str,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(articles)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(%json_output_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_path = format!("{}/articles.json", json_output_dir.trim_end_matches('/'));
    info!(path = %output_path, "Writing JSON");
    fs::write(&output_path, json).await?;
    info!(path = %output_path, count = articles.len(), "Wrote article JSON file");

    Ok(())
}
