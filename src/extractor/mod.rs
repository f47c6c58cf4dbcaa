//! Article extraction from the generated HTML news archive.
//!
//! The archive is laid out as `<root>/<category>/<sub_category>_news.html`;
//! one subdirectory per category, one file per sub-category, each file
//! holding repeated article blocks (see [`blocks`]). Extraction is a single
//! sequential scan: directories and files are visited in lexicographic
//! order so repeated runs over an unchanged tree produce identical output,
//! and each file is fully read and parsed before the next one is opened.
//!
//! No error escapes to the caller. An unreadable root yields an empty list,
//! an unreadable file is skipped, and a malformed block is dropped; the
//! worst outcome is a partial result set.

mod blocks;

use crate::models::NewsArticle;
use crate::utils::sub_category_from_file_name;
use scraper::Html;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

/// Scan the archive root and return the full, flattened, sorted article list.
///
/// Output ordering: reliability rank descending, then publication date
/// descending, then encounter order. Duplicate links across files are kept
/// as separate records; deduplication is the caller's decision.
#[instrument(level = "info", skip_all, fields(root = %root.display()))]
pub fn extract_articles(root: &Path) -> Vec<NewsArticle> {
    let category_dirs = match sorted_entries(root) {
        Ok(entries) => entries,
        Err(e) => {
            error!(root = %root.display(), error = %e, "Failed to read archive root");
            return Vec::new();
        }
    };

    let mut articles = Vec::new();
    for dir in category_dirs {
        if !dir.is_dir() {
            continue;
        }
        let Some(category) = dir.file_name().and_then(|name| name.to_str()) else {
            warn!(path = %dir.display(), "Skipping category directory with non-UTF-8 name");
            continue;
        };
        scan_category_dir(&dir, category, &mut articles);
    }

    sort_articles(&mut articles);
    info!(count = articles.len(), "Extraction complete");
    articles
}

/// Sort records by reliability rank, then date, both descending.
///
/// The sort is stable, so records with identical rank and date keep their
/// encounter order. Dates are fixed-width ISO strings, so lexicographic
/// comparison is chronological.
pub fn sort_articles(articles: &mut [NewsArticle]) {
    articles.sort_by(|a, b| {
        b.reliability
            .rank()
            .cmp(&a.reliability.rank())
            .then_with(|| b.date.cmp(&a.date))
    });
}

/// Parse every `.html` file in one category directory.
fn scan_category_dir(dir: &Path, category: &str, out: &mut Vec<NewsArticle>) {
    let entries = match sorted_entries(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Failed to read category directory; skipping");
            return;
        }
    };

    for path in entries {
        if path.extension().and_then(|ext| ext.to_str()) != Some("html") {
            continue;
        }
        // read_to_string scopes the file handle to this iteration.
        let html = match std::fs::read_to_string(&path) {
            Ok(html) => html,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read archive file; skipping");
                continue;
            }
        };
        let sub_category = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(sub_category_from_file_name);

        let document = Html::parse_document(&html);
        let parsed = blocks::parse_document_blocks(&document, category, sub_category.as_deref());
        debug!(
            path = %path.display(),
            category,
            articles = parsed.len(),
            "Scanned archive file"
        );
        out.extend(parsed);
    }
}

/// Directory entries in lexicographic order, for deterministic traversal.
fn sorted_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    paths.sort();
    Ok(paths)
}
