//! Helper functions for filename handling, logging, and output directories.

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Derive the sub-category label from an archive file stem.
///
/// The generator names files `{sub_category}_news.html` with any `/` in the
/// sub-category replaced by `_`, so derivation strips the `_news` suffix and
/// maps underscores back: `금융_증권_news` → `금융/증권`.
///
/// Returns `None` for an empty stem.
pub fn sub_category_from_file_name(stem: &str) -> Option<String> {
    let stem = stem.strip_suffix("_news").unwrap_or(stem);
    if stem.is_empty() {
        None
    } else {
        Some(stem.replace('_', "/"))
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (rounded down to a
/// character boundary, since the archive text is Korean) with an ellipsis
/// and byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
