//! Command-line interface definitions for NewsFlow Extract.
//!
//! All options can be provided via command-line flags; the archive root is
//! the only required argument.

use clap::Parser;

/// Command-line arguments for the NewsFlow Extract application.
///
/// # Examples
///
/// ```sh
/// # Print the extracted articles as JSON to stdout
/// newsflow_extract -n ./output
///
/// # Write <dir>/articles.json instead
/// newsflow_extract -n ./output -j ./json
///
/// # Surface English titles and summaries in the flat fields
/// newsflow_extract -n ./output -l en
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Root directory of the news archive (one subdirectory per category)
    #[arg(short, long)]
    pub news_root: String,

    /// Output directory for the JSON article dump; prints to stdout when omitted
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Display language for the flat title/summary fields (falls back to ko)
    #[arg(short, long, default_value = "ko")]
    pub language: String,
}
