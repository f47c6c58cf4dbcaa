//! Output generation for extracted articles.
//!
//! # Submodules
//!
//! - [`json`]: Writes the sorted article list to a JSON file for API
//!   consumption
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── articles.json
//! ```

pub mod json;
