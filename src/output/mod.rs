//! Output module for rendering analysis results
//!
//! This module handles:
//! - Printing a plain-text report to stdout
//! - Generating a markdown report file

mod markdown;
pub mod summary;

pub use markdown::{format_markdown_report, generate_markdown_report};
pub use summary::{format_report, print_report};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Percentage of `part` in `total`, zero for an empty total
pub(crate) fn percentage(part: usize, total: usize) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
