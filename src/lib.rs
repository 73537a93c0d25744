//! Site-Analyzer: a single-page structure and link health reporter
//!
//! This crate fetches one web page, inspects its HTML tree and probes every
//! hyperlink it finds, producing a structural report of the page.

pub mod analyzer;
pub mod config;
pub mod html;
pub mod output;
pub mod state;

use thiserror::Error;

/// Fatal errors for a single analysis call
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid request for {url}: {message}")]
    InvalidRequest { url: String, message: String },

    #[error("Failed to fetch {url}: {message}")]
    FetchFailed {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("HTML parse error for {url}: {message}")]
    ParseFailed { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl AnalysisError {
    /// HTTP status code of a failed fetch, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::FetchFailed { status, .. } => *status,
            _ => None,
        }
    }
}

/// Per-link probe failures
///
/// These never abort an analysis; they only mark a link inaccessible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Probe timed out")]
    Timeout,

    #[error("Probe cancelled")]
    Cancelled,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    BadStatus(u16),

    #[error("Probe task failed: {0}")]
    Task(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use analyzer::{analyze, AnalysisResult, Analyzer};
pub use config::Config;
pub use html::LinkRecord;
pub use state::AnalysisStage;
