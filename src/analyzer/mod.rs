//! Page analysis pipeline
//!
//! This module contains the networked half of the analyzer:
//! - Fetching the target page with a shared deadline
//! - Probing every collected link with bounded concurrency
//! - Orchestrating fetch, parse, extraction and probing into one result

mod fetcher;
mod orchestrator;
mod prober;
mod result;

pub use fetcher::{build_http_client, decode_body, fetch_page, validate_target_url, FetchedPage};
pub use orchestrator::{analyze, Analyzer};
pub use prober::{check_scheme, resolve_href, HttpProbe, LinkProbe, ProbeOutcome, Prober};
pub use result::AnalysisResult;
