//! HTML inspection for a single parsed page
//!
//! This module contains everything that reads the parsed DOM tree:
//! - Generic depth-first traversal helpers
//! - Page feature extractors (title, HTML version, headings, login form)
//! - The link collector that classifies anchors as internal or external

mod features;
mod links;
pub mod tree;

pub use features::{
    classify_doctype, count_headings, detect_html_version, extract_features, extract_title,
    has_login_form, HtmlVersion, PageFeatures, NOT_AVAILABLE,
};
pub use links::{collect_links, is_internal, LinkRecord};
pub use tree::DomNode;

use scraper::Html;

/// Parses a full HTML document
///
/// The parser recovers from malformed markup the way browsers do, so this
/// never fails; recoverable errors are reported through `Html::errors`.
pub fn parse_document(source: &str) -> Html {
    let document = Html::parse_document(source);
    if !document.errors.is_empty() {
        tracing::debug!(
            "HTML parser recovered from {} error(s)",
            document.errors.len()
        );
    }
    document
}
