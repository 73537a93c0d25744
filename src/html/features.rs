//! Page feature extractors
//!
//! Each extractor is a pure function of the parsed tree. They all build on
//! the traversal helpers in [`crate::html::tree`].

use crate::html::tree::{self, DomNode};
use scraper::Html;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::ControlFlow;

/// Placeholder title for pages without a usable `<title>` element
pub const NOT_AVAILABLE: &str = "N/A";

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// HTML version inferred from the document type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HtmlVersion {
    Html401,
    Html5,
    Xhtml10,
    Xhtml11,
    /// Some other HTML doctype (HTML 2.0, 3.2, ...)
    Older,
    /// No doctype, or a doctype that does not mention HTML
    Unknown,
}

impl HtmlVersion {
    /// Human readable label used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html401 => "HTML 4.01",
            Self::Html5 => "HTML5",
            Self::Xhtml10 => "XHTML 1.0",
            Self::Xhtml11 => "XHTML 1.1",
            Self::Older => "Older HTML version",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for HtmlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the extractors learn about a page, links aside
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFeatures {
    pub title: String,
    pub html_version: HtmlVersion,
    pub heading_counts: BTreeMap<String, usize>,
    pub has_login_form: bool,
}

/// Runs every feature extractor over a parsed document
pub fn extract_features(document: &Html) -> PageFeatures {
    let root = document.tree.root();

    PageFeatures {
        title: extract_title(root),
        html_version: detect_html_version(root),
        heading_counts: count_headings(root),
        has_login_form: has_login_form(root),
    }
}

/// Returns the text of the first `<title>` element that has content
///
/// Only the first child of the title is read. Falls back to
/// [`NOT_AVAILABLE`] when no such element exists anywhere in the tree.
pub fn extract_title(root: DomNode<'_>) -> String {
    tree::find_first(root, |node| tree::is_element(node, "title") && node.has_children())
        .and_then(|title| title.first_child())
        .map(|child| match child.value().as_text() {
            Some(text) => text.to_string(),
            None => tree::text_content(child),
        })
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Infers the HTML version from the doctype declaration
///
/// Only the direct children of `root` are scanned; a doctype is always a
/// top-level sibling of the `<html>` element, so no deeper walk is needed.
pub fn detect_html_version(root: DomNode<'_>) -> HtmlVersion {
    root.children()
        .find_map(|node| node.value().as_doctype())
        .map(|doctype| {
            let content = [doctype.name(), doctype.public_id(), doctype.system_id()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            classify_doctype(&content)
        })
        .unwrap_or(HtmlVersion::Unknown)
}

/// Classifies the raw doctype content (name, public id and system id)
///
/// Checks run in order and the first match wins.
pub fn classify_doctype(content: &str) -> HtmlVersion {
    let content = content.trim().to_lowercase();

    if content.contains("html 4.01") {
        HtmlVersion::Html401
    } else if content == "html" {
        HtmlVersion::Html5
    } else if content.contains("xhtml 1.0") {
        HtmlVersion::Xhtml10
    } else if content.contains("xhtml 1.1") {
        HtmlVersion::Xhtml11
    } else if content.contains("html") {
        HtmlVersion::Older
    } else {
        HtmlVersion::Unknown
    }
}

/// Counts `h1`..`h6` elements by tag
///
/// Tags that never occur are absent from the map rather than zero.
pub fn count_headings(root: DomNode<'_>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();

    let _ = tree::visit_all(root, |node| {
        if let Some(name) = tree::element_name(node) {
            if HEADING_TAGS.contains(&name) {
                *counts.entry(name.to_string()).or_insert(0) += 1;
            }
        }
        ControlFlow::Continue(())
    });

    counts
}

/// Returns true if the page contains a password input
pub fn has_login_form(root: DomNode<'_>) -> bool {
    tree::any(root, |node| {
        tree::is_element(node, "input")
            && tree::attribute(node, "type")
                .is_some_and(|kind| kind.eq_ignore_ascii_case("password"))
    })
}
