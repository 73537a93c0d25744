//! Link collection and internal/external classification

use crate::html::tree;
use crate::html::tree::DomNode;
use std::ops::ControlFlow;

/// A hyperlink found on the analyzed page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    /// The raw `href` attribute, exactly as written in the page
    pub href: String,

    /// Whether the link points back into the analyzed site
    pub is_internal: bool,

    /// Whether the link answered its probe with a status below 400
    pub is_accessible: bool,
}

impl LinkRecord {
    /// Creates an unprobed record for `href`
    pub fn new(href: impl Into<String>, base_url: &str) -> Self {
        let href = href.into();
        let is_internal = is_internal(&href, base_url);
        Self {
            href,
            is_internal,
            is_accessible: false,
        }
    }

    /// Returns the record annotated with its single probe outcome
    pub fn with_accessibility(self, is_accessible: bool) -> Self {
        Self {
            is_accessible,
            ..self
        }
    }
}

/// Internal links are root-relative or mention the base URL anywhere
///
/// This is a containment heuristic, not URL parsing: `//cdn.example` counts
/// as internal because it starts with `/`.
pub fn is_internal(href: &str, base_url: &str) -> bool {
    href.starts_with('/') || href.contains(base_url)
}

/// Collects one record per `<a href>` in document order
///
/// Duplicate hrefs are kept; every anchor occurrence produces its own record.
pub fn collect_links(root: DomNode<'_>, base_url: &str) -> Vec<LinkRecord> {
    let mut links = Vec::new();

    let _ = tree::visit_all(root, |node| {
        if tree::is_element(node, "a") {
            if let Some(href) = tree::attribute(node, "href") {
                links.push(LinkRecord::new(href, base_url));
            }
        }
        ControlFlow::Continue(())
    });

    tracing::debug!("Collected {} links", links.len());
    links
}
