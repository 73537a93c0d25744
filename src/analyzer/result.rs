//! The structural report produced by one analysis

use crate::analyzer::prober::ProbeOutcome;
use crate::html::{HtmlVersion, LinkRecord, PageFeatures};
use std::collections::BTreeMap;

/// Final result of analyzing one page
///
/// Built once per call by [`AnalysisResult::from_parts`] and never modified
/// afterwards. `internal_count + external_count` always equals
/// `links.len()`, and `inaccessible_count` never exceeds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    /// The URL that was analyzed, as given by the caller
    pub url: String,

    pub title: String,
    pub html_version: HtmlVersion,

    /// Heading tag (`h1`..`h6`) to number of occurrences; absent tags omitted
    pub heading_counts: BTreeMap<String, usize>,

    pub has_login_form: bool,
    pub internal_count: usize,
    pub external_count: usize,
    pub inaccessible_count: usize,

    /// Every anchor in document order, annotated with its probe outcome
    pub links: Vec<LinkRecord>,
}

impl AnalysisResult {
    /// Annotates links with their outcomes (by position) and aggregates counts
    ///
    /// A link without a matching outcome counts as inaccessible.
    pub fn from_parts(
        url: &str,
        features: PageFeatures,
        links: Vec<LinkRecord>,
        outcomes: &[ProbeOutcome],
    ) -> Self {
        let links: Vec<LinkRecord> = links
            .into_iter()
            .enumerate()
            .map(|(i, link)| {
                let accessible = outcomes.get(i).is_some_and(ProbeOutcome::is_accessible);
                link.with_accessibility(accessible)
            })
            .collect();

        let mut internal_count = 0;
        let mut external_count = 0;
        let mut inaccessible_count = 0;
        for link in &links {
            if link.is_internal {
                internal_count += 1;
            } else {
                external_count += 1;
            }
            if !link.is_accessible {
                inaccessible_count += 1;
            }
        }

        Self {
            url: url.to_string(),
            title: features.title,
            html_version: features.html_version,
            heading_counts: features.heading_counts,
            has_login_form: features.has_login_form,
            internal_count,
            external_count,
            inaccessible_count,
            links,
        }
    }

    pub fn total_links(&self) -> usize {
        self.internal_count + self.external_count
    }

    pub fn accessible_count(&self) -> usize {
        self.total_links() - self.inaccessible_count
    }

    pub fn total_headings(&self) -> usize {
        self.heading_counts.values().sum()
    }
}
