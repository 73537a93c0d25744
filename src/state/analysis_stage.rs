//! Stage definitions for tracking the progress of one analysis call
//!
//! The machine is linear: every stage has exactly one successor, and only
//! fetching and parsing may end in `Failed`.

use crate::AnalysisError;
use std::fmt;
use std::time::Instant;

/// Represents the current stage of an analysis call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisStage {
    // ===== Active Stages =====
    /// Call accepted, nothing done yet
    Start,

    /// Downloading the target page
    Fetching,

    /// Building the DOM tree from the page body
    Parsing,

    /// Running the page feature extractors
    Extracting,

    /// Walking the tree for anchors
    LinkCollecting,

    /// Probing every collected link
    Probing,

    /// Folding probe outcomes into counts
    Aggregating,

    // ===== Terminal Stages =====
    /// Result built and handed back
    Done,

    /// Fetch or parse failed; no result is produced
    Failed,
}

impl AnalysisStage {
    /// Returns true if this is a terminal stage
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if a failure may end the call while in this stage
    pub fn can_fail(&self) -> bool {
        matches!(self, Self::Fetching | Self::Parsing)
    }

    /// The stage that follows this one on the success path
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::Fetching),
            Self::Fetching => Some(Self::Parsing),
            Self::Parsing => Some(Self::Extracting),
            Self::Extracting => Some(Self::LinkCollecting),
            Self::LinkCollecting => Some(Self::Probing),
            Self::Probing => Some(Self::Aggregating),
            Self::Aggregating => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// Returns true if moving from this stage to `to` is legal
    pub fn can_transition_to(&self, to: Self) -> bool {
        (to == Self::Failed && self.can_fail()) || self.next() == Some(to)
    }

    /// Short lowercase label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Extracting => "extracting",
            Self::LinkCollecting => "link_collecting",
            Self::Probing => "probing",
            Self::Aggregating => "aggregating",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Returns all stages in success-path order, `Failed` last
    pub fn all_stages() -> Vec<Self> {
        vec![
            Self::Start,
            Self::Fetching,
            Self::Parsing,
            Self::Extracting,
            Self::LinkCollecting,
            Self::Probing,
            Self::Aggregating,
            Self::Done,
            Self::Failed,
        ]
    }
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Walks one call through the stage machine, logging each step
#[derive(Debug)]
pub struct StageTracker {
    url: String,
    current: AnalysisStage,
    entered_at: Instant,
}

impl StageTracker {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            current: AnalysisStage::Start,
            entered_at: Instant::now(),
        }
    }

    pub fn current(&self) -> AnalysisStage {
        self.current
    }

    /// Moves to `to`
    ///
    /// The pipeline only walks legal edges, so an illegal one is a bug in the
    /// caller and trips a debug assertion.
    pub fn advance(&mut self, to: AnalysisStage) {
        debug_assert!(
            self.current.can_transition_to(to),
            "illegal stage transition {:?} -> {:?}",
            self.current,
            to
        );

        tracing::debug!(
            "{}: {} -> {} ({:?} in previous stage)",
            self.url,
            self.current,
            to,
            self.entered_at.elapsed()
        );
        self.current = to;
        self.entered_at = Instant::now();
    }

    /// Records a fatal error and passes it through
    ///
    /// If the current stage cannot fail, the error is still returned as-is;
    /// only the trace differs.
    pub fn fail(&mut self, error: AnalysisError) -> AnalysisError {
        if self.current.can_fail() {
            tracing::warn!("{}: failed while {}: {}", self.url, self.current, error);
            self.current = AnalysisStage::Failed;
        } else {
            tracing::error!(
                "{}: unexpected failure while {}: {}",
                self.url,
                self.current,
                error
            );
        }
        error
    }
}
