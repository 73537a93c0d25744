//! State module for tracking analysis progress
//!
//! # Components
//!
//! - `AnalysisStage`: The linear stage machine one analysis call walks through
//! - `StageTracker`: Enforces legal transitions and traces them

mod analysis_stage;

// Re-export main types
pub use analysis_stage::{AnalysisStage, StageTracker};
