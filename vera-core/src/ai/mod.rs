//! AI-delegated services
//!
//! Requirement extraction and quality analysis are delegated to an external
//! language model behind the narrow traits below. The core never depends on
//! a specific provider, only on these contracts.

pub mod client;
pub mod prompts;
pub mod responses;

pub use client::{AiClient, AiError, AiMode};
pub use responses::TestStepsResponse;

use crate::models::TestStep;
use crate::quality::QualityReport;

/// Turns raw URS document text into an ordered list of test steps.
///
/// An empty result is valid ("no requirements found") and flows through the
/// change detector without special-casing.
pub trait RequirementExtractor {
    fn extract(&self, document_text: &str) -> Result<Vec<TestStep>, AiError>;
}

/// Flags quality issues in URS requirement text.
///
/// The heuristic is opaque; the returned report already carries the
/// deterministic aggregate score (see `quality::aggregate_score`).
pub trait QualityAnalysis {
    fn analyze(&self, document_text: &str) -> Result<QualityReport, AiError>;
}
