//! Requirement quality taxonomy and score aggregation
//!
//! The scoring heuristic itself is delegated to an external analysis service
//! (see `ai`); this module owns the closed severity/category enumerations,
//! the deterministic score aggregation and the fixed display bands.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Scores at or above this display as Good
pub const QUALITY_GOOD_MIN: u8 = 85;

/// Scores at or above this (and below Good) display as Fair
pub const QUALITY_FAIR_MIN: u8 = 70;

/// Score penalty per issue, by severity
pub const PENALTY_HIGH: u32 = 15;
pub const PENALTY_MEDIUM: u32 = 8;
pub const PENALTY_LOW: u32 = 3;

/// Severity of a quality issue
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Parses the wire form used by the analysis service
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "High"),
            Severity::Medium => write!(f, "Medium"),
            Severity::Low => write!(f, "Low"),
        }
    }
}

/// The fixed set of issue categories the analysis service may report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IssueCategory {
    /// Unclear or vague language
    Ambiguous,
    /// Cannot be objectively tested
    NonTestable,
    /// No clear success criteria
    MissingAcceptance,
    /// Contradicts another requirement
    Conflicting,
    /// Missing essential details
    Incomplete,
}

impl IssueCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ambiguous" => Some(IssueCategory::Ambiguous),
            "non-testable" | "nontestable" | "non_testable" => Some(IssueCategory::NonTestable),
            "missing acceptance" | "missing_acceptance" | "missingacceptance" => {
                Some(IssueCategory::MissingAcceptance)
            }
            "conflicting" => Some(IssueCategory::Conflicting),
            "incomplete" => Some(IssueCategory::Incomplete),
            _ => None,
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueCategory::Ambiguous => write!(f, "Ambiguous"),
            IssueCategory::NonTestable => write!(f, "Non-Testable"),
            IssueCategory::MissingAcceptance => write!(f, "Missing Acceptance"),
            IssueCategory::Conflicting => write!(f, "Conflicting"),
            IssueCategory::Incomplete => write!(f, "Incomplete"),
        }
    }
}

/// One issue flagged against a requirement set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualityIssue {
    pub category: IssueCategory,
    pub severity: Severity,
    pub description: String,
    pub suggestion: String,
    /// Requirement ids the issue applies to
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub affected_requirements: BTreeSet<String>,
}

/// Display band for an overall score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QualityBand {
    Good,
    Fair,
    Poor,
}

impl QualityBand {
    /// Fixed thresholds: Good >= 85, Fair 70-84, Poor < 70
    pub fn from_score(score: u8) -> Self {
        if score >= QUALITY_GOOD_MIN {
            QualityBand::Good
        } else if score >= QUALITY_FAIR_MIN {
            QualityBand::Fair
        } else {
            QualityBand::Poor
        }
    }
}

impl fmt::Display for QualityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityBand::Good => write!(f, "Good"),
            QualityBand::Fair => write!(f, "Fair"),
            QualityBand::Poor => write!(f, "Poor"),
        }
    }
}

/// Aggregated quality analysis over a requirement set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// Overall score in [0,100]; lower with more and graver issues
    pub overall_score: u8,
    pub issues: Vec<QualityIssue>,
    pub strengths: Vec<String>,
    pub recommendations: Vec<String>,
}

impl QualityReport {
    pub fn band(&self) -> QualityBand {
        QualityBand::from_score(self.overall_score)
    }
}

/// Computes the overall score from the flagged issues.
///
/// Starts at 100 and subtracts a fixed penalty per issue by severity,
/// saturating at zero, so the score correlates inversely with both the
/// count and the severity of issues.
pub fn aggregate_score(issues: &[QualityIssue]) -> u8 {
    let penalty: u32 = issues
        .iter()
        .map(|issue| match issue.severity {
            Severity::High => PENALTY_HIGH,
            Severity::Medium => PENALTY_MEDIUM,
            Severity::Low => PENALTY_LOW,
        })
        .sum();
    100u32.saturating_sub(penalty) as u8
}
