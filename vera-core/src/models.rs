use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single test step derived from a requirement.
///
/// One requirement in the URS becomes one test step; `requirement_id` is the
/// stable join key used when comparing two versions of a requirement set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestStep {
    /// 1-based position assigned by extraction order; display only
    pub step_no: u32,

    /// Stable external identifier (e.g. "REQ-001")
    pub requirement_id: String,

    /// The testable statement derived from the requirement
    pub description: String,

    /// The testable outcome
    pub expected_result: String,
}

impl TestStep {
    pub fn new(
        step_no: u32,
        requirement_id: impl Into<String>,
        description: impl Into<String>,
        expected_result: impl Into<String>,
    ) -> Self {
        Self {
            step_no,
            requirement_id: requirement_id.into(),
            description: description.into(),
            expected_result: expected_result.into(),
        }
    }

    /// Whitespace-normalized text used for change comparison.
    ///
    /// Runs of whitespace collapse to a single space; the two text fields are
    /// joined with a newline so a move of text between fields still registers
    /// as a change.
    pub fn comparison_text(&self) -> String {
        format!(
            "{}\n{}",
            normalize_whitespace(&self.description),
            normalize_whitespace(&self.expected_result)
        )
    }
}

/// Collapses all whitespace runs to single spaces and trims the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Classification of one requirement between two set versions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::Added => write!(f, "added"),
            ChangeType::Removed => write!(f, "removed"),
            ChangeType::Modified => write!(f, "modified"),
            ChangeType::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Which text field(s) of a modified requirement actually changed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModifiedField {
    Description,
    ExpectedResult,
    Both,
}

impl fmt::Display for ModifiedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifiedField::Description => write!(f, "description"),
            ModifiedField::ExpectedResult => write!(f, "expected result"),
            ModifiedField::Both => write!(f, "description and expected result"),
        }
    }
}

/// One entry in the change log produced by the detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub change_type: ChangeType,

    /// Post-set id for added/modified entries, pre-set id for removed ones
    pub requirement_id: String,

    /// Human-readable summary of what changed
    pub description: String,

    /// Similarity score in [0,1] for modified entries; 1.0 = identical text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_field: Option<ModifiedField>,
}

/// Per-category counts over the union of old and new requirement ids
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}

impl ChangeSummary {
    /// Size of the union of old and new requirement ids
    pub fn total(&self) -> usize {
        self.added + self.removed + self.modified + self.unchanged
    }

    /// Count of requirements that differ between the two versions
    pub fn total_changes(&self) -> usize {
        self.added + self.removed + self.modified
    }
}

/// Coarse classification of how much re-testing a change set implies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImpactLevel {
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "HIGH")]
    High,
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImpactLevel::Low => write!(f, "LOW"),
            ImpactLevel::Medium => write!(f, "MEDIUM"),
            ImpactLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Test-case actions implied by a change summary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestImpact {
    pub tests_to_add: usize,
    pub tests_to_update: usize,
    pub tests_to_reuse: usize,
    /// Reported separately; removed tests are never counted as reusable
    pub tests_to_remove: usize,
    /// Tests in the new version: add + update + reuse
    pub total_test_cases: usize,
}

/// Output of the impact analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactReport {
    pub impact_level: ImpactLevel,
    pub summary: ChangeSummary,
    pub impact: TestImpact,
    /// Deterministic template over the counts; reproducible byte-for-byte
    pub recommendations: String,
}

/// Line-level statistics over the raw URS text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextChangeStats {
    /// Count of inserted plus deleted lines
    pub total_changes: usize,
    pub has_changes: bool,
}

/// The last-saved snapshot of a requirement set for one project key.
///
/// Exactly one snapshot is retained per key; each completed generation
/// overwrites it. The store owns persisted snapshots; the detector only ever
/// reads copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baseline {
    pub baseline_id: Uuid,
    pub project: String,
    pub captured_at: DateTime<Utc>,
    /// Raw URS text the steps were extracted from
    pub urs_text: String,
    pub steps: Vec<TestStep>,
}

impl Baseline {
    pub fn new(project: impl Into<String>, urs_text: impl Into<String>, steps: Vec<TestStep>) -> Self {
        Self {
            baseline_id: Uuid::new_v4(),
            project: project.into(),
            captured_at: Utc::now(),
            urs_text: urs_text.into(),
            steps,
        }
    }

    pub fn requirements_count(&self) -> usize {
        self.steps.len()
    }
}

/// Full result of analyzing a new requirement set against the stored baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeReport {
    pub project: String,

    /// True when no baseline existed for the key; no diff is computed and the
    /// new snapshot is persisted unconditionally
    pub is_first_baseline: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_captured_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_changes: Option<TextChangeStats>,

    /// Added, removed and modified records; unchanged entries are counted in
    /// the summary but not listed individually
    pub changes: Vec<ChangeRecord>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ChangeSummary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<ImpactReport>,
}

impl ChangeReport {
    /// Report for the first generation under a key
    pub fn first_baseline(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            is_first_baseline: true,
            baseline_id: None,
            baseline_captured_at: None,
            text_changes: None,
            changes: Vec::new(),
            summary: None,
            impact: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \t b\n c  "), "a b c");
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace("single"), "single");
    }

    #[test]
    fn test_comparison_text_collapses_whitespace() {
        let a = TestStep::new(1, "REQ-001", "User  logs in", "Dashboard\nshown");
        let b = TestStep::new(9, "REQ-001", "User logs in", "Dashboard shown");
        assert_eq!(a.comparison_text(), b.comparison_text());
    }

    #[test]
    fn test_comparison_text_separates_fields() {
        // Moving text across the field boundary must still read as a change
        let a = TestStep::new(1, "REQ-001", "login works", "");
        let b = TestStep::new(1, "REQ-001", "", "login works");
        assert_ne!(a.comparison_text(), b.comparison_text());
    }

    #[test]
    fn test_impact_level_ordering() {
        assert!(ImpactLevel::Low < ImpactLevel::Medium);
        assert!(ImpactLevel::Medium < ImpactLevel::High);
    }

    #[test]
    fn test_change_summary_totals() {
        let summary = ChangeSummary {
            added: 2,
            removed: 1,
            modified: 3,
            unchanged: 4,
        };
        assert_eq!(summary.total(), 10);
        assert_eq!(summary.total_changes(), 6);
    }

    #[test]
    fn test_baseline_counts_steps() {
        let baseline = Baseline::new(
            "demo",
            "urs text",
            vec![TestStep::new(1, "REQ-001", "a", "b")],
        );
        assert_eq!(baseline.requirements_count(), 1);
        assert_eq!(baseline.project, "demo");
    }
}
