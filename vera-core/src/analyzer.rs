//! Change-impact analysis pipeline
//!
//! Ties the baseline store, the change detector and the impact analyzer
//! together: look up the stored snapshot for a project key, diff the new
//! requirement set against it, classify the impact, then persist the new
//! snapshot as the next baseline.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::detector::{compute_diff, text_change_stats};
use crate::impact::compute_impact;
use crate::models::{Baseline, ChangeReport, TestStep};
use crate::store::BaselineStore;

pub struct ChangeAnalyzer {
    store: Box<dyn BaselineStore>,
}

impl ChangeAnalyzer {
    /// Creates an analyzer over an injected baseline store
    pub fn new(store: Box<dyn BaselineStore>) -> Self {
        Self { store }
    }

    /// Returns the underlying store
    pub fn store(&self) -> &dyn BaselineStore {
        self.store.as_ref()
    }

    /// Analyzes a newly generated requirement set against the stored
    /// baseline for `project`, then persists the new set as the baseline.
    ///
    /// With no prior baseline the report is marked `is_first_baseline` and
    /// carries no diff; the snapshot is saved unconditionally. An empty
    /// `steps` slice is valid input and produces an all-removed diff against
    /// a non-empty baseline.
    pub fn analyze(
        &self,
        project: &str,
        urs_text: &str,
        steps: &[TestStep],
    ) -> Result<ChangeReport> {
        let previous = self
            .store
            .get_baseline(project)
            .with_context(|| format!("Failed to load baseline for key '{}'", project))?;

        let report = match previous {
            None => {
                info!(project, steps = steps.len(), "no baseline found, saving first");
                ChangeReport::first_baseline(project)
            }
            Some(baseline) => {
                let text_changes = text_change_stats(&baseline.urs_text, urs_text);
                let diff = compute_diff(&baseline.steps, steps);
                let impact = compute_impact(&diff.summary);
                debug!(
                    project,
                    added = diff.summary.added,
                    removed = diff.summary.removed,
                    modified = diff.summary.modified,
                    unchanged = diff.summary.unchanged,
                    level = %impact.impact_level,
                    "computed diff against baseline"
                );

                ChangeReport {
                    project: project.to_string(),
                    is_first_baseline: false,
                    baseline_id: Some(baseline.baseline_id),
                    baseline_captured_at: Some(baseline.captured_at),
                    text_changes: Some(text_changes),
                    changes: diff.records,
                    summary: Some(diff.summary),
                    impact: Some(impact),
                }
            }
        };

        // Overwrite the snapshot; only the latest is retained
        let snapshot = Baseline::new(project, urs_text, steps.to_vec());
        self.store
            .save_baseline(&snapshot)
            .with_context(|| format!("Failed to save baseline for key '{}'", project))?;
        debug!(project, baseline_id = %snapshot.baseline_id, "baseline saved");

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangeType, ImpactLevel};
    use crate::store::MemoryStore;

    fn analyzer() -> ChangeAnalyzer {
        ChangeAnalyzer::new(Box::new(MemoryStore::new()))
    }

    fn step(id: &str, description: &str, expected: &str) -> TestStep {
        TestStep::new(1, id, description, expected)
    }

    #[test]
    fn test_first_call_saves_baseline_without_diff() {
        let analyzer = analyzer();
        let steps = vec![step("REQ-001", "login", "dashboard")];

        let report = analyzer.analyze("demo", "urs v1", &steps).unwrap();
        assert!(report.is_first_baseline);
        assert!(report.changes.is_empty());
        assert!(report.summary.is_none());
        assert!(report.impact.is_none());

        let saved = analyzer.store().get_baseline("demo").unwrap().unwrap();
        assert_eq!(saved.steps, steps);
    }

    #[test]
    fn test_second_identical_call_is_all_unchanged_low() {
        let analyzer = analyzer();
        let steps = vec![step("REQ-001", "A", "B")];

        analyzer.analyze("demo", "urs", &steps).unwrap();
        let report = analyzer.analyze("demo", "urs", &steps).unwrap();

        assert!(!report.is_first_baseline);
        assert!(report.baseline_id.is_some());
        assert!(report.changes.is_empty());
        let summary = report.summary.unwrap();
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.total_changes(), 0);
        assert_eq!(report.impact.unwrap().impact_level, ImpactLevel::Low);
        assert!(!report.text_changes.unwrap().has_changes);
    }

    #[test]
    fn test_addition_is_medium_with_counts() {
        let analyzer = analyzer();
        let old = vec![step("REQ-001", "login", "dashboard")];
        let new = vec![
            step("REQ-001", "login", "dashboard"),
            step("REQ-002", "reset pwd", "email sent"),
        ];

        analyzer.analyze("demo", "urs v1", &old).unwrap();
        let report = analyzer.analyze("demo", "urs v2", &new).unwrap();

        let summary = report.summary.unwrap();
        assert_eq!(summary.added, 1);
        assert_eq!(summary.removed, 0);
        assert_eq!(summary.modified, 0);
        assert_eq!(summary.unchanged, 1);

        let impact = report.impact.unwrap();
        assert_eq!(impact.impact_level, ImpactLevel::Medium);
        assert_eq!(impact.impact.tests_to_add, 1);
        assert_eq!(impact.impact.tests_to_reuse, 1);
        assert!(report.text_changes.unwrap().has_changes);
    }

    #[test]
    fn test_removal_and_modification_is_high() {
        let analyzer = analyzer();
        let old = vec![
            step("REQ-001", "login", "dashboard"),
            step("REQ-002", "logout", "login page"),
            step("REQ-003", "export", "file downloads"),
        ];
        let new = vec![
            step("REQ-002", "logout", "login page"),
            step("REQ-003", "export", "report is emailed to the administrator"),
        ];

        analyzer.analyze("demo", "urs v1", &old).unwrap();
        let report = analyzer.analyze("demo", "urs v2", &new).unwrap();

        let summary = report.summary.unwrap();
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.modified, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(report.impact.unwrap().impact_level, ImpactLevel::High);

        let removed: Vec<_> = report
            .changes
            .iter()
            .filter(|r| r.change_type == ChangeType::Removed)
            .collect();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].requirement_id, "REQ-001");
    }

    #[test]
    fn test_empty_extraction_result_is_valid() {
        let analyzer = analyzer();
        let old = vec![step("REQ-001", "login", "dashboard")];

        analyzer.analyze("demo", "urs v1", &old).unwrap();
        let report = analyzer.analyze("demo", "", &[]).unwrap();

        let summary = report.summary.unwrap();
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.total(), 1);
    }

    #[test]
    fn test_first_baseline_flow_with_persistent_store() {
        use crate::store::YamlStore;
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let steps = vec![step("REQ-001", "A", "B")];

        let analyzer = ChangeAnalyzer::new(Box::new(YamlStore::new(dir.path())));
        let first = analyzer.analyze("demo", "urs", &steps).unwrap();
        assert!(first.is_first_baseline);

        // A fresh analyzer over the same directory sees the persisted snapshot
        let analyzer = ChangeAnalyzer::new(Box::new(YamlStore::new(dir.path())));
        let second = analyzer.analyze("demo", "urs", &steps).unwrap();
        assert!(!second.is_first_baseline);
        assert_eq!(second.summary.unwrap().unchanged, 1);
        assert_eq!(second.impact.unwrap().impact_level, ImpactLevel::Low);
    }

    #[test]
    fn test_keys_are_independent() {
        let analyzer = analyzer();
        let steps = vec![step("REQ-001", "a", "b")];

        let first = analyzer.analyze("alpha", "urs", &steps).unwrap();
        let other = analyzer.analyze("beta", "urs", &steps).unwrap();
        assert!(first.is_first_baseline);
        assert!(other.is_first_baseline);
    }
}
