//! Impact analysis over a change summary
//!
//! Pure classification of a change summary into LOW/MEDIUM/HIGH plus the
//! implied test-case actions. No I/O; calling twice on the same summary
//! yields identical reports.

use crate::models::{ChangeSummary, ImpactLevel, ImpactReport, TestImpact};

/// Any removal, or a modified share at or above this fraction of the
/// requirement union, classifies as HIGH
pub const HIGH_MODIFIED_RATIO: f64 = 0.3;

/// More than this many total changes classifies as HIGH regardless of set size
pub const HIGH_TOTAL_CHANGES: usize = 10;

/// Classifies a change summary, first match wins: HIGH, then MEDIUM, then LOW.
///
/// The ordering makes the result monotonic: for a fixed requirement set,
/// adding more changes never lowers the level.
pub fn classify(summary: &ChangeSummary) -> ImpactLevel {
    let total = summary.total();
    let modified_ratio = if total > 0 {
        summary.modified as f64 / total as f64
    } else {
        0.0
    };

    if summary.removed > 0
        || modified_ratio >= HIGH_MODIFIED_RATIO
        || summary.total_changes() > HIGH_TOTAL_CHANGES
    {
        ImpactLevel::High
    } else if summary.added > 0 || summary.modified > 0 {
        ImpactLevel::Medium
    } else {
        ImpactLevel::Low
    }
}

/// Computes the full impact report for a change summary.
///
/// Counts are unsigned by construction, so the malformed negative-count case
/// is unrepresentable rather than checked at runtime.
pub fn compute_impact(summary: &ChangeSummary) -> ImpactReport {
    let impact = TestImpact {
        tests_to_add: summary.added,
        tests_to_update: summary.modified,
        tests_to_reuse: summary.unchanged,
        tests_to_remove: summary.removed,
        total_test_cases: summary.added + summary.modified + summary.unchanged,
    };
    let impact_level = classify(summary);
    let recommendations = build_recommendations(summary, &impact, impact_level);

    ImpactReport {
        impact_level,
        summary: *summary,
        impact,
        recommendations,
    }
}

/// Renders the human-readable recommendation text.
///
/// Deterministic template substitution over the counts; the same summary
/// always produces the same bytes.
fn build_recommendations(
    summary: &ChangeSummary,
    impact: &TestImpact,
    level: ImpactLevel,
) -> String {
    let mut lines = Vec::new();

    if summary.added > 0 {
        lines.push(format!("\u{2022} {} new requirement(s) added", summary.added));
    }
    if summary.removed > 0 {
        lines.push(format!("\u{2022} {} requirement(s) removed", summary.removed));
    }
    if summary.modified > 0 {
        lines.push(format!("\u{2022} {} requirement(s) modified", summary.modified));
    }
    if summary.unchanged > 0 {
        lines.push(format!("\u{2022} {} requirement(s) unchanged", summary.unchanged));
    }

    lines.push(format!("\nImpact Level: {}", level));
    lines.push(format!("Test Cases to Add: {}", impact.tests_to_add));
    lines.push(format!("Test Cases to Update: {}", impact.tests_to_update));
    lines.push(format!("Test Cases to Reuse: {}", impact.tests_to_reuse));
    if impact.tests_to_remove > 0 {
        lines.push(format!("Test Cases to Remove: {}", impact.tests_to_remove));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(added: usize, removed: usize, modified: usize, unchanged: usize) -> ChangeSummary {
        ChangeSummary {
            added,
            removed,
            modified,
            unchanged,
        }
    }

    #[test]
    fn test_all_unchanged_is_low() {
        assert_eq!(classify(&summary(0, 0, 0, 12)), ImpactLevel::Low);
    }

    #[test]
    fn test_empty_summary_is_low() {
        assert_eq!(classify(&summary(0, 0, 0, 0)), ImpactLevel::Low);
    }

    #[test]
    fn test_single_addition_is_medium() {
        assert_eq!(classify(&summary(1, 0, 0, 9)), ImpactLevel::Medium);
    }

    #[test]
    fn test_any_removal_is_high() {
        assert_eq!(classify(&summary(0, 1, 0, 99)), ImpactLevel::High);
    }

    #[test]
    fn test_modified_ratio_boundary() {
        // 3 of 10 hits the 0.3 ratio exactly
        assert_eq!(classify(&summary(0, 0, 3, 7)), ImpactLevel::High);
        // 2 of 10 stays below it
        assert_eq!(classify(&summary(0, 0, 2, 8)), ImpactLevel::Medium);
    }

    #[test]
    fn test_absolute_change_threshold() {
        // 11 additions in a large set: ratio is low but the absolute
        // threshold trips
        assert_eq!(classify(&summary(11, 0, 0, 89)), ImpactLevel::High);
        assert_eq!(classify(&summary(10, 0, 0, 90)), ImpactLevel::Medium);
    }

    #[test]
    fn test_compute_impact_counts() {
        let report = compute_impact(&summary(2, 1, 3, 4));
        assert_eq!(report.impact.tests_to_add, 2);
        assert_eq!(report.impact.tests_to_update, 3);
        assert_eq!(report.impact.tests_to_reuse, 4);
        assert_eq!(report.impact.tests_to_remove, 1);
        assert_eq!(report.impact.total_test_cases, 9);
        assert_eq!(report.impact_level, ImpactLevel::High);
    }

    #[test]
    fn test_compute_impact_is_idempotent() {
        let s = summary(1, 0, 2, 7);
        let first = compute_impact(&s);
        let second = compute_impact(&s);
        assert_eq!(first.impact_level, second.impact_level);
        assert_eq!(first.recommendations, second.recommendations);
        assert_eq!(first.impact, second.impact);
    }

    #[test]
    fn test_monotonic_in_modified_count() {
        // Fixed union size: converting unchanged into modified never lowers
        // the level
        let total = 20;
        let mut previous = ImpactLevel::Low;
        for modified in 0..=total {
            let level = classify(&summary(0, 0, modified, total - modified));
            assert!(level >= previous, "level decreased at modified={}", modified);
            previous = level;
        }
    }

    #[test]
    fn test_recommendations_text() {
        let report = compute_impact(&summary(1, 0, 0, 1));
        assert_eq!(
            report.recommendations,
            "\u{2022} 1 new requirement(s) added\n\
             \u{2022} 1 requirement(s) unchanged\n\
             \nImpact Level: MEDIUM\n\
             Test Cases to Add: 1\n\
             Test Cases to Update: 0\n\
             Test Cases to Reuse: 1"
        );
    }

    #[test]
    fn test_recommendations_mention_removals() {
        let report = compute_impact(&summary(0, 2, 0, 5));
        assert!(report.recommendations.contains("2 requirement(s) removed"));
        assert!(report.recommendations.contains("Test Cases to Remove: 2"));
        assert!(report.recommendations.contains("Impact Level: HIGH"));
    }
}
