//! Requirement-level change detection
//!
//! Compares two versions of a requirement set by stable requirement id and
//! classifies every id in the union as added, removed, modified or unchanged.
//! The detector is pure and total over well-formed input; empty sets are
//! valid and never special-cased.

use similar::{ChangeTag, TextDiff};
use std::collections::{HashMap, HashSet};

use crate::models::{
    normalize_whitespace, ChangeRecord, ChangeSummary, ChangeType, ModifiedField, TestStep,
    TextChangeStats,
};

/// Pairs with similarity at or above this are classified as unchanged.
/// Exact equality after whitespace normalization short-circuits to unchanged
/// before any score is computed, so the threshold never decides the
/// identical-text case.
pub const UNCHANGED_SIMILARITY_THRESHOLD: f64 = 0.95;

/// Detailed change records plus the per-category counts.
///
/// `records` holds added, removed and modified entries in that order;
/// unchanged requirements carry no actionable information and are only
/// counted in `summary`.
#[derive(Debug, Clone)]
pub struct ChangeSet {
    pub records: Vec<ChangeRecord>,
    pub summary: ChangeSummary,
}

/// Similarity in [0,1] between the comparison texts of two steps,
/// 1.0 meaning identical after whitespace normalization
pub fn step_similarity(old: &TestStep, new: &TestStep) -> f64 {
    strsim::normalized_levenshtein(&old.comparison_text(), &new.comparison_text())
}

/// Builds an id -> step map where the first occurrence of a duplicate id
/// wins and later duplicates are ignored
fn index_by_id(steps: &[TestStep]) -> HashMap<&str, &TestStep> {
    let mut map: HashMap<&str, &TestStep> = HashMap::with_capacity(steps.len());
    for step in steps {
        map.entry(step.requirement_id.as_str()).or_insert(step);
    }
    map
}

/// Ids of `steps` in their original order, each id listed once
fn ids_in_order(steps: &[TestStep]) -> Vec<&str> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(steps.len());
    let mut ids = Vec::with_capacity(steps.len());
    for step in steps {
        if seen.insert(step.requirement_id.as_str()) {
            ids.push(step.requirement_id.as_str());
        }
    }
    ids
}

fn which_field_changed(old: &TestStep, new: &TestStep) -> ModifiedField {
    let description_changed =
        normalize_whitespace(&old.description) != normalize_whitespace(&new.description);
    let expected_changed =
        normalize_whitespace(&old.expected_result) != normalize_whitespace(&new.expected_result);
    match (description_changed, expected_changed) {
        (true, false) => ModifiedField::Description,
        (false, true) => ModifiedField::ExpectedResult,
        // Similarity below threshold with both normalized fields equal cannot
        // happen (the fast path catches it), so the remaining arm is Both
        _ => ModifiedField::Both,
    }
}

/// Computes the structured diff between an old and a new requirement set.
///
/// Record order is added (new-set order), then removed (old-set order), then
/// modified (new-set order). Duplicate ids within one set resolve to the
/// first occurrence; later duplicates are ignored rather than merged.
pub fn compute_diff(old: &[TestStep], new: &[TestStep]) -> ChangeSet {
    let old_by_id = index_by_id(old);
    let new_by_id = index_by_id(new);

    let mut records = Vec::new();
    let mut summary = ChangeSummary::default();

    // Added: present in new but not in old
    for id in ids_in_order(new) {
        if !old_by_id.contains_key(id) {
            summary.added += 1;
            records.push(ChangeRecord {
                change_type: ChangeType::Added,
                requirement_id: id.to_string(),
                description: "not present in baseline".to_string(),
                similarity: None,
                modified_field: None,
            });
        }
    }

    // Removed: present in old but not in new
    for id in ids_in_order(old) {
        if !new_by_id.contains_key(id) {
            summary.removed += 1;
            records.push(ChangeRecord {
                change_type: ChangeType::Removed,
                requirement_id: id.to_string(),
                description: "present in baseline but missing from new version".to_string(),
                similarity: None,
                modified_field: None,
            });
        }
    }

    // Present in both: unchanged or modified, decided by normalized text
    for id in ids_in_order(new) {
        let (Some(old_step), Some(new_step)) = (old_by_id.get(id), new_by_id.get(id)) else {
            continue;
        };

        // Fast path: exact equality after whitespace normalization is always
        // unchanged, keeping floating point away from the boundary
        if old_step.comparison_text() == new_step.comparison_text() {
            summary.unchanged += 1;
            continue;
        }

        let similarity = step_similarity(old_step, new_step);
        if similarity >= UNCHANGED_SIMILARITY_THRESHOLD {
            summary.unchanged += 1;
            continue;
        }

        let field = which_field_changed(old_step, new_step);
        summary.modified += 1;
        records.push(ChangeRecord {
            change_type: ChangeType::Modified,
            requirement_id: id.to_string(),
            description: format!("{} changed", field),
            similarity: Some(similarity),
            modified_field: Some(field),
        });
    }

    ChangeSet { records, summary }
}

/// Line-level statistics over the raw URS text of two versions
pub fn text_change_stats(old_text: &str, new_text: &str) -> TextChangeStats {
    let diff = TextDiff::from_lines(old_text, new_text);
    let total_changes = diff
        .iter_all_changes()
        .filter(|change| change.tag() != ChangeTag::Equal)
        .count();
    TextChangeStats {
        total_changes,
        has_changes: total_changes > 0,
    }
}
