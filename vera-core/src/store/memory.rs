//! In-memory baseline store
//!
//! Keeps snapshots in a mutex-guarded map. Used by tests and by callers that
//! embed the analyzer without wanting persistence.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::Baseline;
use crate::store::traits::{BackendType, BaselineStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    baselines: Mutex<HashMap<String, Baseline>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BaselineStore for MemoryStore {
    fn backend_type(&self) -> BackendType {
        BackendType::Memory
    }

    fn get_baseline(&self, project: &str) -> Result<Option<Baseline>> {
        Ok(self.baselines.lock().unwrap().get(project).cloned())
    }

    fn save_baseline(&self, baseline: &Baseline) -> Result<()> {
        self.baselines
            .lock()
            .unwrap()
            .insert(baseline.project.clone(), baseline.clone());
        Ok(())
    }

    fn delete_baseline(&self, project: &str) -> Result<bool> {
        Ok(self.baselines.lock().unwrap().remove(project).is_some())
    }

    fn list_projects(&self) -> Result<Vec<String>> {
        let mut projects: Vec<String> = self.baselines.lock().unwrap().keys().cloned().collect();
        projects.sort();
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestStep;

    #[test]
    fn test_missing_baseline_is_none_not_error() {
        let store = MemoryStore::new();
        assert!(store.get_baseline("nope").unwrap().is_none());
        assert!(!store.has_baseline("nope").unwrap());
    }

    #[test]
    fn test_save_is_last_write_wins() {
        let store = MemoryStore::new();
        let first = Baseline::new("demo", "v1", vec![TestStep::new(1, "REQ-001", "a", "b")]);
        let second = Baseline::new("demo", "v2", vec![]);

        store.save_baseline(&first).unwrap();
        store.save_baseline(&second).unwrap();

        let loaded = store.get_baseline("demo").unwrap().unwrap();
        assert_eq!(loaded.baseline_id, second.baseline_id);
        assert_eq!(loaded.urs_text, "v2");
        assert_eq!(store.list_projects().unwrap(), vec!["demo".to_string()]);
    }

    #[test]
    fn test_delete_reports_existence() {
        let store = MemoryStore::new();
        store
            .save_baseline(&Baseline::new("demo", "urs", vec![]))
            .unwrap();
        assert!(store.delete_baseline("demo").unwrap());
        assert!(!store.delete_baseline("demo").unwrap());
    }
}
