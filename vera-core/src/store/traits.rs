//! Baseline store abstraction
//!
//! This module defines the trait every baseline backend must implement.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::Baseline;

/// Types of baseline backends available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// In-memory map, nothing persisted
    Memory,
    /// One YAML file per project key
    Yaml,
    /// SQLite database keyed by project
    Sqlite,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Memory => write!(f, "Memory"),
            BackendType::Yaml => write!(f, "YAML"),
            BackendType::Sqlite => write!(f, "SQLite"),
        }
    }
}

/// Core trait for baseline backends.
///
/// Semantics shared by all implementations:
/// - `get_baseline` returns `Ok(None)` for an unknown key; missing is never
///   an error.
/// - `save_baseline` is a last-write-wins upsert on the project key.
/// - A read-then-write sequence for a single key within one logical
///   operation must not interleave with another write for the same key;
///   backends achieve this with a per-key file lock or a transaction.
///   Cross-key coordination is not required.
pub trait BaselineStore: Send + Sync {
    /// Returns the backend type
    fn backend_type(&self) -> BackendType;

    /// Loads the snapshot for a project key, if one exists
    fn get_baseline(&self, project: &str) -> Result<Option<Baseline>>;

    /// Upserts the snapshot for its project key
    fn save_baseline(&self, baseline: &Baseline) -> Result<()>;

    /// Removes the snapshot for a key; returns whether one existed
    fn delete_baseline(&self, project: &str) -> Result<bool>;

    /// Lists the project keys that currently have a snapshot
    fn list_projects(&self) -> Result<Vec<String>>;

    /// Returns true if a snapshot exists for the key
    fn has_baseline(&self, project: &str) -> Result<bool> {
        Ok(self.get_baseline(project)?.is_some())
    }
}
