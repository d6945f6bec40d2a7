//! Central project registry
//!
//! Maps project names to their baseline storage so the CLI can resolve
//! `--project` without per-invocation paths. Persisted as YAML under the
//! user's config directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::store::BackendType;

/// Represents a registered project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Baselines directory (YAML backend) or database file (SQLite backend)
    pub path: String,
    /// Description of the project
    pub description: String,
    /// Which baseline backend the project uses
    pub backend: BackendType,
}

/// Registry of all projects
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Registry {
    pub projects: HashMap<String, Project>,
    /// Optional default project name
    pub default_project: Option<String>,
}

impl Registry {
    /// Loads the registry from the provided path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read registry file: {:?}", path.as_ref()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse registry file: {:?}", path.as_ref()))
    }

    /// Loads the registry, or returns an empty one if the file doesn't exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves the registry to the provided path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        fs::write(&path, yaml)
            .with_context(|| format!("Failed to write registry file: {:?}", path.as_ref()))
    }

    /// Gets a project by name
    pub fn get_project(&self, name: &str) -> Option<&Project> {
        self.projects.get(name)
    }

    /// Lists all project names, sorted
    pub fn list_projects(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.projects.keys().map(|k| k.as_str()).collect();
        names.sort();
        names
    }

    /// Registers a new project or updates an existing one
    pub fn register_project(
        &mut self,
        name: String,
        path: String,
        description: String,
        backend: BackendType,
    ) {
        self.projects.insert(
            name,
            Project {
                path,
                description,
                backend,
            },
        );
    }

    /// Sets a project as the default
    pub fn set_default_project(&mut self, name: &str) -> Result<()> {
        if !self.projects.contains_key(name) {
            anyhow::bail!("Project '{}' not found in registry", name);
        }
        self.default_project = Some(name.to_string());
        Ok(())
    }

    /// Gets the default project if set
    pub fn get_default_project(&self) -> Option<(&str, &Project)> {
        let name = self.default_project.as_deref()?;
        self.projects.get(name).map(|p| (name, p))
    }
}

/// Returns the per-user config directory for this tool
pub fn get_config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine user config directory")?;
    Ok(base.join("vera"))
}

/// Returns the path of the central registry file
pub fn get_registry_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("registry.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::load_or_default(dir.path().join("registry.yaml")).unwrap();
        assert!(registry.projects.is_empty());
        assert!(registry.default_project.is_none());
    }

    #[test]
    fn test_register_and_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.yaml");

        let mut registry = Registry::default();
        registry.register_project(
            "demo".to_string(),
            "/tmp/baselines".to_string(),
            "Demo project".to_string(),
            BackendType::Yaml,
        );
        registry.set_default_project("demo").unwrap();
        registry.save(&path).unwrap();

        let loaded = Registry::load(&path).unwrap();
        assert_eq!(loaded.list_projects(), vec!["demo"]);
        let (name, project) = loaded.get_default_project().unwrap();
        assert_eq!(name, "demo");
        assert_eq!(project.backend, BackendType::Yaml);
    }

    #[test]
    fn test_default_must_exist() {
        let mut registry = Registry::default();
        assert!(registry.set_default_project("ghost").is_err());
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = Registry::default();
        registry.register_project(
            "demo".to_string(),
            "/a".to_string(),
            "first".to_string(),
            BackendType::Yaml,
        );
        registry.register_project(
            "demo".to_string(),
            "/b".to_string(),
            "second".to_string(),
            BackendType::Sqlite,
        );
        let project = registry.get_project("demo").unwrap();
        assert_eq!(project.path, "/b");
        assert_eq!(project.backend, BackendType::Sqlite);
    }
}
