//! YAML file baseline backend
//!
//! Stores one YAML file per project key under a baselines directory, with
//! file locking for rudimentary multi-user support. The lock serializes the
//! read-then-write sequence for a single key; keys never share a lock.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::Baseline;
use crate::store::traits::{BackendType, BaselineStore};

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

pub struct YamlStore {
    dir: PathBuf,
}

impl YamlStore {
    /// Creates a store rooted at the given baselines directory
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Returns the baselines directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Maps a project key to a filesystem-safe file stem
    fn file_stem(project: &str) -> String {
        project
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    fn baseline_path(&self, project: &str) -> PathBuf {
        self.dir.join(format!("{}.yaml", Self::file_stem(project)))
    }

    fn lock_path(&self, project: &str) -> PathBuf {
        self.dir.join(format!("{}.yaml.lock", Self::file_stem(project)))
    }

    /// Acquire an exclusive lock for the key, waiting up to the timeout
    fn acquire_write_lock(&self, project: &str) -> Result<File> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create baselines directory: {:?}", self.dir))?;

        let lock_path = self.lock_path(project);
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to create lock file: {:?}", lock_path))?;

        let start = std::time::Instant::now();
        loop {
            match FileExt::try_lock_exclusive(&lock_file) {
                Ok(()) => return Ok(lock_file),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if start.elapsed() > LOCK_TIMEOUT {
                        anyhow::bail!(
                            "Timeout waiting for baseline lock - another process may be writing: {:?}",
                            lock_path
                        );
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to acquire lock on {:?}", lock_path))
                }
            }
        }
    }

    /// Acquire a shared lock for the key if a lock file exists
    fn acquire_read_lock(&self, project: &str) -> Result<Option<File>> {
        let lock_path = self.lock_path(project);
        if !lock_path.exists() {
            return Ok(None);
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {:?}", lock_path))?;

        let start = std::time::Instant::now();
        loop {
            match FileExt::try_lock_shared(&lock_file) {
                Ok(()) => return Ok(Some(lock_file)),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if start.elapsed() > LOCK_TIMEOUT {
                        anyhow::bail!(
                            "Timeout waiting for baseline lock - another process may be writing: {:?}",
                            lock_path
                        );
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to acquire lock on {:?}", lock_path))
                }
            }
        }
    }
}

impl BaselineStore for YamlStore {
    fn backend_type(&self) -> BackendType {
        BackendType::Yaml
    }

    fn get_baseline(&self, project: &str) -> Result<Option<Baseline>> {
        let path = self.baseline_path(project);
        if !path.exists() {
            return Ok(None);
        }

        let _lock = self.acquire_read_lock(project)?;

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read baseline file: {:?}", path))?;
        let baseline: Baseline = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML from {:?}", path))?;
        Ok(Some(baseline))
    }

    fn save_baseline(&self, baseline: &Baseline) -> Result<()> {
        let mut lock_file = self.acquire_write_lock(&baseline.project)?;

        // Lock holder info, useful when a stale lock has to be diagnosed
        let _ = writeln!(
            lock_file,
            "Locked by PID {} at {}",
            std::process::id(),
            chrono::Utc::now().to_rfc3339()
        );

        let yaml = serde_yaml::to_string(baseline)?;
        let path = self.baseline_path(&baseline.project);
        fs::write(&path, yaml)
            .with_context(|| format!("Failed to write baseline file: {:?}", path))?;

        // Lock is released when lock_file is dropped
        Ok(())
    }

    fn delete_baseline(&self, project: &str) -> Result<bool> {
        let path = self.baseline_path(project);
        if !path.exists() {
            return Ok(false);
        }

        let _lock = self.acquire_write_lock(project)?;
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove baseline file: {:?}", path))?;
        let _ = fs::remove_file(self.lock_path(project));
        Ok(true)
    }

    fn list_projects(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut projects = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read baselines directory: {:?}", self.dir))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            // The filename is a sanitized key; the real key lives inside
            let content = fs::read_to_string(&path)?;
            if let Ok(baseline) = serde_yaml::from_str::<Baseline>(&content) {
                projects.push(baseline.project);
            }
        }
        projects.sort();
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestStep;
    use tempfile::TempDir;

    #[test]
    fn test_missing_baseline_is_none() {
        let dir = TempDir::new().unwrap();
        let store = YamlStore::new(dir.path());
        assert!(store.get_baseline("absent").unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = YamlStore::new(dir.path());

        let baseline = Baseline::new(
            "demo project",
            "REQ-001 The system shall...",
            vec![TestStep::new(1, "REQ-001", "login", "dashboard")],
        );
        store.save_baseline(&baseline).unwrap();

        let loaded = store.get_baseline("demo project").unwrap().unwrap();
        assert_eq!(loaded.baseline_id, baseline.baseline_id);
        assert_eq!(loaded.steps, baseline.steps);
        assert_eq!(loaded.urs_text, baseline.urs_text);
    }

    #[test]
    fn test_overwrite_keeps_latest_only() {
        let dir = TempDir::new().unwrap();
        let store = YamlStore::new(dir.path());

        store
            .save_baseline(&Baseline::new("demo", "v1", vec![]))
            .unwrap();
        let second = Baseline::new("demo", "v2", vec![TestStep::new(1, "REQ-001", "a", "b")]);
        store.save_baseline(&second).unwrap();

        let loaded = store.get_baseline("demo").unwrap().unwrap();
        assert_eq!(loaded.urs_text, "v2");
        assert_eq!(store.list_projects().unwrap(), vec!["demo".to_string()]);
    }

    #[test]
    fn test_key_sanitization_preserves_real_key() {
        let dir = TempDir::new().unwrap();
        let store = YamlStore::new(dir.path());

        store
            .save_baseline(&Baseline::new("acme/URS v2", "text", vec![]))
            .unwrap();

        // File stem is sanitized but the lookup uses the original key
        assert!(store.get_baseline("acme/URS v2").unwrap().is_some());
        assert_eq!(
            store.list_projects().unwrap(),
            vec!["acme/URS v2".to_string()]
        );
    }

    #[test]
    fn test_delete_baseline() {
        let dir = TempDir::new().unwrap();
        let store = YamlStore::new(dir.path());

        store
            .save_baseline(&Baseline::new("demo", "urs", vec![]))
            .unwrap();
        assert!(store.delete_baseline("demo").unwrap());
        assert!(store.get_baseline("demo").unwrap().is_none());
        assert!(!store.delete_baseline("demo").unwrap());
    }
}
