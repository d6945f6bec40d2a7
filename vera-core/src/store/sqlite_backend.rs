//! SQLite baseline backend
//!
//! Stores snapshots in a single SQLite database keyed by project, providing
//! transactional upserts and better concurrent access than the file backend.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::Baseline;
use crate::store::traits::{BackendType, BaselineStore};

pub struct SqliteStore {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database and ensures the schema exists
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open baseline database: {:?}", path))?;

        // WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS baselines (
                project TEXT PRIMARY KEY,
                baseline_id TEXT NOT NULL,
                captured_at TEXT NOT NULL,
                urs_text TEXT NOT NULL,
                steps TEXT NOT NULL
            );",
        )?;

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Returns the path to the database file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BaselineStore for SqliteStore {
    fn backend_type(&self) -> BackendType {
        BackendType::Sqlite
    }

    fn get_baseline(&self, project: &str) -> Result<Option<Baseline>> {
        let conn = self.conn.lock().unwrap();

        let row = conn
            .query_row(
                "SELECT baseline_id, captured_at, urs_text, steps
                 FROM baselines WHERE project = ?1",
                params![project],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
            .with_context(|| format!("Failed to query baseline for key '{}'", project))?;

        let Some((baseline_id, captured_at, urs_text, steps)) = row else {
            return Ok(None);
        };

        let baseline = Baseline {
            baseline_id: baseline_id
                .parse::<Uuid>()
                .with_context(|| format!("Invalid baseline id for key '{}'", project))?,
            project: project.to_string(),
            captured_at: DateTime::parse_from_rfc3339(&captured_at)
                .with_context(|| format!("Invalid baseline timestamp for key '{}'", project))?
                .with_timezone(&Utc),
            urs_text,
            steps: serde_json::from_str(&steps)
                .with_context(|| format!("Failed to parse baseline steps for key '{}'", project))?,
        };
        Ok(Some(baseline))
    }

    fn save_baseline(&self, baseline: &Baseline) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        let steps = serde_json::to_string(&baseline.steps)
            .context("Failed to serialize baseline steps")?;

        conn.execute(
            "INSERT INTO baselines (project, baseline_id, captured_at, urs_text, steps)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(project) DO UPDATE SET
                baseline_id = excluded.baseline_id,
                captured_at = excluded.captured_at,
                urs_text = excluded.urs_text,
                steps = excluded.steps",
            params![
                baseline.project,
                baseline.baseline_id.to_string(),
                baseline.captured_at.to_rfc3339(),
                baseline.urs_text,
                steps,
            ],
        )
        .with_context(|| format!("Failed to save baseline for key '{}'", baseline.project))?;

        Ok(())
    }

    fn delete_baseline(&self, project: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute("DELETE FROM baselines WHERE project = ?1", params![project])
            .with_context(|| format!("Failed to delete baseline for key '{}'", project))?;
        Ok(changed > 0)
    }

    fn list_projects(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT project FROM baselines ORDER BY project")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut projects = Vec::new();
        for row in rows {
            projects.push(row?);
        }
        Ok(projects)
    }
}
