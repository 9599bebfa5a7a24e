//! SQLite-backed store
//!
//! The store lives in a single SQLite file (default `~/.prog/prog.db`).
//! Concurrent CLI processes are serialized by SQLite's own locking: WAL mode
//! plus a busy timeout makes a second writer wait instead of failing.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use directories::BaseDirs;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use thiserror::Error;

use crate::domain::{Item, ValidationError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Failed to create database directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Handle to the prog database
pub struct Store {
    /// Path to the SQLite database
    path: PathBuf,

    /// Database connection
    pub(super) conn: Connection,
}

impl Store {
    /// How long a writer waits on a lock held by another process
    const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Returns the default database location, `<home>/.prog/prog.db`
    pub fn default_path() -> Result<PathBuf> {
        let dirs = BaseDirs::new().ok_or(StoreError::NoHomeDir)?;
        Ok(dirs.home_dir().join(".prog").join("prog.db"))
    }

    /// Opens (or creates) the database at `path`, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&path)?;
        conn.busy_timeout(Self::BUSY_TIMEOUT)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;

        Ok(Self { path, conn })
    }

    /// Creates the schema if absent. Safe to call repeatedly.
    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                project TEXT NOT NULL DEFAULT '',
                type TEXT NOT NULL CHECK (type IN ('task', 'epic')),
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL CHECK (status IN ('open', 'in_progress', 'blocked', 'done')),
                priority INTEGER NOT NULL DEFAULT 2,
                parent_id TEXT REFERENCES items(id),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS deps (
                item_id TEXT NOT NULL REFERENCES items(id),
                depends_on TEXT NOT NULL REFERENCES items(id),
                PRIMARY KEY (item_id, depends_on)
            );

            CREATE TABLE IF NOT EXISTS logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                item_id TEXT NOT NULL,
                message TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS projects (
                name TEXT PRIMARY KEY,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_items_project ON items(project);
            CREATE INDEX IF NOT EXISTS idx_items_status ON items(status);
            CREATE INDEX IF NOT EXISTS idx_deps_depends_on ON deps(depends_on);
            CREATE INDEX IF NOT EXISTS idx_logs_item ON logs(item_id, created_at);
            ",
        )?;

        Ok(())
    }

    /// Records that a project exists. Idempotent.
    pub fn ensure_project(&self, name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO projects (name, created_at) VALUES (?1, ?2)",
            params![name, timestamp(&Utc::now())],
        )?;
        Ok(())
    }

    /// Lists known projects by name
    pub fn list_projects(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM projects ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Returns the path to the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Releases the database handle, surfacing any error from closing
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }
}

/// Formats a timestamp so that text order matches time order
pub(super) fn timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(super) fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Column list matching [`item_from_row`]
pub(super) const ITEM_COLUMNS: &str =
    "id, project, type, title, description, status, priority, parent_id, created_at, updated_at";

/// Maps a row selected with [`ITEM_COLUMNS`] to an item
pub(super) fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    let item_type: String = row.get(2)?;
    let status: String = row.get(5)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;

    Ok(Item {
        id: row.get(0)?,
        project: row.get(1)?,
        item_type: item_type
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
        title: row.get(3)?,
        description: row.get(4)?,
        status: status
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
        priority: row.get(6)?,
        parent_id: row.get(7)?,
        created_at: parse_timestamp(8, &created_at)?,
        updated_at: parse_timestamp(9, &updated_at)?,
    })
}
