use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::data::{BatchAdjustmentState, SavedTimeline};
use super::edit::AdjustmentSnapshot;
use crate::error::StoreError;

pub type Result<T> = std::result::Result<T, StoreError>;

/// The SessionStore keeps saved edit histories in the SQLite catalog.
/// Timelines are stored as JSON so that a restored session behaves
/// exactly like the one that was saved.
pub struct SessionStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl SessionStore {
    /// Open the catalog at its default location.
    ///
    /// - Linux: ~/.local/share/raw-editor/raw_editor.db
    /// - macOS: ~/Library/Application Support/raw-editor/raw_editor.db
    /// - Windows: %APPDATA%\raw-editor\raw_editor.db
    pub fn open_default() -> Result<Self> {
        let db_path = Self::default_db_path().ok_or(StoreError::NoDataDir)?;
        Self::open(&db_path)
    }

    /// Open or create the catalog at `db_path`.
    pub fn open(db_path: &Path) -> Result<Self> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        log::debug!("Session store opened at {}", db_path.display());

        let store = SessionStore {
            conn,
            db_path: Some(db_path.to_path_buf()),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// A throwaway store, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let store = SessionStore {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Get the path where the database should be stored
    pub fn default_db_path() -> Option<PathBuf> {
        let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
        path.push("raw-editor");
        path.push("raw_editor.db");
        Some(path)
    }

    /// Path of the database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Create the tables if they don't exist.
    fn init_schema(&self) -> Result<()> {
        // One single-image history per image
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS edit_histories (
                image_id        TEXT PRIMARY KEY,
                timeline_json   TEXT NOT NULL,
                cursor          INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            )",
            [],
        )?;

        // Named bulk-editing sessions
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS batch_sessions (
                name            TEXT PRIMARY KEY,
                timeline_json   TEXT NOT NULL,
                cursor          INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_edit_histories_updated_at
             ON edit_histories(updated_at DESC)",
            [],
        )?;

        Ok(())
    }

    /// Save (or replace) the history of one image
    pub fn save_history(
        &self,
        image_id: &str,
        saved: &SavedTimeline<AdjustmentSnapshot>,
    ) -> Result<()> {
        self.upsert("edit_histories", "image_id", image_id, &saved.states, saved.index)
    }

    /// Load the saved history of one image
    pub fn load_history(
        &self,
        image_id: &str,
    ) -> Result<Option<SavedTimeline<AdjustmentSnapshot>>> {
        let saved = self.select::<AdjustmentSnapshot>("edit_histories", "image_id", image_id)?;
        Ok(saved.map(|saved| SavedTimeline {
            states: saved.states.iter().map(AdjustmentSnapshot::clamped).collect(),
            index: saved.index,
        }))
    }

    pub fn delete_history(&self, image_id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM edit_histories WHERE image_id = ?1",
            [image_id],
        )?;
        Ok(removed > 0)
    }

    /// Number of images with a saved history
    pub fn history_count(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM edit_histories",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Save (or replace) a named bulk-editing session
    pub fn save_batch(
        &self,
        name: &str,
        saved: &SavedTimeline<BatchAdjustmentState>,
    ) -> Result<()> {
        self.upsert("batch_sessions", "name", name, &saved.states, saved.index)
    }

    pub fn load_batch(&self, name: &str) -> Result<Option<SavedTimeline<BatchAdjustmentState>>> {
        let saved = self.select::<BatchAdjustmentState>("batch_sessions", "name", name)?;
        Ok(saved.map(|saved| SavedTimeline {
            states: saved.states.iter().map(BatchAdjustmentState::clamped).collect(),
            index: saved.index,
        }))
    }

    fn upsert<T: serde::Serialize>(
        &self,
        table: &str,
        key_column: &str,
        key: &str,
        states: &[T],
        cursor: usize,
    ) -> Result<()> {
        let timeline_json = serde_json::to_string(states)?;
        let sql = format!(
            "INSERT INTO {table} ({key_column}, timeline_json, cursor, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT({key_column}) DO UPDATE SET
                timeline_json = excluded.timeline_json,
                cursor = excluded.cursor,
                updated_at = excluded.updated_at"
        );
        self.conn.execute(
            &sql,
            rusqlite::params![key, timeline_json, cursor as i64, Utc::now().timestamp()],
        )?;
        log::debug!("Saved {} entries to {table} for {key}", states.len());
        Ok(())
    }

    fn select<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        key_column: &str,
        key: &str,
    ) -> Result<Option<SavedTimeline<T>>> {
        let sql = format!("SELECT timeline_json, cursor FROM {table} WHERE {key_column} = ?1");
        let row: Option<(String, i64)> = self
            .conn
            .query_row(&sql, [key], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let Some((timeline_json, cursor)) = row else {
            return Ok(None);
        };
        let states: Vec<T> = serde_json::from_str(&timeline_json)?;
        Ok(Some(SavedTimeline {
            states,
            index: usize::try_from(cursor).unwrap_or(0),
        }))
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}
