#![forbid(unsafe_code)]

mod apply;
mod edges;
mod error;
mod log;
mod nodes;
mod project;
mod tactics;

pub use apply::*;
pub use error::StoreError;
pub use log::*;
pub use nodes::*;
pub use project::*;
pub use tactics::*;

use rusqlite::{Connection, ErrorCode, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE_NAME: &str = "tactician.db";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE_NAME);
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        install_schema(&conn)?;

        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;

        CREATE TABLE IF NOT EXISTS project (
          key TEXT PRIMARY KEY,
          value TEXT
        );

        CREATE TABLE IF NOT EXISTS nodes (
          id TEXT PRIMARY KEY,
          node_type TEXT NOT NULL,
          output TEXT NOT NULL,
          status TEXT NOT NULL DEFAULT 'pending',
          created_by TEXT,
          created_at_ms INTEGER NOT NULL,
          completed_at_ms INTEGER,
          parent_tactic TEXT,
          introduced_as TEXT,
          data_json TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_nodes_status ON nodes(status);
        CREATE INDEX IF NOT EXISTS idx_nodes_output ON nodes(output);

        CREATE TABLE IF NOT EXISTS edges (
          source_id TEXT NOT NULL,
          target_id TEXT NOT NULL,
          PRIMARY KEY (source_id, target_id),
          FOREIGN KEY (source_id) REFERENCES nodes(id) ON DELETE CASCADE,
          FOREIGN KEY (target_id) REFERENCES nodes(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source_id);
        CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_id);

        CREATE TABLE IF NOT EXISTS tactics (
          id TEXT PRIMARY KEY,
          tactic_type TEXT NOT NULL,
          output TEXT NOT NULL,
          description TEXT,
          tags_json TEXT,
          data_json TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_tactics_type ON tactics(tactic_type);

        CREATE TABLE IF NOT EXISTS tactic_dependencies (
          tactic_id TEXT NOT NULL,
          kind TEXT NOT NULL,
          output TEXT NOT NULL,
          FOREIGN KEY (tactic_id) REFERENCES tactics(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_tactic_dependencies_tactic
          ON tactic_dependencies(tactic_id);

        CREATE TABLE IF NOT EXISTS tactic_subtasks (
          tactic_id TEXT NOT NULL,
          position INTEGER NOT NULL,
          subtask_id TEXT NOT NULL,
          output TEXT NOT NULL,
          subtask_type TEXT NOT NULL,
          depends_on_json TEXT,
          data_json TEXT,
          FOREIGN KEY (tactic_id) REFERENCES tactics(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_tactic_subtasks_tactic
          ON tactic_subtasks(tactic_id);

        CREATE TABLE IF NOT EXISTS action_log (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          ts_ms INTEGER NOT NULL,
          action TEXT NOT NULL,
          details TEXT,
          node_id TEXT,
          tactic_id TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_action_log_ts ON action_log(ts_ms);
        CREATE INDEX IF NOT EXISTS idx_action_log_action ON action_log(action);
        "#,
    )?;
    Ok(())
}

fn node_exists(conn: &Connection, id: &str) -> Result<bool, StoreError> {
    use rusqlite::OptionalExtension;

    Ok(conn
        .query_row("SELECT 1 FROM nodes WHERE id=?1", params![id], |row| {
            row.get::<_, i64>(0)
        })
        .optional()?
        .is_some())
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                || message.as_deref().is_some_and(|value| {
                    value.contains("UNIQUE constraint failed")
                        || value.contains("PRIMARY KEY constraint failed")
                })
        }
        _ => false,
    }
}

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration,
        Err(_) => return 0,
    };

    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
