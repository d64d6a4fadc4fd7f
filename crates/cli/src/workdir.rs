#![forbid(unsafe_code)]

use std::path::PathBuf;
use tc_storage::SqliteStore;

pub const TACTICIAN_DIR: &str = ".tactician";

pub fn tactician_dir() -> PathBuf {
    PathBuf::from(TACTICIAN_DIR)
}

/// Open the store for an already-initialized project.
pub fn open_store() -> anyhow::Result<SqliteStore> {
    let dir = tactician_dir();
    if !dir.is_dir() {
        anyhow::bail!("not a Tactician project (run `tactician init` first)");
    }
    Ok(SqliteStore::open(&dir)?)
}
