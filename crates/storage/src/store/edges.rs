#![forbid(unsafe_code)]

use super::*;
use tc_core::graph::Edge;

impl SqliteStore {
    /// Set semantics: re-adding an existing pair is a no-op and returns false.
    pub fn add_edge(&mut self, source_id: &str, target_id: &str) -> Result<bool, StoreError> {
        insert_edge(
            &self.conn,
            &Edge {
                source_id: source_id.to_string(),
                target_id: target_id.to_string(),
            },
        )
    }

    pub fn list_edges(&self) -> Result<Vec<Edge>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT source_id, target_id FROM edges ORDER BY rowid ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(Edge {
                source_id: row.get(0)?,
                target_id: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
