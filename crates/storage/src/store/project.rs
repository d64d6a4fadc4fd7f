#![forbid(unsafe_code)]

use super::*;
use tc_core::graph::{Edge, validate_node_id};

#[derive(Clone, Debug, Default)]
pub struct ProjectMeta {
    pub name: Option<String>,
    pub root_goal: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ProjectImport {
    pub name: Option<String>,
    pub root_goal: Option<String>,
    pub nodes: Vec<NewNode>,
    pub edges: Vec<Edge>,
}

impl SqliteStore {
    pub fn set_project_meta(
        &mut self,
        name: &str,
        root_goal: Option<&str>,
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        set_meta_tx(&tx, "name", Some(name))?;
        set_meta_tx(&tx, "root_goal", root_goal)?;
        tx.commit()?;
        Ok(())
    }

    pub fn project_meta(&self) -> Result<ProjectMeta, StoreError> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM project")?;
        let mut rows = stmt.query([])?;
        let mut meta = ProjectMeta::default();
        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;
            let value: Option<String> = row.get(1)?;
            match key.as_str() {
                "name" => meta.name = value,
                "root_goal" => meta.root_goal = value,
                _ => {}
            }
        }
        Ok(meta)
    }

    /// Destructive import: replaces project meta, nodes, and edges in one
    /// transaction. The action log is left in place (it does not round-trip
    /// through the interchange document).
    pub fn import_project(&mut self, import: ProjectImport) -> Result<(), StoreError> {
        for node in &import.nodes {
            validate_node_id(&node.id)?;
        }

        let now = now_ms();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM edges", [])?;
        tx.execute("DELETE FROM nodes", [])?;
        tx.execute("DELETE FROM project", [])?;

        set_meta_tx(&tx, "name", import.name.as_deref())?;
        set_meta_tx(&tx, "root_goal", import.root_goal.as_deref())?;

        for new in import.nodes {
            let node = new.into_node(now);
            insert_node(&tx, &node)?;
        }
        for edge in &import.edges {
            insert_edge(&tx, edge)?;
        }

        tx.commit()?;
        Ok(())
    }
}

fn set_meta_tx(conn: &Connection, key: &str, value: Option<&str>) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO project(key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}
