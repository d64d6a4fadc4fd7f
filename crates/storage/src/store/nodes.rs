#![forbid(unsafe_code)]

use super::*;
use rusqlite::OptionalExtension;
use tc_core::graph::{Edge, GraphSnapshot, Node, NodeStatus, validate_node_id};

#[derive(Clone, Debug)]
pub struct NewNode {
    pub id: String,
    pub node_type: String,
    pub output: String,
    pub status: NodeStatus,
    pub created_by: Option<String>,
    pub parent_tactic: Option<String>,
    pub introduced_as: Option<String>,
    pub data_json: Option<String>,
    /// Stamped with the current time when absent.
    pub created_at_ms: Option<i64>,
    pub completed_at_ms: Option<i64>,
}

impl NewNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            output: output.into(),
            status: NodeStatus::Pending,
            created_by: None,
            parent_tactic: None,
            introduced_as: None,
            data_json: None,
            created_at_ms: None,
            completed_at_ms: None,
        }
    }

    pub(in crate::store) fn into_node(self, now_ms: i64) -> Node {
        Node {
            id: self.id,
            node_type: self.node_type,
            output: self.output,
            status: self.status,
            created_by: self.created_by,
            created_at_ms: self.created_at_ms.unwrap_or(now_ms),
            completed_at_ms: self.completed_at_ms,
            parent_tactic: self.parent_tactic,
            introduced_as: self.introduced_as,
            data_json: self.data_json,
        }
    }
}

impl SqliteStore {
    pub fn add_node(&mut self, new: NewNode) -> Result<Node, StoreError> {
        validate_node_id(&new.id)?;
        let node = new.into_node(now_ms());
        insert_node(&self.conn, &node)?;
        Ok(node)
    }

    pub fn get_node(&self, id: &str) -> Result<Option<Node>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("{NODE_SELECT} WHERE id=?1"),
                params![id],
                node_from_row,
            )
            .optional()?)
    }

    pub fn list_nodes(&self) -> Result<Vec<Node>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NODE_SELECT} ORDER BY rowid ASC"))?;
        let rows = stmt.query_map([], node_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn update_node_status(
        &mut self,
        id: &str,
        status: NodeStatus,
        completed_at_ms: Option<i64>,
    ) -> Result<(), StoreError> {
        let updated = self.conn.execute(
            "UPDATE nodes SET status=?2, completed_at_ms=?3 WHERE id=?1",
            params![id, status.as_str(), completed_at_ms],
        )?;
        if updated == 0 {
            return Err(StoreError::NodeNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Deletes the node; its edges go with it (ON DELETE CASCADE).
    pub fn delete_node(&mut self, id: &str) -> Result<(), StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM nodes WHERE id=?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NodeNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Nodes this node depends on (sources of incoming edges).
    pub fn dependencies_of(&self, id: &str) -> Result<Vec<Node>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT n.id, n.node_type, n.output, n.status, n.created_by, n.created_at_ms, \
                    n.completed_at_ms, n.parent_tactic, n.introduced_as, n.data_json \
             FROM nodes n \
             INNER JOIN edges e ON e.source_id = n.id \
             WHERE e.target_id = ?1",
        )?;
        let rows = stmt.query_map(params![id], node_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Nodes blocked behind this node (targets of outgoing edges).
    pub fn dependents_of(&self, id: &str) -> Result<Vec<Node>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT n.id, n.node_type, n.output, n.status, n.created_by, n.created_at_ms, \
                    n.completed_at_ms, n.parent_tactic, n.introduced_as, n.data_json \
             FROM nodes n \
             INNER JOIN edges e ON e.target_id = n.id \
             WHERE e.source_id = ?1",
        )?;
        let rows = stmt.query_map(params![id], node_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Full graph view for the matcher, ranker, and status derivation.
    pub fn snapshot(&self) -> Result<GraphSnapshot, StoreError> {
        Ok(GraphSnapshot::new(self.list_nodes()?, self.list_edges()?))
    }
}

pub(in crate::store) const NODE_SELECT: &str =
    "SELECT id, node_type, output, status, created_by, created_at_ms, completed_at_ms, \
     parent_tactic, introduced_as, data_json FROM nodes";

pub(in crate::store) fn node_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Node> {
    let status: String = row.get(3)?;
    let status = NodeStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown node status: {status}").into(),
        )
    })?;
    Ok(Node {
        id: row.get(0)?,
        node_type: row.get(1)?,
        output: row.get(2)?,
        status,
        created_by: row.get(4)?,
        created_at_ms: row.get(5)?,
        completed_at_ms: row.get(6)?,
        parent_tactic: row.get(7)?,
        introduced_as: row.get(8)?,
        data_json: row.get(9)?,
    })
}

pub(in crate::store) fn insert_node(conn: &Connection, node: &Node) -> Result<(), StoreError> {
    let insert = conn.execute(
        "INSERT INTO nodes(id, node_type, output, status, created_by, created_at_ms, \
                           completed_at_ms, parent_tactic, introduced_as, data_json) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            node.id,
            node.node_type,
            node.output,
            node.status.as_str(),
            node.created_by,
            node.created_at_ms,
            node.completed_at_ms,
            node.parent_tactic,
            node.introduced_as,
            node.data_json,
        ],
    );
    if let Err(err) = insert {
        if is_constraint_violation(&err) {
            return Err(StoreError::DuplicateNode(node.id.clone()));
        }
        return Err(StoreError::Sql(err));
    }
    Ok(())
}

pub(in crate::store) fn insert_edge(
    conn: &Connection,
    edge: &Edge,
) -> Result<bool, StoreError> {
    if !node_exists(conn, &edge.source_id)? || !node_exists(conn, &edge.target_id)? {
        return Err(StoreError::UnknownEdgeEndpoint {
            source_id: edge.source_id.clone(),
            target_id: edge.target_id.clone(),
        });
    }
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO edges(source_id, target_id) VALUES (?1, ?2)",
        params![edge.source_id, edge.target_id],
    )?;
    Ok(inserted > 0)
}
