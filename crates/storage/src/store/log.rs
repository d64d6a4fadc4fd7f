#![forbid(unsafe_code)]

use super::*;
use rusqlite::params_from_iter;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
pub struct NewLogEntry {
    pub action: String,
    pub details: Option<String>,
    pub node_id: Option<String>,
    pub tactic_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub seq: i64,
    pub ts_ms: i64,
    pub action: String,
    pub details: Option<String>,
    pub node_id: Option<String>,
    pub tactic_id: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct SessionSummary {
    pub total_actions: u64,
    pub nodes_created: u64,
    pub nodes_completed: u64,
    pub tactics_applied: u64,
    pub nodes_updated: u64,
    pub by_action: BTreeMap<String, u64>,
}

impl SqliteStore {
    pub fn append_log(&mut self, entry: NewLogEntry) -> Result<LogEntry, StoreError> {
        append_log_conn(&self.conn, now_ms(), entry)
    }

    /// Newest first.
    pub fn list_log(
        &self,
        limit: Option<usize>,
        since_ms: Option<i64>,
    ) -> Result<Vec<LogEntry>, StoreError> {
        let mut sql = String::from(
            "SELECT seq, ts_ms, action, details, node_id, tactic_id FROM action_log",
        );
        let mut args: Vec<i64> = Vec::new();

        if let Some(since) = since_ms {
            sql.push_str(" WHERE ts_ms >= ?");
            args.push(since);
        }
        sql.push_str(" ORDER BY ts_ms DESC, seq DESC");
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            args.push(
                i64::try_from(limit).map_err(|_| StoreError::InvalidInput("numeric overflow"))?,
            );
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(&args), |row| {
            Ok(LogEntry {
                seq: row.get(0)?,
                ts_ms: row.get(1)?,
                action: row.get(2)?,
                details: row.get(3)?,
                node_id: row.get(4)?,
                tactic_id: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn session_summary(&self, since_ms: Option<i64>) -> Result<SessionSummary, StoreError> {
        let entries = self.list_log(None, since_ms)?;
        let mut summary = SessionSummary::default();
        for entry in &entries {
            summary.total_actions += 1;
            *summary.by_action.entry(entry.action.clone()).or_insert(0) += 1;
            match entry.action.as_str() {
                "node_created" => summary.nodes_created += 1,
                "node_completed" => summary.nodes_completed += 1,
                "tactic_applied" => summary.tactics_applied += 1,
                "node_updated" => summary.nodes_updated += 1,
                _ => {}
            }
        }
        Ok(summary)
    }
}

pub(in crate::store) fn append_log_conn(
    conn: &Connection,
    ts_ms: i64,
    entry: NewLogEntry,
) -> Result<LogEntry, StoreError> {
    conn.execute(
        "INSERT INTO action_log(ts_ms, action, details, node_id, tactic_id) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            ts_ms,
            entry.action,
            entry.details,
            entry.node_id,
            entry.tactic_id
        ],
    )?;
    let seq = conn.last_insert_rowid();
    Ok(LogEntry {
        seq,
        ts_ms,
        action: entry.action,
        details: entry.details,
        node_id: entry.node_id,
        tactic_id: entry.tactic_id,
    })
}
