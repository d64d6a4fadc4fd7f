#![forbid(unsafe_code)]

use super::*;
use rusqlite::{OptionalExtension, params_from_iter};
use tc_core::graph::validate_node_id;
use tc_core::tactic::{DependencyKind, Subtask, Tactic};

#[derive(Clone, Debug, Default)]
pub struct TacticFilters {
    pub tactic_type: Option<String>,
    /// Any matching tag qualifies.
    pub tags: Vec<String>,
    /// Any keyword may match id, description, or tags.
    pub keywords: Vec<String>,
}

impl SqliteStore {
    /// Replace-by-id: the row plus its dependency and subtask tables are
    /// rewritten in one transaction.
    pub fn put_tactic(&mut self, tactic: &Tactic) -> Result<(), StoreError> {
        validate_node_id(&tactic.id)?;
        let tx = self.conn.transaction()?;
        put_tactic_tx(&tx, tactic)?;
        tx.commit()?;
        Ok(())
    }

    pub fn import_tactics(&mut self, tactics: &[Tactic]) -> Result<usize, StoreError> {
        for tactic in tactics {
            validate_node_id(&tactic.id)?;
        }
        let tx = self.conn.transaction()?;
        for tactic in tactics {
            put_tactic_tx(&tx, tactic)?;
        }
        tx.commit()?;
        Ok(tactics.len())
    }

    pub fn get_tactic(&self, id: &str) -> Result<Option<Tactic>, StoreError> {
        read_tactic(&self.conn, id)
    }

    /// Catalog order (insertion order) is preserved; the ranker's stable sort
    /// depends on it for ties.
    pub fn list_tactics(&self, filters: &TacticFilters) -> Result<Vec<Tactic>, StoreError> {
        let mut sql = String::from("SELECT id FROM tactics");
        let mut clauses: Vec<String> = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(tactic_type) = &filters.tactic_type {
            clauses.push("tactic_type = ?".to_string());
            args.push(tactic_type.clone());
        }
        if !filters.tags.is_empty() {
            let pattern = filters
                .tags
                .iter()
                .map(|_| "tags_json LIKE ?")
                .collect::<Vec<_>>()
                .join(" OR ");
            clauses.push(format!("({pattern})"));
            for tag in &filters.tags {
                args.push(format!("%{tag}%"));
            }
        }
        if !filters.keywords.is_empty() {
            let pattern = filters
                .keywords
                .iter()
                .map(|_| "(id LIKE ? OR description LIKE ? OR tags_json LIKE ?)")
                .collect::<Vec<_>>()
                .join(" OR ");
            clauses.push(format!("({pattern})"));
            for keyword in &filters.keywords {
                let like = format!("%{keyword}%");
                args.push(like.clone());
                args.push(like.clone());
                args.push(like);
            }
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(&args), |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut tactics = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(tactic) = read_tactic(&self.conn, &id)? {
                tactics.push(tactic);
            }
        }
        Ok(tactics)
    }
}

fn put_tactic_tx(conn: &Connection, tactic: &Tactic) -> Result<(), StoreError> {
    let tags_json = if tactic.tags.is_empty() {
        None
    } else {
        Some(encode_json(&tactic.tags)?)
    };

    conn.execute(
        "INSERT OR REPLACE INTO tactics(id, tactic_type, output, description, tags_json, data_json) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            tactic.id,
            tactic.tactic_type,
            tactic.output,
            tactic.description,
            tags_json,
            tactic.data_json,
        ],
    )?;

    conn.execute(
        "DELETE FROM tactic_dependencies WHERE tactic_id=?1",
        params![tactic.id],
    )?;
    conn.execute(
        "DELETE FROM tactic_subtasks WHERE tactic_id=?1",
        params![tactic.id],
    )?;

    for (kind, outputs) in [
        (DependencyKind::Match, &tactic.match_deps),
        (DependencyKind::Premise, &tactic.premises),
    ] {
        for output in outputs {
            conn.execute(
                "INSERT INTO tactic_dependencies(tactic_id, kind, output) VALUES (?1, ?2, ?3)",
                params![tactic.id, kind.as_str(), output],
            )?;
        }
    }

    for (position, subtask) in tactic.subtasks.iter().enumerate() {
        let depends_on_json = if subtask.depends_on.is_empty() {
            None
        } else {
            Some(encode_json(&subtask.depends_on)?)
        };
        conn.execute(
            "INSERT INTO tactic_subtasks(tactic_id, position, subtask_id, output, subtask_type, \
                                         depends_on_json, data_json) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                tactic.id,
                position as i64,
                subtask.id,
                subtask.output,
                subtask.subtask_type,
                depends_on_json,
                subtask.data_json,
            ],
        )?;
    }

    Ok(())
}

fn read_tactic(conn: &Connection, id: &str) -> Result<Option<Tactic>, StoreError> {
    let row = conn
        .query_row(
            "SELECT id, tactic_type, output, description, tags_json, data_json \
             FROM tactics WHERE id=?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((id, tactic_type, output, description, tags_json, data_json)) = row else {
        return Ok(None);
    };

    let tags = match tags_json.as_deref() {
        Some(raw) => decode_json(raw)?,
        None => Vec::new(),
    };

    let mut stmt = conn.prepare(
        "SELECT kind, output FROM tactic_dependencies WHERE tactic_id=?1 ORDER BY rowid ASC",
    )?;
    let deps = stmt
        .query_map(params![id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut match_deps = Vec::new();
    let mut premises = Vec::new();
    for (kind, output) in deps {
        match DependencyKind::parse(&kind) {
            Some(DependencyKind::Match) => match_deps.push(output),
            Some(DependencyKind::Premise) => premises.push(output),
            None => return Err(StoreError::InvalidInput("unknown dependency kind")),
        }
    }

    let mut stmt = conn.prepare(
        "SELECT subtask_id, output, subtask_type, depends_on_json, data_json \
         FROM tactic_subtasks WHERE tactic_id=?1 ORDER BY position ASC",
    )?;
    let subtasks = stmt
        .query_map(params![id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|(id, output, subtask_type, depends_on_json, data_json)| {
            let depends_on = match depends_on_json.as_deref() {
                Some(raw) => decode_json(raw)?,
                None => Vec::new(),
            };
            Ok(Subtask {
                id,
                output,
                subtask_type,
                depends_on,
                data_json,
            })
        })
        .collect::<Result<Vec<_>, StoreError>>()?;

    Ok(Some(Tactic {
        id,
        tactic_type,
        output,
        match_deps,
        premises,
        subtasks,
        tags,
        description,
        data_json,
    }))
}

fn encode_json(values: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(values).map_err(|_| StoreError::InvalidInput("list must encode as json"))
}

fn decode_json(raw: &str) -> Result<Vec<String>, StoreError> {
    serde_json::from_str(raw).map_err(|_| StoreError::InvalidInput("invalid json list column"))
}
