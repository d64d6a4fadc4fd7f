#![forbid(unsafe_code)]

use super::*;
use tc_core::graph::{Edge, Node, NodeStatus, validate_node_id};
use tc_core::tactic::{DependencyStatus, build_apply_plan, classify_dependencies};

#[derive(Clone, Debug)]
pub struct AppliedTactic {
    pub tactic_id: String,
    pub created_nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub deps: DependencyStatus,
}

impl SqliteStore {
    /// Expand a tactic into concrete nodes and edges, atomically.
    ///
    /// The missing-dependency check runs before any write; one transaction
    /// covers every node, every edge, and the log entry, so a failure at any
    /// point leaves the store unchanged.
    pub fn apply_tactic(
        &mut self,
        tactic_id: &str,
        force: bool,
    ) -> Result<AppliedTactic, StoreError> {
        let Some(tactic) = self.get_tactic(tactic_id)? else {
            return Err(StoreError::TacticNotFound(tactic_id.to_string()));
        };

        let graph = self.snapshot()?;
        let deps = classify_dependencies(&tactic, &graph);
        if !deps.missing.is_empty() && !force {
            return Err(StoreError::MissingDependencies(deps.missing));
        }

        let plan = build_apply_plan(&tactic, &deps, &graph);
        let now = now_ms();
        let tx = self.conn.transaction()?;

        let mut created_nodes = Vec::with_capacity(plan.nodes.len());
        for planned in &plan.nodes {
            validate_node_id(&planned.id)?;
            if node_exists(&tx, &planned.id)? {
                return Err(StoreError::DuplicateNode(planned.id.clone()));
            }
            let node = Node {
                id: planned.id.clone(),
                node_type: planned.node_type.clone(),
                output: planned.output.clone(),
                status: NodeStatus::Pending,
                created_by: Some(planned.created_by.clone()),
                created_at_ms: now,
                completed_at_ms: None,
                parent_tactic: planned.parent_tactic.clone(),
                introduced_as: planned.introduced_as.clone(),
                data_json: planned.data_json.clone(),
            };
            insert_node(&tx, &node)?;
            created_nodes.push(node);
        }

        for edge in &plan.edges {
            insert_edge(&tx, edge)?;
        }

        append_log_conn(
            &tx,
            now,
            NewLogEntry {
                action: "tactic_applied".to_string(),
                details: Some(format!("Applied tactic: {tactic_id}")),
                node_id: None,
                tactic_id: Some(tactic_id.to_string()),
            },
        )?;

        tx.commit()?;
        Ok(AppliedTactic {
            tactic_id: tactic_id.to_string(),
            created_nodes,
            edges: plan.edges,
            deps,
        })
    }
}
