#![forbid(unsafe_code)]

use super::matcher::DependencyStatus;
use super::types::Tactic;
use crate::graph::{Edge, GraphSnapshot, INTRODUCED_AS_PREMISE, INTRODUCED_NODE_TYPE};
use std::collections::BTreeSet;

/// `created_by` prefix for nodes created by applying a tactic.
pub const TACTIC_CREATOR_PREFIX: &str = "tactic:";

#[derive(Clone, Debug)]
pub struct PlannedNode {
    pub id: String,
    pub node_type: String,
    pub output: String,
    pub parent_tactic: Option<String>,
    pub introduced_as: Option<String>,
    pub created_by: String,
    pub data_json: Option<String>,
}

impl PlannedNode {
    /// Placeholder nodes introduced for a premise, as opposed to the
    /// expansion nodes that carry the tactic's actual work.
    pub fn is_placeholder(&self) -> bool {
        self.introduced_as.is_some()
    }
}

#[derive(Clone, Debug, Default)]
pub struct ApplyPlan {
    pub nodes: Vec<PlannedNode>,
    pub edges: Vec<Edge>,
}

/// Build the full creation plan for applying a tactic. Pure; the store
/// executes the plan inside one transaction.
pub fn build_apply_plan(
    tactic: &Tactic,
    deps: &DependencyStatus,
    graph: &GraphSnapshot,
) -> ApplyPlan {
    let created_by = format!("{TACTIC_CREATOR_PREFIX}{}", tactic.id);
    let mut nodes = Vec::new();

    for output in &deps.can_introduce {
        nodes.push(PlannedNode {
            id: output.clone(),
            node_type: INTRODUCED_NODE_TYPE.to_string(),
            output: output.clone(),
            parent_tactic: None,
            introduced_as: Some(INTRODUCED_AS_PREMISE.to_string()),
            created_by: created_by.clone(),
            data_json: None,
        });
    }

    if tactic.subtasks.is_empty() {
        nodes.push(PlannedNode {
            id: tactic.id.clone(),
            node_type: tactic.tactic_type.clone(),
            output: tactic.output.clone(),
            parent_tactic: None,
            introduced_as: None,
            created_by: created_by.clone(),
            data_json: tactic.data_json.clone(),
        });
    } else {
        for subtask in &tactic.subtasks {
            nodes.push(PlannedNode {
                id: subtask.id.clone(),
                node_type: subtask.subtask_type.clone(),
                output: subtask.output.clone(),
                parent_tactic: Some(tactic.id.clone()),
                introduced_as: None,
                created_by: created_by.clone(),
                data_json: subtask.data_json.clone(),
            });
        }
    }

    let planned_ids: BTreeSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
    let mut edges: Vec<Edge> = Vec::new();
    let mut edge_keys: BTreeSet<(String, String)> = BTreeSet::new();

    for subtask in &tactic.subtasks {
        for dep in &subtask.depends_on {
            // Entries that do not name a planned node are silently dropped.
            if !planned_ids.contains(dep.as_str()) {
                continue;
            }
            push_edge(&mut edges, &mut edge_keys, dep, &subtask.id);
        }
    }

    // Wire every complete producer of a satisfied match output into each
    // expansion node. Placeholders never receive these edges.
    for output in &deps.satisfied {
        if !tactic.match_deps.iter().any(|dep| dep == output) {
            continue;
        }
        for producer in graph.complete_producers_of(output) {
            for node in nodes.iter().filter(|node| !node.is_placeholder()) {
                push_edge(&mut edges, &mut edge_keys, &producer.id, &node.id);
            }
        }
    }

    ApplyPlan { nodes, edges }
}

fn push_edge(
    edges: &mut Vec<Edge>,
    seen: &mut BTreeSet<(String, String)>,
    source: &str,
    target: &str,
) {
    if seen.insert((source.to_string(), target.to_string())) {
        edges.push(Edge {
            source_id: source.to_string(),
            target_id: target.to_string(),
        });
    }
}
