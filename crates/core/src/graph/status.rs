#![forbid(unsafe_code)]

use super::snapshot::GraphSnapshot;
use super::types::{DerivedStatus, Node, NodeStatus};

/// Single-hop status derivation.
///
/// Stored `complete` dominates. Otherwise the node is ready when every direct
/// predecessor is stored-complete (transitive ancestors are not consulted).
/// Recomputed from scratch on every query; cycles cannot loop a one-hop check.
pub fn derive_status(node: &Node, graph: &GraphSnapshot) -> DerivedStatus {
    if node.status == NodeStatus::Complete {
        return DerivedStatus::Complete;
    }

    let predecessors = graph.dependencies_of(&node.id);
    if predecessors.is_empty() {
        return DerivedStatus::Ready;
    }

    if predecessors
        .iter()
        .all(|dep| dep.status == NodeStatus::Complete)
    {
        DerivedStatus::Ready
    } else {
        DerivedStatus::Blocked
    }
}
