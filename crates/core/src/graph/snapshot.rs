#![forbid(unsafe_code)]

use super::types::{Edge, Node, NodeStatus};

/// In-memory view of the full graph, loaded once per logical operation.
///
/// Lookups are linear scans. Graphs are small and every operation is a single
/// short-lived invocation, so no indexing or caching is kept.
#[derive(Clone, Debug, Default)]
pub struct GraphSnapshot {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Direct predecessors: nodes this node depends on (incoming edges).
    pub fn dependencies_of(&self, id: &str) -> Vec<&Node> {
        self.edges
            .iter()
            .filter(|edge| edge.target_id == id)
            .filter_map(|edge| self.node(&edge.source_id))
            .collect()
    }

    /// Direct successors: nodes blocked behind this node (outgoing edges).
    pub fn dependents_of(&self, id: &str) -> Vec<&Node> {
        self.edges
            .iter()
            .filter(|edge| edge.source_id == id)
            .filter_map(|edge| self.node(&edge.target_id))
            .collect()
    }

    pub fn producers_of(&self, output: &str) -> Vec<&Node> {
        self.nodes.iter().filter(|node| node.output == output).collect()
    }

    pub fn complete_producers_of(&self, output: &str) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|node| node.output == output && node.status == NodeStatus::Complete)
            .collect()
    }

    pub fn has_output(&self, output: &str) -> bool {
        self.nodes.iter().any(|node| node.output == output)
    }

    pub fn has_complete_output(&self, output: &str) -> bool {
        self.nodes
            .iter()
            .any(|node| node.output == output && node.status == NodeStatus::Complete)
    }
}
