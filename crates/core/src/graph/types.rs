#![forbid(unsafe_code)]

/// Node type assigned to placeholder nodes introduced for a premise.
pub const INTRODUCED_NODE_TYPE: &str = "artifact";

/// Value recorded in `introduced_as` for auto-introduced premise nodes.
pub const INTRODUCED_AS_PREMISE: &str = "premise";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeStatus {
    Pending,
    Complete,
}

impl NodeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Pending => "pending",
            NodeStatus::Complete => "complete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(NodeStatus::Pending),
            "complete" => Some(NodeStatus::Complete),
            _ => None,
        }
    }
}

/// Effective status derived from the stored status plus direct predecessors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DerivedStatus {
    Complete,
    Ready,
    Blocked,
}

impl DerivedStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DerivedStatus::Complete => "complete",
            DerivedStatus::Ready => "ready",
            DerivedStatus::Blocked => "blocked",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: String,
    pub node_type: String,
    /// Artifact identifier this node produces. Not unique across nodes.
    pub output: String,
    pub status: NodeStatus,
    pub created_by: Option<String>,
    pub created_at_ms: i64,
    pub completed_at_ms: Option<i64>,
    pub parent_tactic: Option<String>,
    pub introduced_as: Option<String>,
    /// Opaque JSON payload. Never inspected by core logic.
    pub data_json: Option<String>,
}

/// Directed dependency: target depends on source.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge {
    pub source_id: String,
    pub target_id: String,
}
