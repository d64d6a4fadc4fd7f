#![forbid(unsafe_code)]

use tc_core::graph::NodeIdError;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    InvalidId(NodeIdError),
    NodeNotFound(String),
    TacticNotFound(String),
    DuplicateNode(String),
    /// Apply blocked; carries the unmet identifiers in classification order.
    MissingDependencies(Vec<String>),
    UnknownEdgeEndpoint {
        source_id: String,
        target_id: String,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::InvalidId(err) => write!(f, "invalid id: {err}"),
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::TacticNotFound(id) => write!(f, "tactic not found: {id}"),
            Self::DuplicateNode(id) => write!(f, "node already exists: {id}"),
            Self::MissingDependencies(missing) => {
                write!(f, "missing dependencies: {}", missing.join(", "))
            }
            Self::UnknownEdgeEndpoint {
                source_id,
                target_id,
            } => write!(
                f,
                "edge endpoint does not exist ({source_id} -> {target_id})"
            ),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}

impl From<NodeIdError> for StoreError {
    fn from(value: NodeIdError) -> Self {
        Self::InvalidId(value)
    }
}
