#![forbid(unsafe_code)]

const MAX_ID_LEN: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeIdError {
    Empty,
    TooLong,
    ContainsControl,
}

impl std::fmt::Display for NodeIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "id must not be empty"),
            Self::TooLong => write!(f, "id must be at most {MAX_ID_LEN} characters"),
            Self::ContainsControl => write!(f, "id must not contain control characters"),
        }
    }
}

impl std::error::Error for NodeIdError {}

/// Node and tactic ids share the same shape rules.
pub fn validate_node_id(value: &str) -> Result<(), NodeIdError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(NodeIdError::Empty);
    }
    if value.len() > MAX_ID_LEN {
        return Err(NodeIdError::TooLong);
    }
    if value.chars().any(char::is_control) {
        return Err(NodeIdError::ContainsControl);
    }
    Ok(())
}
