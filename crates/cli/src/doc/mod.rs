#![forbid(unsafe_code)]

mod project;
mod tactics;

pub use project::*;
pub use tactics::*;

#[derive(Debug)]
pub enum DocError {
    Malformed(String),
}

impl std::fmt::Display for DocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(message) => write!(f, "malformed document: {message}"),
        }
    }
}

impl std::error::Error for DocError {}

/// Opaque payloads live in the store as JSON text and in documents as plain
/// YAML values. JSON is a YAML subset, so the stored text parses directly.
fn data_to_yaml(data_json: Option<&str>) -> Result<Option<serde_yaml::Value>, DocError> {
    match data_json {
        None => Ok(None),
        Some(raw) => serde_yaml::from_str(raw)
            .map(Some)
            .map_err(|err| DocError::Malformed(format!("data payload: {err}"))),
    }
}

fn data_to_json(data: Option<&serde_yaml::Value>) -> Result<Option<String>, DocError> {
    match data {
        None => Ok(None),
        Some(value) => serde_json::to_string(value)
            .map(Some)
            .map_err(|err| DocError::Malformed(format!("data payload: {err}"))),
    }
}
