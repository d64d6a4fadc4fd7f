#![forbid(unsafe_code)]

use super::{DocError, data_to_json, data_to_yaml};
use serde::{Deserialize, Serialize};
use tc_core::tactic::{Subtask, Tactic};

/// One entry of the tactics document: an ordered YAML list of declarations.
#[derive(Debug, Serialize, Deserialize)]
pub struct TacticDoc {
    pub id: String,
    #[serde(rename = "type")]
    pub tactic_type: String,
    pub output: String,
    #[serde(default, rename = "match", skip_serializing_if = "Vec::is_empty")]
    pub match_deps: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub premises: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<SubtaskDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_yaml::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubtaskDoc {
    pub id: String,
    pub output: String,
    #[serde(rename = "type")]
    pub subtask_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_yaml::Value>,
}

pub fn parse_tactics_doc(raw: &str) -> Result<Vec<Tactic>, DocError> {
    let docs: Vec<TacticDoc> =
        serde_yaml::from_str(raw).map_err(|err| DocError::Malformed(err.to_string()))?;

    docs.into_iter()
        .map(|doc| {
            let subtasks = doc
                .subtasks
                .into_iter()
                .map(|subtask| {
                    Ok(Subtask {
                        id: subtask.id,
                        output: subtask.output,
                        subtask_type: subtask.subtask_type,
                        depends_on: subtask.depends_on,
                        data_json: data_to_json(subtask.data.as_ref())?,
                    })
                })
                .collect::<Result<Vec<_>, DocError>>()?;

            Ok(Tactic {
                id: doc.id,
                tactic_type: doc.tactic_type,
                output: doc.output,
                match_deps: doc.match_deps,
                premises: doc.premises,
                subtasks,
                tags: doc.tags,
                description: doc.description,
                data_json: data_to_json(doc.data.as_ref())?,
            })
        })
        .collect()
}

pub fn render_tactics_doc(tactics: &[Tactic]) -> Result<String, DocError> {
    let docs = tactics
        .iter()
        .map(|tactic| {
            let subtasks = tactic
                .subtasks
                .iter()
                .map(|subtask| {
                    Ok(SubtaskDoc {
                        id: subtask.id.clone(),
                        output: subtask.output.clone(),
                        subtask_type: subtask.subtask_type.clone(),
                        depends_on: subtask.depends_on.clone(),
                        data: data_to_yaml(subtask.data_json.as_deref())?,
                    })
                })
                .collect::<Result<Vec<_>, DocError>>()?;

            Ok(TacticDoc {
                id: tactic.id.clone(),
                tactic_type: tactic.tactic_type.clone(),
                output: tactic.output.clone(),
                match_deps: tactic.match_deps.clone(),
                premises: tactic.premises.clone(),
                tags: tactic.tags.clone(),
                description: tactic.description.clone(),
                subtasks,
                data: data_to_yaml(tactic.data_json.as_deref())?,
            })
        })
        .collect::<Result<Vec<_>, DocError>>()?;

    serde_yaml::to_string(&docs).map_err(|err| DocError::Malformed(err.to_string()))
}
