#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tc_core::graph::{GraphSnapshot, NodeStatus};
use tc_core::tactic::RankedTactic;
use tracing::{debug, warn};

const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_RERANK_LIMIT: usize = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Semantic reordering of the top-ranked candidates via an OpenAI-compatible
/// chat endpoint. Strictly best-effort: every failure path returns the
/// heuristic order unchanged, so search never fails because of this.
pub struct Reranker {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    base_url: String,
    limit: usize,
}

impl Reranker {
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;
        let model =
            std::env::var("TACTICIAN_LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url =
            std::env::var("TACTICIAN_API_BASE").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let limit = std::env::var("TACTICIAN_RERANK_LIMIT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_RERANK_LIMIT);
        let timeout_secs = std::env::var("TACTICIAN_RERANK_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .ok()?;

        Some(Self {
            client,
            api_key,
            model,
            base_url,
            limit,
        })
    }

    pub fn rerank(
        &self,
        query: &str,
        ranked: Vec<RankedTactic>,
        context: &str,
    ) -> Vec<RankedTactic> {
        if ranked.is_empty() {
            return ranked;
        }
        match self.request_order(query, &ranked, context) {
            Ok(order) => apply_order(ranked, &order, self.limit),
            Err(err) => {
                warn!("llm rerank failed, keeping heuristic order: {err}");
                ranked
            }
        }
    }

    fn request_order(
        &self,
        query: &str,
        ranked: &[RankedTactic],
        context: &str,
    ) -> Result<Vec<String>, RerankError> {
        let head = &ranked[..self.limit.min(ranked.len())];
        let prompt = build_prompt(query, head, context);
        debug!("rerank prompt:\n{prompt}");

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are a helpful assistant that ranks software development tactics."
                        .to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: 0.3,
            max_tokens: 500,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .map_err(RerankError::Http)?;

        if !response.status().is_success() {
            return Err(RerankError::Status(response.status().as_u16()));
        }

        let response: ChatResponse = response.json().map_err(RerankError::Http)?;
        let content = response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or(RerankError::EmptyResponse)?;
        debug!("rerank response: {content}");

        parse_order(&content)
    }
}

/// One-paragraph project summary included in the rerank prompt.
pub fn project_context_summary(snapshot: &GraphSnapshot) -> String {
    let complete: Vec<_> = snapshot
        .nodes()
        .iter()
        .filter(|node| node.status == NodeStatus::Complete)
        .collect();
    let pending: Vec<_> = snapshot
        .nodes()
        .iter()
        .filter(|node| node.status == NodeStatus::Pending)
        .collect();

    let mut context = String::from("Project State:\n");
    context.push_str(&format!("- {} completed nodes\n", complete.len()));
    context.push_str(&format!("- {} pending nodes\n\n", pending.len()));

    if !complete.is_empty() {
        context.push_str("Completed outputs:\n");
        for node in &complete {
            context.push_str(&format!("  - {} ({})\n", node.output, node.node_type));
        }
        context.push('\n');
    }

    if !pending.is_empty() {
        context.push_str("Pending goals:\n");
        for node in pending.iter().take(10) {
            context.push_str(&format!(
                "  - {}: {} ({})\n",
                node.id, node.output, node.node_type
            ));
        }
        if pending.len() > 10 {
            context.push_str(&format!("  ... and {} more\n", pending.len() - 10));
        }
        context.push('\n');
    }

    context
}

fn build_prompt(query: &str, candidates: &[RankedTactic], context: &str) -> String {
    let query = if query.is_empty() {
        "looking for next steps"
    } else {
        query
    };

    let mut prompt = format!(
        "You are helping a software developer choose the best tactic to apply next in their project.\n\n\
         {context}\n\
         User's search query: \"{query}\"\n\n\
         Here are {} candidate tactics, ranked by heuristics:\n\n",
        candidates.len()
    );

    for (index, candidate) in candidates.iter().enumerate() {
        let tactic = &candidate.tactic;
        prompt.push_str(&format!(
            "{}. {}\n   Type: {}\n   Output: {}\n   Description: {}\n   Tags: {}\n   Dependencies: {}\n",
            index + 1,
            tactic.id,
            tactic.tactic_type,
            tactic.output,
            tactic.description.as_deref().unwrap_or("No description"),
            if tactic.tags.is_empty() {
                "none".to_string()
            } else {
                tactic.tags.join(", ")
            },
            if tactic.match_deps.is_empty() {
                "none".to_string()
            } else {
                tactic.match_deps.join(", ")
            },
        ));
        if !tactic.subtasks.is_empty() {
            prompt.push_str(&format!("   Subtasks: {}\n", tactic.subtasks.len()));
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "Based on the project state and the user's query, rerank these tactics from most to least relevant.\n\
         Consider:\n\
         1. Semantic match with the user's intent\n\
         2. Logical next steps in the project workflow\n\
         3. Dependencies that are already satisfied\n\
         4. Impact on unblocking other work\n\n\
         Respond with ONLY a JSON array of tactic IDs in the new order, like:\n\
         [\"tactic_id_1\", \"tactic_id_2\", \"tactic_id_3\", ...]\n\n\
         Do not include any other text or explanation.",
    );

    prompt
}

fn parse_order(content: &str) -> Result<Vec<String>, RerankError> {
    serde_json::from_str(content.trim())
        .map_err(|err| RerankError::Malformed(err.to_string()))
}

/// Reorder the top `limit` candidates to match `order`. Unknown ids are
/// ignored; candidates the model omitted keep their relative order after the
/// reranked ones; everything beyond the limit is appended unchanged.
fn apply_order(
    mut ranked: Vec<RankedTactic>,
    order: &[String],
    limit: usize,
) -> Vec<RankedTactic> {
    let limit = limit.min(ranked.len());
    let tail = ranked.split_off(limit);
    let mut head: Vec<Option<RankedTactic>> = ranked.into_iter().map(Some).collect();

    let mut reordered = Vec::with_capacity(head.len() + tail.len());
    for id in order {
        let slot = head
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|entry| &entry.tactic.id == id));
        if let Some(slot) = slot {
            if let Some(entry) = slot.take() {
                reordered.push(entry);
            }
        }
    }
    reordered.extend(head.into_iter().flatten());
    reordered.extend(tail);
    reordered
}

#[derive(Debug)]
enum RerankError {
    Http(reqwest::Error),
    Status(u16),
    EmptyResponse,
    Malformed(String),
}

impl std::fmt::Display for RerankError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(err) => write!(f, "http: {err}"),
            Self::Status(code) => write!(f, "unexpected status {code}"),
            Self::EmptyResponse => write!(f, "empty response"),
            Self::Malformed(message) => write!(f, "malformed response: {message}"),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_core::tactic::{DependencyStatus, ScoreBreakdown, Tactic};

    fn ranked(id: &str) -> RankedTactic {
        RankedTactic {
            tactic: Tactic {
                id: id.to_string(),
                tactic_type: "task".to_string(),
                output: format!("{id}.out"),
                match_deps: Vec::new(),
                premises: Vec::new(),
                subtasks: Vec::new(),
                tags: Vec::new(),
                description: None,
                data_json: None,
            },
            deps: DependencyStatus::default(),
            scores: ScoreBreakdown::default(),
        }
    }

    fn ids(ranked: &[RankedTactic]) -> Vec<&str> {
        ranked.iter().map(|entry| entry.tactic.id.as_str()).collect()
    }

    #[test]
    fn reorders_the_head_and_keeps_the_tail() {
        let input = vec![ranked("a"), ranked("b"), ranked("c"), ranked("d")];
        let order = vec!["c".to_string(), "a".to_string()];
        let out = apply_order(input, &order, 3);
        // b was omitted by the model and follows the reranked entries; d is
        // beyond the limit and stays last.
        assert_eq!(ids(&out), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let input = vec![ranked("a"), ranked("b")];
        let order = vec!["ghost".to_string(), "b".to_string()];
        let out = apply_order(input, &order, 2);
        assert_eq!(ids(&out), vec!["b", "a"]);
    }

    #[test]
    fn duplicate_ids_in_the_order_are_harmless() {
        let input = vec![ranked("a"), ranked("b")];
        let order = vec!["b".to_string(), "b".to_string(), "a".to_string()];
        let out = apply_order(input, &order, 2);
        assert_eq!(ids(&out), vec!["b", "a"]);
    }

    #[test]
    fn parse_order_accepts_only_a_json_array() {
        assert_eq!(
            parse_order(" [\"x\", \"y\"] ").expect("array"),
            vec!["x".to_string(), "y".to_string()]
        );
        assert!(parse_order("not json").is_err());
        assert!(parse_order("{\"id\": 1}").is_err());
    }
}
