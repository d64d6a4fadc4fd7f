#![forbid(unsafe_code)]

use super::matcher::{DependencyStatus, classify_dependencies};
use super::types::Tactic;
use crate::graph::{GraphSnapshot, NodeStatus};

const READY_SCORE: i64 = 1000;
const NOT_READY_SCORE: i64 = -500;
const CRITICAL_PATH_WEIGHT: i64 = 50;
const KEYWORD_WEIGHT: i64 = 10;
const GOAL_WEIGHT: i64 = 5;

#[derive(Clone, Debug, Default)]
pub struct RankOptions {
    /// Whitespace-split query tokens, matched case-insensitively.
    pub keywords: Vec<String>,
    /// Node ids to align the tactic's output against.
    pub goal_ids: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub total: i64,
    pub critical_path: i64,
    pub keyword: i64,
    pub goal: i64,
}

#[derive(Clone, Debug)]
pub struct RankedTactic {
    pub tactic: Tactic,
    pub deps: DependencyStatus,
    pub scores: ScoreBreakdown,
}

/// Score and order the catalog. Strictly additive over four terms; the sort
/// is stable, so tied totals keep catalog order.
pub fn rank_tactics(
    tactics: Vec<Tactic>,
    graph: &GraphSnapshot,
    options: &RankOptions,
) -> Vec<RankedTactic> {
    let mut ranked: Vec<RankedTactic> = tactics
        .into_iter()
        .map(|tactic| {
            let deps = classify_dependencies(&tactic, graph);
            let critical_path = critical_path_score(&tactic, graph);
            let keyword = keyword_score(&tactic, &options.keywords);
            let goal = goal_alignment_score(&tactic, &options.goal_ids, graph);

            let readiness = if deps.ready { READY_SCORE } else { NOT_READY_SCORE };
            let total = readiness
                + critical_path * CRITICAL_PATH_WEIGHT
                + keyword * KEYWORD_WEIGHT
                + goal * GOAL_WEIGHT;

            RankedTactic {
                tactic,
                deps,
                scores: ScoreBreakdown {
                    total,
                    critical_path,
                    keyword,
                    goal,
                },
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.scores.total.cmp(&a.scores.total));
    ranked
}

/// +2 for each pending node this tactic's output would fully unblock (sole
/// unmet predecessor), +1 when it is one blocker among several.
fn critical_path_score(tactic: &Tactic, graph: &GraphSnapshot) -> i64 {
    let mut score = 0;
    for node in graph
        .nodes()
        .iter()
        .filter(|node| node.status == NodeStatus::Pending)
    {
        let unmet: Vec<_> = graph
            .dependencies_of(&node.id)
            .into_iter()
            .filter(|dep| dep.status != NodeStatus::Complete)
            .collect();
        if unmet.iter().any(|dep| dep.output == tactic.output) {
            score += if unmet.len() == 1 { 2 } else { 1 };
        }
    }
    score
}

/// Per token: +10 on the id, +5 on any tag, +2 on the description.
fn keyword_score(tactic: &Tactic, keywords: &[String]) -> i64 {
    if keywords.is_empty() {
        return 0;
    }

    let id = tactic.id.to_lowercase();
    let description = tactic
        .description
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let tags: Vec<String> = tactic.tags.iter().map(|tag| tag.to_lowercase()).collect();

    let mut score = 0;
    for keyword in keywords {
        let keyword = keyword.to_lowercase();
        if id.contains(&keyword) {
            score += 10;
        }
        if tags.iter().any(|tag| tag.contains(&keyword)) {
            score += 5;
        }
        if description.contains(&keyword) {
            score += 2;
        }
    }
    score
}

/// Per goal: +20 when the tactic produces the goal's own output, +10 when it
/// produces the output of one of the goal's direct dependencies.
fn goal_alignment_score(tactic: &Tactic, goal_ids: &[String], graph: &GraphSnapshot) -> i64 {
    let mut score = 0;
    for goal_id in goal_ids {
        let Some(goal) = graph.node(goal_id) else {
            continue;
        };
        if tactic.output == goal.output {
            score += 20;
        }
        if graph
            .dependencies_of(goal_id)
            .iter()
            .any(|dep| dep.output == tactic.output)
        {
            score += 10;
        }
    }
    score
}
