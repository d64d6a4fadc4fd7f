#![forbid(unsafe_code)]

use super::types::Tactic;
use crate::graph::GraphSnapshot;
use std::collections::BTreeSet;

/// Three-way classification of a tactic's declared dependencies.
#[derive(Clone, Debug, Default)]
pub struct DependencyStatus {
    /// Outputs with at least one complete producer node.
    pub satisfied: Vec<String>,
    /// Match outputs without a complete producer, and premise outputs whose
    /// only producers are incomplete (cannot auto-introduce over them).
    pub missing: Vec<String>,
    /// Premise outputs with no producer at all; a placeholder node can be
    /// introduced on apply.
    pub can_introduce: Vec<String>,
    /// True when every match dependency is satisfied. Premises never block
    /// readiness.
    pub ready: bool,
}

pub fn classify_dependencies(tactic: &Tactic, graph: &GraphSnapshot) -> DependencyStatus {
    let mut status = DependencyStatus::default();
    let mut seen: BTreeSet<&str> = BTreeSet::new();

    for dep in &tactic.match_deps {
        if !seen.insert(dep.as_str()) {
            continue;
        }
        if graph.has_complete_output(dep) {
            status.satisfied.push(dep.clone());
        } else {
            // A pending producer does not satisfy a match dependency.
            status.missing.push(dep.clone());
        }
    }

    for dep in &tactic.premises {
        // An identifier listed in both lists keeps its match classification.
        if !seen.insert(dep.as_str()) {
            continue;
        }
        if graph.has_complete_output(dep) {
            status.satisfied.push(dep.clone());
        } else if graph.has_output(dep) {
            status.missing.push(dep.clone());
        } else {
            status.can_introduce.push(dep.clone());
        }
    }

    status.ready = tactic
        .match_deps
        .iter()
        .all(|dep| graph.has_complete_output(dep));
    status
}
