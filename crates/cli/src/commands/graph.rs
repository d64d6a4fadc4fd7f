#![forbid(unsafe_code)]

use crate::{ui, workdir};
use colored::Colorize;
use std::collections::BTreeSet;
use tc_core::graph::{DerivedStatus, GraphSnapshot, Node, NodeStatus, derive_status};

pub fn run(goal_id: Option<&str>, mermaid: bool) -> anyhow::Result<()> {
    let store = workdir::open_store()?;
    let meta = store.project_meta()?;
    let graph = store.snapshot()?;

    if mermaid {
        print_mermaid(&graph);
        return Ok(());
    }

    if graph.nodes().is_empty() {
        println!("{}", "No nodes in project yet.".dimmed());
        println!(
            "{}",
            "Add a root goal: tactician node add <id> <output>".dimmed()
        );
        return Ok(());
    }

    let root_id = match goal_id {
        Some(id) => id.to_string(),
        None => match meta.root_goal {
            Some(root) => root,
            None => match find_first_root(&graph) {
                Some(root) => root,
                None => anyhow::bail!(
                    "no root node found (set root_goal in the project meta or pass a goal-id)"
                ),
            },
        },
    };
    if graph.node(&root_id).is_none() {
        anyhow::bail!("node not found: {root_id}");
    }

    println!();
    println!(
        "{}",
        format!("Project: {}", meta.name.as_deref().unwrap_or("untitled"))
            .bold()
            .cyan()
    );
    println!();

    let mut visited = BTreeSet::new();
    print_tree(&graph, &root_id, "", "", &mut visited);

    println!();
    println!("{}", "Legend: ✓=complete ⚡=ready ✗=blocked ◆=goal".dimmed());
    println!();
    Ok(())
}

/// First node with no incoming edges.
fn find_first_root(graph: &GraphSnapshot) -> Option<String> {
    let targets: BTreeSet<&str> = graph
        .edges()
        .iter()
        .map(|edge| edge.target_id.as_str())
        .collect();
    graph
        .nodes()
        .iter()
        .find(|node| !targets.contains(node.id.as_str()))
        .map(|node| node.id.clone())
}

/// Depth-first walk over outgoing edges. The visited set spans the whole
/// traversal so cycles terminate.
fn print_tree(
    graph: &GraphSnapshot,
    id: &str,
    prefix: &str,
    connector: &str,
    visited: &mut BTreeSet<String>,
) {
    if !visited.insert(id.to_string()) {
        return;
    }
    let Some(node) = graph.node(id) else {
        return;
    };

    let children: Vec<&Node> = graph
        .dependents_of(id)
        .into_iter()
        .filter(|child| !visited.contains(&child.id))
        .collect();

    println!(
        "{prefix}{connector}{}",
        render_node(graph, node, !children.is_empty())
    );

    let child_prefix = if connector.is_empty() {
        prefix.to_string()
    } else if connector.starts_with('└') {
        format!("{prefix}   ")
    } else {
        format!("{prefix}│  ")
    };
    let child_ids: Vec<String> = children.iter().map(|child| child.id.clone()).collect();
    for (index, child_id) in child_ids.iter().enumerate() {
        let connector = if index == child_ids.len() - 1 {
            "└─ "
        } else {
            "├─ "
        };
        print_tree(graph, child_id, &child_prefix, connector, visited);
    }
}

fn render_node(graph: &GraphSnapshot, node: &Node, has_children: bool) -> String {
    let status = derive_status(node, graph);
    let is_goal = has_children || node.node_type == "artifact";
    let symbol = if is_goal {
        "◆".magenta().to_string()
    } else {
        ui::status_symbol(status)
    };

    let mut line = format!("{symbol} {}", node.id.bold());
    if node.node_type != "artifact" {
        line.push_str(&format!(" {}", format!("[{}]", node.node_type).dimmed()));
    }

    match status {
        DerivedStatus::Ready => line.push_str(&format!(" {}", "(READY)".cyan())),
        DerivedStatus::Blocked => {
            let blocked_by: Vec<&str> = graph
                .dependencies_of(&node.id)
                .into_iter()
                .filter(|dep| dep.status != NodeStatus::Complete)
                .map(|dep| dep.id.as_str())
                .collect();
            if !blocked_by.is_empty() {
                line.push_str(&format!(
                    " {}",
                    format!("(BLOCKED: {})", blocked_by.join(", ")).red()
                ));
            }
        }
        DerivedStatus::Complete => {}
    }

    if status != DerivedStatus::Complete && graph.dependents_of(&node.id).len() > 1 {
        line.push_str(&format!(" {}", "[CRITICAL PATH]".yellow()));
    }
    if let Some(parent_tactic) = &node.parent_tactic {
        line.push_str(&format!(" {}", format!("(part of {parent_tactic})").dimmed()));
    }
    line
}

fn print_mermaid(graph: &GraphSnapshot) {
    if graph.nodes().is_empty() {
        println!("graph TD");
        println!("  empty[\"No nodes yet\"]");
        return;
    }

    let mut out = String::from("graph TD\n");
    for node in graph.nodes() {
        let status = derive_status(node, graph);
        let mermaid_id = sanitize_mermaid_id(&node.id);
        let label = format!("{}<br/>{}", node.id, node.output);
        match status {
            DerivedStatus::Complete => {
                out.push_str(&format!("  {mermaid_id}([\"{label}\"])\n"));
                out.push_str(&format!("  class {mermaid_id} complete\n"));
            }
            DerivedStatus::Ready => {
                out.push_str(&format!("  {mermaid_id}[\"{label}\"]\n"));
                out.push_str(&format!("  class {mermaid_id} ready\n"));
            }
            DerivedStatus::Blocked => {
                out.push_str(&format!("  {mermaid_id}[\"{label}\"]\n"));
                out.push_str(&format!("  class {mermaid_id} blocked\n"));
            }
        }
    }
    for edge in graph.edges() {
        out.push_str(&format!(
            "  {} --> {}\n",
            sanitize_mermaid_id(&edge.source_id),
            sanitize_mermaid_id(&edge.target_id)
        ));
    }
    out.push('\n');
    out.push_str("  classDef complete fill:#90EE90,stroke:#2E7D32,stroke-width:2px\n");
    out.push_str("  classDef ready fill:#87CEEB,stroke:#1976D2,stroke-width:2px\n");
    out.push_str("  classDef blocked fill:#FFB6C1,stroke:#C62828,stroke-width:2px\n");
    println!("{out}");
}

pub fn sanitize_mermaid_id(id: &str) -> String {
    id.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
