#![forbid(unsafe_code)]

use crate::commands::graph::sanitize_mermaid_id;
use crate::{ui, workdir};
use colored::Colorize;
use tc_core::graph::{DerivedStatus, GraphSnapshot, Node, NodeStatus, derive_status};

pub fn run(mermaid: bool) -> anyhow::Result<()> {
    let store = workdir::open_store()?;
    let graph = store.snapshot()?;

    let pending: Vec<&Node> = graph
        .nodes()
        .iter()
        .filter(|node| node.status == NodeStatus::Pending)
        .collect();

    if mermaid {
        print_mermaid(&graph, &pending);
        return Ok(());
    }

    if pending.is_empty() {
        println!("{}", "✓ All goals complete!".green());
        return Ok(());
    }

    // Ready goals first; the sort is stable so insertion order holds within
    // each group.
    let mut with_status: Vec<(&Node, DerivedStatus)> = pending
        .iter()
        .map(|node| (*node, derive_status(node, &graph)))
        .collect();
    with_status.sort_by_key(|(_, status)| match status {
        DerivedStatus::Ready => 0,
        _ => 1,
    });

    let ready_count = with_status
        .iter()
        .filter(|(_, status)| *status == DerivedStatus::Ready)
        .count();
    let blocked_count = with_status.len() - ready_count;

    ui::print_header(&format!("Open Goals ({})", with_status.len()));
    println!();
    if ready_count > 0 {
        println!("{}", format!("Ready to work on ({ready_count}):").bold().cyan());
        println!();
    }

    for (index, (node, status)) in with_status.iter().enumerate() {
        if index == ready_count && *status == DerivedStatus::Blocked {
            println!("{}", format!("Blocked ({blocked_count}):").bold().red());
            println!();
        }

        println!(
            "{} {} [{}]",
            ui::status_symbol(*status),
            node.id.bold(),
            ui::status_text(*status)
        );
        println!("   {} {}", "Output:".dimmed(), node.output);

        let deps = graph.dependencies_of(&node.id);
        if !deps.is_empty() {
            let rendered: Vec<String> = deps
                .iter()
                .map(|dep| format!("{} {}", ui::status_symbol(derive_status(dep, &graph)), dep.id))
                .collect();
            println!("   {} {}", "Dependencies:".dimmed(), rendered.join(", "));
        }

        let blocks = graph.dependents_of(&node.id);
        if !blocks.is_empty() {
            let ids: Vec<&str> = blocks.iter().map(|node| node.id.as_str()).collect();
            let mut line = format!("   {} {}", "Blocks:".dimmed(), ids.join(", "));
            if blocks.len() > 1 {
                line.push_str(&format!(" {}", "[CRITICAL PATH]".yellow()));
            }
            println!("{line}");
        }

        if let Some(parent_tactic) = &node.parent_tactic {
            println!("   {} {parent_tactic}", "Part of:".dimmed());
        }
        println!();
    }

    if ready_count > 0 {
        println!(
            "{}",
            format!("{ready_count} goal(s) ready to work on now").cyan()
        );
    } else {
        println!(
            "{}",
            "No goals are ready. Complete dependencies to unblock tasks.".yellow()
        );
    }
    Ok(())
}

fn print_mermaid(graph: &GraphSnapshot, pending: &[&Node]) {
    if pending.is_empty() {
        println!("graph TD");
        println!("  empty[\"All goals complete!\"]");
        return;
    }

    let mut out = String::from("graph TD\n");
    for node in pending {
        let status = derive_status(node, graph);
        let mermaid_id = sanitize_mermaid_id(&node.id);
        let label = format!(
            "{}<br/>{}<br/>[{}]",
            node.id,
            node.output,
            status.as_str().to_uppercase()
        );
        out.push_str(&format!("  {mermaid_id}[\"{label}\"]\n"));
        match status {
            DerivedStatus::Ready => out.push_str(&format!("  class {mermaid_id} ready\n")),
            DerivedStatus::Blocked => out.push_str(&format!("  class {mermaid_id} blocked\n")),
            DerivedStatus::Complete => {}
        }
    }
    for node in pending {
        let target = sanitize_mermaid_id(&node.id);
        for dep in graph.dependencies_of(&node.id) {
            out.push_str(&format!("  {} --> {target}\n", sanitize_mermaid_id(&dep.id)));
        }
    }
    out.push('\n');
    out.push_str("  classDef ready fill:#87CEEB,stroke:#1976D2,stroke-width:2px\n");
    out.push_str("  classDef blocked fill:#FFB6C1,stroke:#C62828,stroke-width:2px\n");
    println!("{out}");
}
