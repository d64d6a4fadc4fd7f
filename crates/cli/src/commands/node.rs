#![forbid(unsafe_code)]

use crate::{timefmt, ui, workdir};
use colored::Colorize;
use tc_core::graph::{DerivedStatus, NodeStatus, derive_status};
use tc_storage::{NewLogEntry, NewNode};

pub fn show(id: &str) -> anyhow::Result<()> {
    let store = workdir::open_store()?;
    let graph = store.snapshot()?;
    let Some(node) = graph.node(id) else {
        anyhow::bail!("node not found: {id}");
    };

    let status = derive_status(node, &graph);
    let deps = graph.dependencies_of(id);
    let blocks = graph.dependents_of(id);

    ui::print_header(&format!("Node: {id}"));
    println!();
    println!("{} {}", "Type:       ".bold(), node.node_type);
    println!("{} {}", "Output:     ".bold(), node.output);
    println!(
        "{} {} {}",
        "Status:     ".bold(),
        ui::status_symbol(status),
        ui::status_text(status)
    );
    if let Some(created_by) = &node.created_by {
        println!("{} {created_by}", "Created by: ".bold());
    }
    if let Some(parent_tactic) = &node.parent_tactic {
        println!("{} {parent_tactic}", "Part of:    ".bold());
    }
    if let Some(introduced_as) = &node.introduced_as {
        println!("{} {introduced_as}", "Introduced: ".bold());
    }
    println!();

    if !deps.is_empty() {
        println!("{}", "Dependencies:".bold());
        for dep in &deps {
            let dep_status = derive_status(dep, &graph);
            println!("  {} {}", ui::status_symbol(dep_status), dep.id);
        }
        println!();
    }

    if !blocks.is_empty() {
        println!("{}", "Blocks:".bold());
        for blocked in &blocks {
            println!("  • {}", blocked.id);
        }
        if blocks.len() > 1 {
            println!("{}", "  [CRITICAL PATH]".yellow());
        }
        println!();
    }

    if let Some(data_json) = &node.data_json {
        println!("{}", "Data:".bold());
        let pretty = serde_json::from_str::<serde_json::Value>(data_json)
            .and_then(|value| serde_json::to_string_pretty(&value))
            .unwrap_or_else(|_| data_json.clone());
        println!("{}", pretty.dimmed());
        println!();
    }

    println!("{}", "Metadata:".bold());
    println!("  Created:   {}", timefmt::ts_ms_display(node.created_at_ms));
    if let Some(completed_at_ms) = node.completed_at_ms {
        println!("  Completed: {}", timefmt::ts_ms_display(completed_at_ms));
    }
    Ok(())
}

pub fn add(id: &str, output: &str, node_type: &str, status: &str) -> anyhow::Result<()> {
    let mut store = workdir::open_store()?;

    let Some(status) = NodeStatus::parse(status) else {
        anyhow::bail!("invalid status: {status} (expected pending or complete)");
    };
    if store.get_node(id)?.is_some() {
        anyhow::bail!("node already exists: {id}");
    }

    let mut new = NewNode::new(id, node_type, output);
    new.status = status;
    if status == NodeStatus::Complete {
        new.completed_at_ms = Some(timefmt::now_ms());
    }
    store.add_node(new)?;
    store.append_log(NewLogEntry {
        action: "node_created".to_string(),
        details: Some(format!("Created node: {id}")),
        node_id: Some(id.to_string()),
        tactic_id: None,
    })?;

    ui::print_success(&format!("Created node: {id}"));
    Ok(())
}

pub fn edit(id: &str, status: &str) -> anyhow::Result<()> {
    let mut store = workdir::open_store()?;

    let Some(status) = NodeStatus::parse(status) else {
        anyhow::bail!("invalid status: {status} (expected pending or complete)");
    };
    if store.get_node(id)?.is_none() {
        anyhow::bail!("node not found: {id}");
    }

    let completed_at_ms = (status == NodeStatus::Complete).then(timefmt::now_ms);
    store.update_node_status(id, status, completed_at_ms)?;

    let action = if status == NodeStatus::Complete {
        "node_completed"
    } else {
        "node_updated"
    };
    store.append_log(NewLogEntry {
        action: action.to_string(),
        details: Some(format!("Updated {id} status to {}", status.as_str())),
        node_id: Some(id.to_string()),
        tactic_id: None,
    })?;
    ui::print_success(&format!("Updated: {id} → {}", status.as_str()));

    if status == NodeStatus::Complete {
        let graph = store.snapshot()?;
        let now_ready: Vec<&str> = graph
            .dependents_of(id)
            .into_iter()
            .filter(|node| derive_status(node, &graph) == DerivedStatus::Ready)
            .map(|node| node.id.as_str())
            .collect();
        if !now_ready.is_empty() {
            ui::print_success(&format!("Unblocked: {}", now_ready.join(", ")));
        }
    }
    Ok(())
}

pub fn delete(id: &str, force: bool) -> anyhow::Result<()> {
    let mut store = workdir::open_store()?;

    if store.get_node(id)?.is_none() {
        anyhow::bail!("node not found: {id}");
    }

    let blocks = store.dependents_of(id)?;
    if !blocks.is_empty() && !force {
        println!("{}", "Use --force to delete anyway".dimmed());
        anyhow::bail!("cannot delete {id}: it blocks {} node(s)", blocks.len());
    }

    store.delete_node(id)?;
    store.append_log(NewLogEntry {
        action: "node_deleted".to_string(),
        details: Some(format!("Deleted node: {id}")),
        node_id: Some(id.to_string()),
        tactic_id: None,
    })?;

    ui::print_success(&format!("Deleted node: {id}"));
    Ok(())
}
