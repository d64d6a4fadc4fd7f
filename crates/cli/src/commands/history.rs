#![forbid(unsafe_code)]

use crate::{timefmt, ui, workdir};
use colored::Colorize;

pub fn run(limit: Option<usize>, since: Option<&str>, summary: bool) -> anyhow::Result<()> {
    let store = workdir::open_store()?;

    let since_ms = match since {
        None => None,
        Some(raw) => match timefmt::since_to_ts_ms(raw, timefmt::now_ms()) {
            Some(cutoff) => Some(cutoff),
            None => anyhow::bail!("invalid --since value: {raw} (expected e.g. 30m, 2h, 1d)"),
        },
    };

    let entries = store.list_log(limit, since_ms)?;
    if entries.is_empty() {
        println!("{}", "No actions recorded yet.".dimmed());
        return Ok(());
    }

    if summary {
        let summary = store.session_summary(since_ms)?;
        ui::print_header("Session Summary");
        println!();
        println!("{} {}", "Total Actions:     ".bold(), summary.total_actions);
        println!(
            "{} {}",
            "Nodes Created:     ".bold(),
            summary.nodes_created.to_string().green()
        );
        println!(
            "{} {}",
            "Nodes Completed:   ".bold(),
            summary.nodes_completed.to_string().green()
        );
        println!(
            "{} {}",
            "Tactics Applied:   ".bold(),
            summary.tactics_applied.to_string().magenta()
        );
        println!(
            "{} {}",
            "Nodes Modified:    ".bold(),
            summary.nodes_updated.to_string().yellow()
        );
        println!();
        if !summary.by_action.is_empty() {
            println!("{}", "Actions by Type:".bold());
            for (action, count) in &summary.by_action {
                println!("  {} {action}: {count}", ui::action_symbol(action));
            }
            println!();
        }
        return Ok(());
    }

    let title = match since {
        Some(raw) => format!("Action History (last {raw})"),
        None => "Action History".to_string(),
    };
    ui::print_header(&title);
    println!();

    // Oldest first for reading top to bottom.
    for (index, entry) in entries.iter().rev().enumerate() {
        println!(
            "{} {} {}",
            timefmt::ts_ms_display(entry.ts_ms).dimmed(),
            ui::action_symbol(&entry.action),
            entry.action.bold()
        );
        if let Some(details) = &entry.details {
            println!("  {}", details.dimmed());
        }
        if let Some(node_id) = &entry.node_id {
            println!("  {} {node_id}", "Node:".dimmed());
        }
        if let Some(tactic_id) = &entry.tactic_id {
            println!("  {} {tactic_id}", "Tactic:".dimmed());
        }
        if index < entries.len() - 1 {
            println!();
        }
    }

    println!();
    println!("{}", format!("Showing {} action(s)", entries.len()).dimmed());
    Ok(())
}
