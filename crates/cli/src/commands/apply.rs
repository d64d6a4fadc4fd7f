#![forbid(unsafe_code)]

use crate::{ui, workdir};
use colored::Colorize;
use std::io::Write;
use tc_core::tactic::{build_apply_plan, classify_dependencies};

pub fn run(tactic_id: &str, yes: bool, force: bool) -> anyhow::Result<()> {
    let mut store = workdir::open_store()?;

    let Some(tactic) = store.get_tactic(tactic_id)? else {
        anyhow::bail!("tactic not found: {tactic_id}");
    };

    let graph = store.snapshot()?;
    let deps = classify_dependencies(&tactic, &graph);

    ui::print_header(&format!("Applying: {tactic_id}"));
    println!();
    println!("{} {}", "Type:".bold(), tactic.tactic_type);
    println!("{} {}", "Output:".bold(), tactic.output);
    if let Some(description) = &tactic.description {
        println!("{}", description.dimmed());
    }
    println!();

    if !deps.satisfied.is_empty() {
        println!(
            "{} {}",
            "✓ Satisfied:".green(),
            deps.satisfied.join(", ")
        );
    }
    if !deps.missing.is_empty() {
        println!("{} {}", "✗ Missing:".red(), deps.missing.join(", "));
        if !force {
            println!("{}", "Use --force to apply anyway".dimmed());
            anyhow::bail!("cannot apply tactic: missing required dependencies");
        }
        ui::print_warning("Applying with missing dependencies (--force)");
    }
    if !deps.can_introduce.is_empty() {
        println!(
            "{} {}",
            "⚡ Will introduce:".yellow(),
            deps.can_introduce.join(", ")
        );
    }
    println!();

    // Preview only; the store rebuilds and executes the plan atomically.
    let plan = build_apply_plan(&tactic, &deps, &graph);
    println!(
        "{}",
        format!("This will create {} node(s):", plan.nodes.len()).bold()
    );
    for planned in &plan.nodes {
        let label = if planned.is_placeholder() {
            "[premise]".yellow().to_string()
        } else if planned.parent_tactic.is_some() {
            "[subtask]".cyan().to_string()
        } else {
            String::new()
        };
        println!("  • {} {label}", planned.id.bold());
        println!(
            "    {} {}, {} {}",
            "Type:".dimmed(),
            planned.node_type,
            "Output:".dimmed(),
            planned.output
        );
    }
    println!();

    if !tactic.subtasks.is_empty() {
        println!("{}", "Dependency structure:".bold());
        for subtask in &tactic.subtasks {
            if !subtask.depends_on.is_empty() {
                println!("  {} depends on: {}", subtask.id, subtask.depends_on.join(", "));
            }
            let dependents: Vec<&str> = tactic
                .subtasks
                .iter()
                .filter(|other| other.depends_on.iter().any(|dep| dep == &subtask.id))
                .map(|other| other.id.as_str())
                .collect();
            if !dependents.is_empty() {
                println!("  {} blocks: {}", subtask.id, dependents.join(", "));
            }
        }
        println!();
    }

    if !yes && !confirm("Apply this tactic?")? {
        println!("{}", "Cancelled.".dimmed());
        return Ok(());
    }

    let applied = store.apply_tactic(tactic_id, force)?;

    ui::print_success(&format!("Created {} node(s)", applied.created_nodes.len()));
    println!();
    println!("{}", "Next steps:".dimmed());
    println!("{}", "  • Run \"tactician goals\" to see new tasks".dimmed());
    println!("{}", "  • Run \"tactician graph\" to visualize the DAG".dimmed());
    Ok(())
}

fn confirm(message: &str) -> anyhow::Result<bool> {
    print!("{message} [y/n] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
