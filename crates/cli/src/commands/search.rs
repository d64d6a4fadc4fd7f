#![forbid(unsafe_code)]

use crate::{rerank, ui, workdir};
use colored::Colorize;
use tc_core::tactic::{RankOptions, RankedTactic, rank_tactics};
use tc_storage::TacticFilters;

pub struct SearchArgs {
    pub query: Option<String>,
    pub ready: bool,
    pub tactic_type: Option<String>,
    pub tags: Option<String>,
    pub goals: Option<String>,
    pub llm_rerank: bool,
    pub limit: usize,
    pub verbose: bool,
}

pub fn run(args: SearchArgs) -> anyhow::Result<()> {
    let store = workdir::open_store()?;
    let graph = store.snapshot()?;

    let filters = TacticFilters {
        tactic_type: args.tactic_type.clone(),
        tags: split_list(args.tags.as_deref()),
        keywords: Vec::new(),
    };
    let tactics = store.list_tactics(&filters)?;

    let query = args.query.clone().unwrap_or_default();
    let options = RankOptions {
        keywords: query.split_whitespace().map(str::to_string).collect(),
        goal_ids: split_list(args.goals.as_deref()),
    };
    let ranked = rank_tactics(tactics, &graph, &options);

    let mut filtered: Vec<RankedTactic> = if args.ready {
        ranked.into_iter().filter(|entry| entry.deps.ready).collect()
    } else {
        ranked
    };

    if args.llm_rerank {
        match rerank::Reranker::from_env() {
            Some(reranker) => {
                println!("{}", "Reranking with LLM...".dimmed());
                let context = rerank::project_context_summary(&graph);
                filtered = reranker.rerank(&query, filtered, &context);
            }
            None => ui::print_warning("LLM reranking unavailable (set OPENAI_API_KEY)"),
        }
    }

    let total = filtered.len();
    let results: Vec<RankedTactic> = filtered.into_iter().take(args.limit).collect();
    if results.is_empty() {
        println!("{}", "No tactics found matching criteria.".dimmed());
        return Ok(());
    }

    let title = if args.ready { "Ready Tactics" } else { "Search Results" };
    let shown = if total > results.len() {
        format!("{}/{total}", results.len())
    } else {
        results.len().to_string()
    };
    ui::print_header(&format!("{title} ({shown})"));
    println!();

    for (index, entry) in results.iter().enumerate() {
        let tactic = &entry.tactic;
        println!(
            "{}. {} → {}",
            index + 1,
            tactic.id.bold(),
            tactic.output.cyan()
        );
        println!("   {} {}", "Type:".dimmed(), tactic.tactic_type);

        if entry.deps.ready {
            println!("   {} {}", "✓".green(), "READY".green());
        } else {
            println!("   {} {}", "✗".red(), "NOT READY".red());
        }

        if !entry.deps.satisfied.is_empty() {
            let rendered: Vec<String> = entry
                .deps
                .satisfied
                .iter()
                .map(|dep| format!("✓ {dep}").green().to_string())
                .collect();
            println!("   {} {}", "Satisfied:".dimmed(), rendered.join(", "));
        }
        if !entry.deps.missing.is_empty() {
            let rendered: Vec<String> = entry
                .deps
                .missing
                .iter()
                .map(|dep| format!("✗ {dep}").red().to_string())
                .collect();
            println!("   {} {}", "Missing:".dimmed(), rendered.join(", "));
        }
        if !entry.deps.can_introduce.is_empty() {
            let rendered: Vec<String> = entry
                .deps
                .can_introduce
                .iter()
                .map(|dep| format!("⚡ {dep}").yellow().to_string())
                .collect();
            println!("   {} {}", "Can introduce:".dimmed(), rendered.join(", "));
        }

        if !tactic.tags.is_empty() {
            println!("   {} {}", "Tags:".dimmed(), tactic.tags.join(", "));
        }
        if let Some(description) = &tactic.description {
            println!("   {}", description.dimmed());
        }
        if !tactic.subtasks.is_empty() {
            let ids: Vec<&str> = tactic
                .subtasks
                .iter()
                .map(|subtask| subtask.id.as_str())
                .collect();
            println!(
                "   {} {} ({})",
                "Subtasks:".dimmed(),
                tactic.subtasks.len(),
                ids.join(", ")
            );
        }
        if args.verbose {
            println!(
                "   {} total={}, critical={}, keyword={}, goal={}",
                "Scores:".dimmed(),
                entry.scores.total,
                entry.scores.critical_path,
                entry.scores.keyword,
                entry.scores.goal
            );
        }
        println!();
    }

    if args.ready {
        println!(
            "{}",
            format!("{} tactic(s) ready to apply", results.len()).cyan()
        );
    } else {
        let ready_count = results.iter().filter(|entry| entry.deps.ready).count();
        println!(
            "{}",
            format!(
                "{ready_count} ready, {} not ready",
                results.len() - ready_count
            )
            .dimmed()
        );
    }
    Ok(())
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
