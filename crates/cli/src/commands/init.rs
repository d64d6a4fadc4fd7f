#![forbid(unsafe_code)]

use crate::{doc, ui, workdir};
use colored::Colorize;
use tc_storage::{NewLogEntry, SqliteStore};

const DEFAULT_TACTICS: &str = include_str!("../../default-tactics.yaml");

pub fn run() -> anyhow::Result<()> {
    let dir = workdir::tactician_dir();
    if dir.exists() {
        anyhow::bail!("already initialized ({} exists)", dir.display());
    }

    let result = init_store();
    if result.is_err() && dir.exists() {
        // Leave no half-initialized directory behind.
        let _ = std::fs::remove_dir_all(&dir);
    }
    let count = result?;

    ui::print_success(&format!("Initialized {}/", workdir::TACTICIAN_DIR));
    ui::print_success(&format!("Loaded {count} default tactics"));
    println!();
    println!("{}", "Next steps:".dimmed());
    println!(
        "{}",
        "  1. Add a root goal: tactician node add <id> <output>".dimmed()
    );
    println!(
        "{}",
        "  2. Search for tactics: tactician search --ready".dimmed()
    );
    println!(
        "{}",
        "  3. Apply a tactic: tactician apply <tactic-id>".dimmed()
    );
    Ok(())
}

fn init_store() -> anyhow::Result<usize> {
    let mut store = SqliteStore::open(workdir::tactician_dir())?;
    store.set_project_meta("untitled-project", None)?;
    store.append_log(NewLogEntry {
        action: "project_initialized".to_string(),
        details: Some("Initialized new Tactician project".to_string()),
        node_id: None,
        tactic_id: None,
    })?;

    let tactics = doc::parse_tactics_doc(DEFAULT_TACTICS)?;
    Ok(store.import_tactics(&tactics)?)
}
