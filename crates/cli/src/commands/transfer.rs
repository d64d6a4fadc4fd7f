#![forbid(unsafe_code)]

use crate::{doc, ui, workdir};
use std::path::Path;
use tc_storage::{NewLogEntry, TacticFilters};

pub fn export(tactics: bool, output: Option<&Path>) -> anyhow::Result<()> {
    let store = workdir::open_store()?;

    let rendered = if tactics {
        let catalog = store.list_tactics(&TacticFilters::default())?;
        doc::render_tactics_doc(&catalog)?
    } else {
        let meta = store.project_meta()?;
        let snapshot = store.snapshot()?;
        doc::render_project_doc(&meta, &snapshot)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            ui::print_success(&format!("Exported to {}", path.display()));
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Destructive: replaces project meta, nodes, and edges with the document's
/// contents in one transaction.
pub fn import(file: &Path) -> anyhow::Result<()> {
    let mut store = workdir::open_store()?;

    let raw = std::fs::read_to_string(file)?;
    let import = doc::parse_project_doc(&raw)?;
    let node_count = import.nodes.len();
    store.import_project(import)?;
    store.append_log(NewLogEntry {
        action: "project_imported".to_string(),
        details: Some(format!("Imported project from {}", file.display())),
        node_id: None,
        tactic_id: None,
    })?;

    ui::print_success(&format!("Imported {node_count} node(s)"));
    Ok(())
}

pub fn load_tactics(file: &Path) -> anyhow::Result<()> {
    let mut store = workdir::open_store()?;

    let raw = std::fs::read_to_string(file)?;
    let tactics = doc::parse_tactics_doc(&raw)?;
    let count = store.import_tactics(&tactics)?;

    ui::print_success(&format!("Loaded {count} tactic(s)"));
    Ok(())
}
