#![forbid(unsafe_code)]

use colored::Colorize;
use tc_core::graph::DerivedStatus;

pub fn status_symbol(status: DerivedStatus) -> String {
    match status {
        DerivedStatus::Complete => "✓".green().to_string(),
        DerivedStatus::Ready => "⚡".cyan().to_string(),
        DerivedStatus::Blocked => "✗".red().to_string(),
    }
}

pub fn status_text(status: DerivedStatus) -> String {
    match status {
        DerivedStatus::Complete => "COMPLETE".green().to_string(),
        DerivedStatus::Ready => "READY".cyan().to_string(),
        DerivedStatus::Blocked => "BLOCKED".red().to_string(),
    }
}

pub fn action_symbol(action: &str) -> &'static str {
    match action {
        "project_initialized" => "*",
        "node_created" => "+",
        "node_updated" => "~",
        "node_completed" => "✓",
        "node_deleted" => "-",
        "tactic_applied" => "⚡",
        _ => "•",
    }
}

pub fn print_header(text: &str) {
    println!();
    println!("{}", text.bold().cyan());
    println!("{}", "━".repeat(50).dimmed());
}

pub fn print_success(text: &str) {
    println!("{} {text}", "✓".green());
}

pub fn print_error(text: &str) {
    println!("{} {text}", "✗".red());
}

pub fn print_warning(text: &str) {
    println!("{} {text}", "!".yellow());
}
