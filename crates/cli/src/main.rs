//! Tactician - decompose software projects into task DAGs using reusable
//! tactics.

#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod doc;
mod rerank;
mod timefmt;
mod ui;
mod workdir;

/// Decompose software projects into task DAGs using reusable tactics
#[derive(Parser)]
#[command(name = "tactician")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging and detailed scoring output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new Tactician project
    Init,

    /// Manage nodes in the project graph
    #[command(subcommand)]
    Node(NodeCommands),

    /// Display the project dependency graph
    Graph {
        /// Node to use as the tree root
        goal_id: Option<String>,

        /// Output as a Mermaid diagram
        #[arg(long)]
        mermaid: bool,
    },

    /// List all open (incomplete) goals
    Goals {
        /// Output as a Mermaid diagram
        #[arg(long)]
        mermaid: bool,
    },

    /// View action history and session summary
    History {
        /// Limit number of entries
        #[arg(short, long)]
        limit: Option<usize>,

        /// Show actions since (e.g. 30m, 2h, 1d)
        #[arg(short, long)]
        since: Option<String>,

        /// Show a session summary instead of the detailed log
        #[arg(long)]
        summary: bool,
    },

    /// Search for applicable tactics
    Search {
        query: Option<String>,

        /// Show only ready tactics (all match dependencies satisfied)
        #[arg(long)]
        ready: bool,

        /// Filter by tactic type
        #[arg(long = "type")]
        tactic_type: Option<String>,

        /// Filter by tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,

        /// Align with specific goal nodes (comma-separated)
        #[arg(long)]
        goals: Option<String>,

        /// Use an LLM to semantically rerank results
        #[arg(long)]
        llm_rerank: bool,

        /// Limit number of results
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Apply a tactic to create new nodes
    Apply {
        tactic_id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Apply even if dependencies are missing
        #[arg(short, long)]
        force: bool,
    },

    /// Export the project graph (or the tactic catalog) as YAML
    Export {
        /// Export the tactic catalog instead of the project graph
        #[arg(long)]
        tactics: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the project graph from a YAML document
    Import { file: PathBuf },

    /// Manage the tactic catalog
    #[command(subcommand)]
    Tactics(TacticsCommands),
}

#[derive(Subcommand)]
enum NodeCommands {
    /// Show details for a node
    Show { id: String },

    /// Add a new node
    Add {
        id: String,
        output: String,

        /// Node type
        #[arg(long = "type", default_value = "artifact")]
        node_type: String,

        /// Initial status (pending or complete)
        #[arg(long, default_value = "pending")]
        status: String,
    },

    /// Update a node
    Edit {
        id: String,

        /// New status (pending or complete)
        #[arg(long)]
        status: String,
    },

    /// Delete a node (cascades its edges)
    Delete {
        id: String,

        /// Delete even if the node blocks others
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum TacticsCommands {
    /// Load tactics from a YAML document (replace-by-id)
    Load { file: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    if let Err(err) = run(cli) {
        ui::print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Node(command) => match command {
            NodeCommands::Show { id } => commands::node::show(&id),
            NodeCommands::Add {
                id,
                output,
                node_type,
                status,
            } => commands::node::add(&id, &output, &node_type, &status),
            NodeCommands::Edit { id, status } => commands::node::edit(&id, &status),
            NodeCommands::Delete { id, force } => commands::node::delete(&id, force),
        },
        Commands::Graph { goal_id, mermaid } => commands::graph::run(goal_id.as_deref(), mermaid),
        Commands::Goals { mermaid } => commands::goals::run(mermaid),
        Commands::History {
            limit,
            since,
            summary,
        } => commands::history::run(limit, since.as_deref(), summary),
        Commands::Search {
            query,
            ready,
            tactic_type,
            tags,
            goals,
            llm_rerank,
            limit,
        } => commands::search::run(commands::search::SearchArgs {
            query,
            ready,
            tactic_type,
            tags,
            goals,
            llm_rerank,
            limit,
            verbose: cli.verbose,
        }),
        Commands::Apply {
            tactic_id,
            yes,
            force,
        } => commands::apply::run(&tactic_id, yes, force),
        Commands::Export { tactics, output } => {
            commands::transfer::export(tactics, output.as_deref())
        }
        Commands::Import { file } => commands::transfer::import(&file),
        Commands::Tactics(command) => match command {
            TacticsCommands::Load { file } => commands::transfer::load_tactics(&file),
        },
    }
}
