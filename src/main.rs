//! # DW - Design Workflow
//!
//! A file-backed workflow manager for turning feature lists into design
//! documents, PRDs and prototypes. Tasks move across a fixed four-stage Kanban
//! (Feature List → Design Doc → PRD → Prototype); documents are driven by
//! Markdown templates and versioned AI prompts with `{{variable}}` placeholders.
//!
//! ## Interfaces
//!
//! - `dw serve` - HTTP JSON API; every response is `{success, data, error}`
//! - `dw board <project>` - terminal Kanban board
//! - `dw project|task|template|prompt|archive|stats ...` - the same operations from the shell
//!
//! ## Quick Start
//!
//! ```bash
//! dw project create "Harbor" --tech rust,axum
//! dw task add harbor "Fishing loop" --features "cast, reel, sell"
//! dw task move <task-id> design
//! dw board harbor
//!
//! # API on 127.0.0.1:3001
//! dw serve
//! ```
//!
//! ## Storage
//!
//! Everything lives under `--workspace` (default `./workspace`, env `DW_WORKSPACE`):
//! template and prompt indexes plus Markdown bodies under `templates/`, and one
//! directory per project with its tasks and archives. Writes go through a temp
//! file and rename, so the folder is safe to keep under version control.

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod analytics;
pub mod api;
pub mod archive_store;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod kanban;
pub mod project;
pub mod project_store;
pub mod prompt_seed;
pub mod prompt_store;
pub mod task;
pub mod task_store;
pub mod template;
pub mod template_store;
pub mod validation;
pub mod variables;
pub mod tui {
    pub mod colors;
    pub mod workflow;
    pub mod workflow_run;
}

use cli::Cli;
use cmd::*;
use config::Config;
use db::Workspace;

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() {
    let cli = Cli::parse();

    // Log lines would draw over the board.
    if !matches!(cli.command, Commands::Board { .. }) {
        init_tracing(&cli.log);
    }

    let workspace = Workspace::new(&cli.workspace);

    match cli.command {
        Commands::Serve { host, port } => cmd_serve(Config { workspace: cli.workspace, host, port }),

        Commands::Board { project } => cmd_board(&workspace, &project),

        Commands::Project { action } => cmd_project(&workspace, action),

        Commands::Task { action } => cmd_task(&workspace, action),

        Commands::Template { action } => cmd_template(&workspace, action),

        Commands::Prompt { action } => cmd_prompt(&workspace, action),

        Commands::Archive { action } => cmd_archive(&workspace, action),

        Commands::Stats { action } => cmd_stats(&workspace, action),

        Commands::Completions { shell } => cmd_completions(shell),
    }
}
