//! CLI entry point for kanban.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use kanban_app::{ProjectConfig, TaskService, TaskStore};
use kanban_store_http::HttpGateway;

mod commands;
mod view;

/// Kanban board backed by a remote todo API.
#[derive(Parser, Debug)]
#[command(
    name = "kanban",
    version,
    about = "kanban: a task board over a remote todo service"
)]
struct Cli {
    /// Config file (defaults to the per-user kanban/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the todo service; wins over the file and KANBAN_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tasks, optionally filtered and sorted.
    Ls {
        #[arg(short = 's', long = "status")]
        statuses: Vec<String>,
        #[arg(short = 'p', long = "priority")]
        priorities: Vec<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(short = 'a', long)]
        assignee: Option<String>,
        /// `dueDate`, `createdAt` or `priority`, with an optional `:asc` / `:desc`.
        #[arg(long)]
        sort: Option<String>,
        /// Group tasks into status columns.
        #[arg(long, conflicts_with = "json")]
        board: bool,
        #[arg(long)]
        json: bool,
    },

    /// Show every field of one task.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },

    /// Create a new task.
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Due date as YYYY-MM-DD (defaults to today).
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Change fields of an existing task.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        due: Option<String>,
    },

    /// Delete a task.
    Rm { id: String },
}

fn main() -> Result<()> {
    let Cli { config, api_url, cmd } = Cli::parse();
    install_tracing();

    tokio::runtime::Runtime::new()?.block_on(execute(config, api_url, cmd))
}

async fn execute(config_path: Option<PathBuf>, api_url: Option<String>, command: Command) -> Result<()> {
    let config = ProjectConfig::load(config_path.as_deref())?.with_api_url_override(api_url);
    config.validate()?;

    let gateway = HttpGateway::new(config.gateway_config()?)?;
    let store = Arc::new(TaskStore::new(gateway).with_sort(config.board.default_sort));
    let service = TaskService::new(store);
    commands::run(command, &service).await
}

fn install_tracing() {
    // RUST_LOG is honoured; the default is INFO. Logs go to stderr so stdout stays parseable.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
