use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use pixeml_client::{Snapshot, TaskClient};
use pixeml_core::{ModifyTaskRequest, NewTaskRequest, RenameTaskRequest};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod state;

use config::{Config, config_path, init_config, load_config};

#[derive(Parser, Debug)]
#[command(
    name = "pixeml",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PIXEML_BUILD_SHA"), ")"),
    about = "Manage tasks on a Pixeml server"
)]
struct Cli {
    /// Server base URL (overrides config.toml [server].base_url)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Log resolver and HTTP activity to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List task type templates
    Types,

    /// List tasks
    List {
        /// Print the resolved board as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show a single task
    Show { task_id: i64 },

    /// Create a task from a type template
    Create {
        /// Task type id
        #[arg(long = "type")]
        type_id: i64,

        #[arg(long)]
        name: String,

        /// Setting value as name=value (repeatable)
        #[arg(long = "set", value_parser = parse_assignment)]
        settings: Vec<(String, String)>,
    },

    /// Rename a task
    Rename { task_id: i64, name: String },

    /// Change setting values of a task
    Modify {
        task_id: i64,

        /// Setting value as name=value (repeatable)
        #[arg(long = "set", value_parser = parse_assignment, required = true)]
        settings: Vec<(String, String)>,
    },

    /// Delete a task
    Delete { task_id: i64 },

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,
    /// Print the effective config
    Show,
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Config { command } => run_config(&command),
        command => run_remote(command, cli.server).await,
    }
}

async fn run_remote(command: Command, server: Option<String>) -> Result<()> {
    let cfg = load_config()?;
    let base_url = server.unwrap_or_else(|| cfg.server.base_url.clone());
    debug!(%base_url, "using server");
    let client = TaskClient::with_timeout(&base_url, cfg.server.timeout())?;

    match command {
        Command::Types => {
            let types = client
                .task_types()
                .await
                .with_context(|| format!("fetch task types from {base_url}"))?;
            print!("{}", render::render_types(&types));
        }

        Command::List { json } => {
            let snap = reload(&client).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snap.board)?);
            } else {
                print_snapshot(&snap, &cfg);
            }
        }

        Command::Show { task_id } => {
            let snap = reload(&client).await?;
            if let Some(task) = snap.board.task(task_id) {
                print!("{}", render::render_task(task));
            } else if let Some(failure) = snap.board.failure(task_id) {
                print!("{}", render::render_failure(failure));
            } else {
                bail!("no task with id {task_id}");
            }
        }

        Command::Create {
            type_id,
            name,
            settings,
        } => {
            let snap = reload(&client).await?;
            let task_type = snap
                .board
                .task_type(type_id)
                .ok_or_else(|| anyhow!("no task type with id {type_id}"))?;
            let req = NewTaskRequest::from_template(task_type, &name, &settings)?;
            let snap = client
                .create_task(req)
                .await
                .with_context(|| format!("create task '{name}'"))?;
            print_snapshot(&snap, &cfg);
        }

        Command::Rename { task_id, name } => {
            let req = RenameTaskRequest::new(task_id, &name)?;
            let snap = client
                .rename_task(req)
                .await
                .with_context(|| format!("rename task {task_id}"))?;
            print_snapshot(&snap, &cfg);
        }

        Command::Modify { task_id, settings } => {
            let snap = reload(&client).await?;
            let task = snap.board.task(task_id).ok_or_else(|| {
                anyhow!("no displayable task with id {task_id}; run `pixeml list` to see failures")
            })?;
            let req = ModifyTaskRequest::from_resolved(task, &settings)?;
            let snap = client
                .modify_task(req)
                .await
                .with_context(|| format!("modify task {task_id}"))?;
            print_snapshot(&snap, &cfg);
        }

        Command::Delete { task_id } => {
            let snap = client
                .delete_task(task_id)
                .await
                .with_context(|| format!("delete task {task_id}"))?;
            print_snapshot(&snap, &cfg);
        }

        Command::Config { command } => run_config(&command)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_config(command: &ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init => init_config(),
        ConfigCommand::Show => {
            let cfg = load_config()?;
            print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", config_path()?.display());
            Ok(())
        }
    }
}

async fn reload(client: &TaskClient) -> Result<Snapshot> {
    client
        .reload()
        .await
        .with_context(|| format!("load tasks from {}", client.base_url()))
}

fn print_snapshot(snap: &Snapshot, cfg: &Config) {
    println!(
        "# Tasks (as of {})\n",
        snap.fetched_at.with_timezone(&chrono::Local).format("%H:%M:%S")
    );
    print!("{}", render::render_board(&snap.board, cfg.display.show_failures));
}

/// Parse `name=value`. Only the first `=` splits, so values may contain `=`.
fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing setting name in '{s}'"));
    }
    Ok((name.to_string(), value.to_string()))
}
