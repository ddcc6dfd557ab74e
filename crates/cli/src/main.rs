use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use baton_core::pipeline::{Pipeline, PipelineOptions};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;

mod commands;

/// Baton - A build pipeline runner
#[derive(Parser)]
#[command(name = "baton")]
#[command(about = "Run build pipelines made of sequential and parallel stages")]
#[command(version)]
struct Cli {
    /// Path to the workspace root (defaults to current directory)
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Pipeline file (defaults to baton.yml in the workspace root)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show registration and scheduling details
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a task (defaults to the pipeline's default task)
    Run {
        /// Name of the task to run
        task: Option<String>,
    },
    /// List registered tasks
    List,
    /// Print the JSON Schema of the pipeline file
    Schema,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let options = PipelineOptions {
        workspace_root: cli.workspace,
        config_path: cli.config,
    };

    // Registration happens before any task runs; CLI layer only handles presentation
    match cli.command.unwrap_or(Commands::Run { task: None }) {
        Commands::Run { task } => {
            let pipeline = load_pipeline(options)?;
            commands::run::execute(&pipeline, task.as_deref()).await
        }
        Commands::List => commands::list::execute(&load_pipeline(options)?),
        Commands::Schema => commands::schema::execute(),
    }
}

fn load_pipeline(options: PipelineOptions) -> Result<Pipeline> {
    Pipeline::load(options).map_err(|e| anyhow::anyhow!("Failed to load pipeline: {}", e))
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
