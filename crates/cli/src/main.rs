//! goalchain CLI, the main entry point.
//!
//! Commands:
//! - `run`     Plan, execute and evaluate one goal
//! - `plan`    Show the plan for a goal without running it
//! - `config`  Inspect or validate configuration
//! - `demo`    Run the bundled example goals

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "goalchain",
    about = "goalchain: route natural-language goals through data-fetching agents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read configuration from this file instead of ~/.goalchain/config.toml
    #[arg(short, long, global = true, env = "GOALCHAIN_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan, execute and evaluate a goal
    Run {
        /// The goal, in plain language
        goal: String,

        /// Print the evaluation as JSON
        #[arg(long)]
        json: bool,

        /// Print live progress events
        #[arg(long)]
        trace: bool,
    },

    /// Show the execution plan for a goal
    Plan {
        /// The goal, in plain language
        goal: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run the bundled example goals
    Demo,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the default config file path
    Path,
    /// Load and validate the configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run { goal, json, trace } => {
            commands::run::run(config_path, &goal, json, trace).await?
        }
        Commands::Plan { goal } => commands::plan::run(config_path, &goal)?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config_path)?,
            ConfigAction::Path => commands::config_cmd::path(config_path)?,
            ConfigAction::Validate => commands::config_cmd::validate(config_path)?,
        },
        Commands::Demo => commands::demo::run(config_path).await?,
    }

    Ok(())
}
