//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gemexec_core::{config, logging};

mod commands;

#[derive(Parser)]
#[command(name = "gemexec")]
#[command(version)]
#[command(about = "Ask Gemini to compute with code execution and render the answer as HTML")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Arguments for a single request/render run.
#[derive(clap::Args, Debug, Clone, Default)]
struct RunArgs {
    /// Override the model from config
    #[arg(short, long)]
    model: Option<String>,

    /// Override the prompt from config
    #[arg(short, long)]
    prompt: Option<String>,

    /// Write the HTML document to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Open the rendered document in the default browser
    #[arg(long)]
    open: bool,

    /// Emit only the rendered blocks, without the page wrapper
    #[arg(long)]
    fragment: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Send the prompt and render the response (default)
    Run(RunArgs),
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init();

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // default to a plain run
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Run(RunArgs::default()));

    match command {
        Commands::Run(args) => {
            let config = config::Config::load().context("load config")?;
            commands::run::run(commands::run::RunOptions {
                config: &config,
                model_override: args.model.as_deref(),
                prompt_override: args.prompt.as_deref(),
                output: args.output.as_deref(),
                open: args.open,
                fragment: args.fragment,
            })
            .await
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
