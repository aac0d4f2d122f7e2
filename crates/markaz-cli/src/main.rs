use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod console;

#[derive(Parser)]
#[command(name = "markaz")]
#[command(about = "Markaz - grow a concept graph by asking questions", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding chats and state (defaults to the platform data directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use the mind-map server at this URL instead of the configured backend
    #[arg(long, global = true)]
    remote: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session (default)
    Repl,
    /// Ask one question in the most recent chat and print the resulting graph
    Ask {
        /// The question to send
        prompt: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let options = commands::Options {
        config: cli.config,
        data_dir: cli.data_dir,
        remote: cli.remote,
    };

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => commands::repl::run(&options).await?,
        Commands::Ask { prompt } => commands::ask::run(&options, &prompt).await?,
    }

    Ok(())
}
