//! Runscope trigger CLI entrypoint.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod handlers;

use commands::Commands;

#[derive(Parser)]
#[command(name = "runscope")]
#[command(author, version, about = "Trigger Runscope test runs from a build step", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { path } => handlers::init(&path),
        Commands::Validate { path } => handlers::validate(&path),
        Commands::Trigger(args) => handlers::trigger(args).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("✗").red(), e);
            ExitCode::FAILURE
        }
    }
}
