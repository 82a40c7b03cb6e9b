//! steamnote CLI - sync a Steam game library into a Notion database
//!
//! `fetch` pulls the library into a local JSON file, `sync` reconciles that
//! file against the Notion database, `run` does both.

mod cli;
mod commands;
mod config;
mod error;
mod library;
mod notion;
mod steam;
#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::fetch::run_fetch;
use crate::commands::sync::run_sync;
use crate::config::{resolve_games_file, resolve_mapping_file};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("steamnote_cli=info".parse().unwrap())
                .add_directive("steamnote_core=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let games_file = resolve_games_file(cli.games_file);
    let mapping_file = resolve_mapping_file(cli.mapping_file);

    match cli.command {
        Some(Commands::Fetch) => run_fetch(&games_file).await?,
        Some(Commands::Sync) => run_sync(&games_file, &mapping_file).await?,
        Some(Commands::Run) | None => {
            run_fetch(&games_file).await?;
            run_sync(&games_file, &mapping_file).await?;
        }
    }

    Ok(())
}
