use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "steamnote")]
#[command(about = "Sync your Steam game library into a Notion database")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the games JSON file (overrides JSON_FILE)
    #[arg(long, global = true, value_name = "PATH")]
    pub games_file: Option<PathBuf>,

    /// Path to the mapping config (overrides MAPPING_FILE)
    #[arg(long, global = true, value_name = "PATH")]
    pub mapping_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the Steam library and save it to the games JSON file
    Fetch,
    /// Sync the games JSON file into the Notion database
    Sync,
    /// Fetch then sync
    Run,
}
