use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] steamnote_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Missing required environment variable {0}")]
    MissingEnv(&'static str),
    #[error("Steam API error: {0}")]
    SteamApi(String),
    #[error("Notion API error: {0}")]
    NotionApi(String),
    #[error("Games file not found: {0}. Run `steamnote fetch` first.")]
    GamesFileMissing(String),
}
