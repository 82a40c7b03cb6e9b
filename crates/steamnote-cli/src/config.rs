//! Environment-driven settings for the sync driver.
//!
//! Credentials and file locations come from the environment (optionally via
//! a `.env` file loaded in `main`). The core engine never sees any of this.

use std::env;
use std::path::PathBuf;

use crate::error::CliError;

pub const DEFAULT_GAMES_FILE: &str = "steam_games.json";
pub const DEFAULT_MAPPING_FILE: &str = "mapping.json";
pub const DEFAULT_ID_PROPERTY: &str = "AppID";

/// Steam Web API credentials.
#[derive(Debug, Clone)]
pub struct SteamSettings {
    pub api_key: String,
    pub user_id: String,
}

impl SteamSettings {
    pub fn from_env() -> Result<Self, CliError> {
        Ok(Self {
            api_key: required_env("STEAM_API_KEY")?,
            user_id: required_env("STEAM_USER_ID")?,
        })
    }
}

/// Notion integration credentials plus the database to sync into.
#[derive(Clone)]
pub struct NotionSettings {
    pub token: String,
    pub database_id: String,
    /// Number property holding the stable game identifier
    pub id_property: String,
}

impl std::fmt::Debug for NotionSettings {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("NotionSettings")
            .field("token", &"[REDACTED]")
            .field("database_id", &self.database_id)
            .field("id_property", &self.id_property)
            .finish()
    }
}

impl NotionSettings {
    pub fn from_env() -> Result<Self, CliError> {
        Ok(Self {
            token: required_env("NOTION_TOKEN")?,
            database_id: required_env("NOTION_DATABASE_ID")?,
            id_property: optional_env("NOTION_ID_PROPERTY")
                .unwrap_or_else(|| DEFAULT_ID_PROPERTY.to_string()),
        })
    }
}

/// Resolve the games JSON file path: CLI flag, then `JSON_FILE`, then default.
pub fn resolve_games_file(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| optional_env("JSON_FILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_GAMES_FILE))
}

/// Resolve the mapping config path: CLI flag, then `MAPPING_FILE`, then default.
pub fn resolve_mapping_file(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| optional_env("MAPPING_FILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MAPPING_FILE))
}

fn required_env(name: &'static str) -> Result<String, CliError> {
    optional_env(name).ok_or(CliError::MissingEnv(name))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
