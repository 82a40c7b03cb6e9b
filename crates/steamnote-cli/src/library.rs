//! Games-file persistence: the JSON handoff between fetch and sync.

use std::fs;
use std::path::Path;

use steamnote_core::GameRecord;

use crate::error::CliError;

pub fn save_games(path: &Path, games: &[GameRecord]) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(games)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_games(path: &Path) -> Result<Vec<GameRecord>, CliError> {
    if !path.exists() {
        return Err(CliError::GamesFileMissing(path.display().to_string()));
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
