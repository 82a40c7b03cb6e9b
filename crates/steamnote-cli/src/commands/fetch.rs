use std::path::Path;

use crate::config::SteamSettings;
use crate::error::CliError;
use crate::library::save_games;
use crate::steam::SteamClient;

pub async fn run_fetch(games_file: &Path) -> Result<(), CliError> {
    let settings = SteamSettings::from_env()?;
    let client = SteamClient::new(&settings)?;

    let games = client.fetch_library().await?;
    save_games(games_file, &games)?;

    println!("Saved {} games to {}", games.len(), games_file.display());
    Ok(())
}
