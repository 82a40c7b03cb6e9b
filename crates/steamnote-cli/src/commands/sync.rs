use std::fs;
use std::path::Path;
use std::time::Duration;

use steamnote_core::{
    load_mapping, reconcile, ExistingPageIndex, FieldValue, GameRecord, MappingRule,
};
use tracing::{info, warn};

use crate::config::NotionSettings;
use crate::error::CliError;
use crate::library::load_games;
use crate::notion::{DecisionExecutor, NotionClient};

const WRITE_PAUSE: Duration = Duration::from_millis(300);

/// Per-run tallies: pages written, games dropped by mapping errors, and
/// games dropped by write failures.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub synced: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub async fn run_sync(games_file: &Path, mapping_file: &Path) -> Result<(), CliError> {
    let settings = NotionSettings::from_env()?;

    // A bad mapping aborts here, before any game is touched.
    let raw_mapping = fs::read_to_string(mapping_file)?;
    let rules = load_mapping(&raw_mapping)?;

    let games = load_games(games_file)?;
    let client = NotionClient::new(&settings)?;
    let index = client.existing_pages().await?;
    info!(
        games = games.len(),
        existing_pages = index.len(),
        "starting sync"
    );

    let outcome = sync_all(&client, &games, &rules, &index, WRITE_PAUSE).await?;

    println!(
        "Synced {} games ({} skipped, {} write failures)",
        outcome.synced, outcome.skipped, outcome.failed
    );
    Ok(())
}

/// Reconcile and write every game, pausing between iterations.
///
/// One game never takes down the rest of the run: mapping errors marked
/// per-game are skipped, and a failed page write loses only that game.
/// Only a non-recoverable core error aborts the loop.
pub async fn sync_all<E: DecisionExecutor>(
    executor: &E,
    games: &[GameRecord],
    rules: &[MappingRule],
    index: &ExistingPageIndex,
    pause: Duration,
) -> Result<SyncOutcome, CliError> {
    let mut outcome = SyncOutcome::default();

    for (position, record) in games.iter().enumerate() {
        if position > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        match reconcile(record, rules, index) {
            Ok(decision) => {
                let cover = cover_url(record);
                match executor.execute(&decision, cover.as_deref()).await {
                    Ok(()) => outcome.synced += 1,
                    Err(error) => {
                        warn!(game_id = %record.id, %error, "page write failed; continuing");
                        outcome.failed += 1;
                    }
                }
            }
            Err(error) if error.is_per_game() => {
                warn!(game_id = %record.id, %error, "skipping game");
                outcome.skipped += 1;
            }
            Err(error) => return Err(error.into()),
        }
    }

    Ok(outcome)
}

/// The Banner field doubles as the page cover, as long as it is text.
pub fn cover_url(record: &GameRecord) -> Option<String> {
    match record.field("Banner") {
        Some(FieldValue::Text(url)) if !url.trim().is_empty() => Some(url.clone()),
        _ => None,
    }
}
