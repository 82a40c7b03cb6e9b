//! Steam Web API client: owned games and per-game achievements.
//!
//! Thin retrieval layer with no mapping logic; its only job is producing
//! `GameRecord`s with the field names the mapping config references.

use std::time::Duration;

use serde::Deserialize;
use steamnote_core::{GameId, GameRecord};
use tracing::{info, warn};

use crate::config::SteamSettings;
use crate::error::CliError;

const OWNED_GAMES_URL: &str = "https://api.steampowered.com/IPlayerService/GetOwnedGames/v1/";
const ACHIEVEMENTS_URL: &str =
    "https://api.steampowered.com/ISteamUserStats/GetPlayerAchievements/v1/";
const ACHIEVEMENT_FETCH_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
pub struct OwnedGame {
    pub appid: u64,
    pub name: Option<String>,
    #[serde(default)]
    pub playtime_forever: u64,
    pub rtime_last_played: Option<i64>,
    pub img_icon_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwnedGamesResponse {
    response: OwnedGamesBody,
}

#[derive(Debug, Deserialize)]
struct OwnedGamesBody {
    #[serde(default)]
    games: Vec<OwnedGame>,
}

#[derive(Debug, Deserialize)]
struct AchievementsResponse {
    playerstats: PlayerStats,
}

#[derive(Debug, Deserialize)]
struct PlayerStats {
    #[serde(default)]
    success: bool,
    achievements: Option<Vec<Achievement>>,
}

#[derive(Debug, Deserialize)]
struct Achievement {
    #[serde(default)]
    achieved: u8,
}

/// Unlocked/total achievement counts for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementCounts {
    pub unlocked: u64,
    pub total: u64,
}

pub struct SteamClient {
    client: reqwest::Client,
    api_key: String,
    user_id: String,
}

impl SteamClient {
    pub fn new(settings: &SteamSettings) -> Result<Self, CliError> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()?,
            api_key: settings.api_key.clone(),
            user_id: settings.user_id.clone(),
        })
    }

    /// Fetch the full library and build game records, longest-played first.
    pub async fn fetch_library(&self) -> Result<Vec<GameRecord>, CliError> {
        let mut games = self.owned_games().await?;
        games.sort_by(|a, b| b.playtime_forever.cmp(&a.playtime_forever));
        info!(games = games.len(), "fetched owned games");

        let mut records = Vec::with_capacity(games.len());
        for (position, game) in games.iter().enumerate() {
            // Keep per-game stat calls well under Steam's rate limits;
            // no pause before the first or after the last.
            if position > 0 {
                tokio::time::sleep(ACHIEVEMENT_FETCH_PAUSE).await;
            }
            let achievements = self.achievements(game.appid).await;
            records.push(build_record(game, achievements));
        }
        Ok(records)
    }

    async fn owned_games(&self) -> Result<Vec<OwnedGame>, CliError> {
        let response = self
            .client
            .get(OWNED_GAMES_URL)
            .query(&[
                ("key", self.api_key.as_str()),
                ("steamid", self.user_id.as_str()),
                ("include_appinfo", "true"),
                ("include_played_free_games", "true"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CliError::SteamApi(format!(
                "GetOwnedGames returned HTTP {}",
                response.status().as_u16()
            )));
        }

        let payload = response.json::<OwnedGamesResponse>().await?;
        Ok(payload.response.games)
    }

    /// Achievement counts for one game, `None` when the game has none or
    /// the stats endpoint declines (it does for many titles).
    async fn achievements(&self, app_id: u64) -> Option<AchievementCounts> {
        let app_id_text = app_id.to_string();
        let request = self
            .client
            .get(ACHIEVEMENTS_URL)
            .query(&[
                ("appid", app_id_text.as_str()),
                ("key", self.api_key.as_str()),
                ("steamid", self.user_id.as_str()),
            ])
            .send()
            .await;

        let response = match request {
            Ok(response) => response,
            Err(error) => {
                warn!(app_id, %error, "achievement request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            return None;
        }

        let payload = match response.json::<AchievementsResponse>().await {
            Ok(payload) => payload,
            Err(error) => {
                warn!(app_id, %error, "achievement payload unreadable");
                return None;
            }
        };

        let stats = payload.playerstats;
        if !stats.success {
            return None;
        }
        let achievements = stats.achievements?;
        let unlocked = achievements
            .iter()
            .filter(|achievement| achievement.achieved == 1)
            .count() as u64;
        Some(AchievementCounts {
            unlocked,
            total: achievements.len() as u64,
        })
    }
}

/// Build the record for one owned game with the field names the mapping
/// config references. Attributes the API could not supply are left absent.
pub fn build_record(game: &OwnedGame, achievements: Option<AchievementCounts>) -> GameRecord {
    let mut record = GameRecord::new(GameId::new(game.appid))
        .with_field(
            "Game Name",
            game.name.clone().unwrap_or_else(|| "Unknown Game".to_string()),
        )
        .with_field("AppID", game.appid as i64)
        .with_field("Playtime Hours", playtime_hours(game.playtime_forever))
        .with_field("Playtime Minutes", game.playtime_forever as i64)
        .with_field("Banner", banner_url(game.appid));

    if let Some(last_played) = game.rtime_last_played.filter(|timestamp| *timestamp > 0) {
        record.set_field("Last Played", last_played);
    }
    if let Some(icon) = game
        .img_icon_url
        .as_deref()
        .filter(|hash| !hash.is_empty())
    {
        record.set_field("Icon", icon_url(game.appid, icon));
    }
    if let Some(counts) = achievements {
        record.set_field("Achievements Unlocked", counts.unlocked as i64);
        record.set_field("Achievements Total", counts.total as i64);
    }
    record
}

/// Playtime in hours, rounded to one decimal.
pub fn playtime_hours(minutes: u64) -> f64 {
    (minutes as f64 / 60.0 * 10.0).round() / 10.0
}

/// Store header image, used both as the Banner property and the page cover.
pub fn banner_url(app_id: u64) -> String {
    format!("https://steamcdn-a.akamaihd.net/steam/apps/{app_id}/header.jpg")
}

fn icon_url(app_id: u64, icon_hash: &str) -> String {
    format!(
        "https://steamcdn-a.akamaihd.net/steamcommunity/public/images/apps/{app_id}/{icon_hash}.jpg"
    )
}
