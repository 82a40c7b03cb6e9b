use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use pretty_assertions::assert_eq;
use steamnote_core::{
    load_mapping, ExistingPageIndex, FieldValue, GameId, GameRecord, PageRef, SyncDecision,
};

use crate::commands::sync::{cover_url, sync_all, SyncOutcome};
use crate::config::resolve_games_file;
use crate::error::CliError;
use crate::library::{load_games, save_games};
use crate::notion::{index_pages, next_cursor, DecisionExecutor, QueryResponse};
use crate::steam::{build_record, playtime_hours, AchievementCounts, OwnedGame};

fn owned_game() -> OwnedGame {
    serde_json::from_value(serde_json::json!({
        "appid": 620,
        "name": "Portal 2",
        "playtime_forever": 2472,
        "rtime_last_played": 1_700_000_000,
        "img_icon_url": "abc123"
    }))
    .unwrap()
}

#[test]
fn playtime_hours_rounds_to_one_decimal() {
    assert_eq!(playtime_hours(2472), 41.2);
    assert_eq!(playtime_hours(0), 0.0);
    assert_eq!(playtime_hours(59), 1.0);
    assert_eq!(playtime_hours(90), 1.5);
}

#[test]
fn build_record_populates_mapped_fields() {
    let record = build_record(
        &owned_game(),
        Some(AchievementCounts {
            unlocked: 10,
            total: 40,
        }),
    );

    assert_eq!(record.id, GameId::new(620));
    assert_eq!(
        record.field("Game Name"),
        Some(&FieldValue::Text("Portal 2".to_string()))
    );
    assert_eq!(record.field("AppID"), Some(&FieldValue::Number(620.0)));
    assert_eq!(
        record.field("Playtime Hours"),
        Some(&FieldValue::Number(41.2))
    );
    assert_eq!(
        record.field("Last Played"),
        Some(&FieldValue::Number(1_700_000_000.0))
    );
    assert_eq!(
        record.field("Banner"),
        Some(&FieldValue::Text(
            "https://steamcdn-a.akamaihd.net/steam/apps/620/header.jpg".to_string()
        ))
    );
    assert_eq!(
        record.field("Achievements Unlocked"),
        Some(&FieldValue::Number(10.0))
    );
    assert_eq!(
        record.field("Achievements Total"),
        Some(&FieldValue::Number(40.0))
    );
}

#[test]
fn build_record_omits_unavailable_fields() {
    let game: OwnedGame = serde_json::from_value(serde_json::json!({
        "appid": 730,
        "playtime_forever": 0
    }))
    .unwrap();
    let record = build_record(&game, None);

    assert_eq!(
        record.field("Game Name"),
        Some(&FieldValue::Text("Unknown Game".to_string()))
    );
    assert_eq!(record.field("Last Played"), None);
    assert_eq!(record.field("Icon"), None);
    assert_eq!(record.field("Achievements Unlocked"), None);
}

#[test]
fn index_pages_keys_by_identifier_property() {
    let payload: QueryResponse = serde_json::from_value(serde_json::json!({
        "results": [
            {
                "id": "page-620",
                "properties": { "AppID": { "type": "number", "number": 620 } }
            },
            {
                "id": "page-no-id",
                "properties": { "名称": { "type": "title", "title": [] } }
            },
            {
                "id": "page-null-id",
                "properties": { "AppID": { "type": "number", "number": null } }
            }
        ],
        "has_more": false,
        "next_cursor": null
    }))
    .unwrap();

    let mut index = ExistingPageIndex::new();
    index_pages(&mut index, &payload.results, "AppID");

    assert_eq!(index.len(), 1);
    assert_eq!(index.get(GameId::new(620)), Some(&PageRef::new("page-620")));
}

#[test]
fn cover_url_requires_non_empty_text_banner() {
    let with_banner = GameRecord::new(GameId::new(620))
        .with_field("Banner", "https://cdn.example.com/620/header.jpg");
    assert_eq!(
        cover_url(&with_banner),
        Some("https://cdn.example.com/620/header.jpg".to_string())
    );

    let blank = GameRecord::new(GameId::new(620)).with_field("Banner", "   ");
    assert_eq!(cover_url(&blank), None);

    let absent = GameRecord::new(GameId::new(620));
    assert_eq!(cover_url(&absent), None);
}

#[test]
fn games_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("steam_games.json");

    let games = vec![
        GameRecord::new(GameId::new(620))
            .with_field("Game Name", "Portal 2")
            .with_field("Playtime Hours", 41.2),
        GameRecord::new(GameId::new(440)).with_field("Game Name", "Team Fortress 2"),
    ];

    save_games(&path, &games).unwrap();
    let loaded = load_games(&path).unwrap();
    assert_eq!(loaded, games);
}

#[test]
fn missing_games_file_reports_fetch_hint() {
    let error = load_games(&PathBuf::from("/nonexistent/steam_games.json")).unwrap_err();
    assert!(error.to_string().contains("steamnote fetch"));
}

#[test]
fn games_file_flag_wins_over_environment() {
    let resolved = resolve_games_file(Some(PathBuf::from("/tmp/custom.json")));
    assert_eq!(resolved, PathBuf::from("/tmp/custom.json"));
}

#[test]
fn next_cursor_follows_pagination_contract() {
    let done: QueryResponse = serde_json::from_value(serde_json::json!({
        "results": [], "has_more": false, "next_cursor": null
    }))
    .unwrap();
    assert_eq!(next_cursor(&done).unwrap(), None);

    let more: QueryResponse = serde_json::from_value(serde_json::json!({
        "results": [], "has_more": true, "next_cursor": "cursor-2"
    }))
    .unwrap();
    assert_eq!(next_cursor(&more).unwrap(), Some("cursor-2".to_string()));
}

#[test]
fn next_cursor_rejects_has_more_without_cursor() {
    let broken: QueryResponse = serde_json::from_value(serde_json::json!({
        "results": [], "has_more": true, "next_cursor": null
    }))
    .unwrap();
    let error = next_cursor(&broken).unwrap_err();
    assert!(error.to_string().contains("has_more"));
}

/// Records every executed decision; fails the configured games.
struct RecordingExecutor {
    fail_for: Vec<GameId>,
    calls: Mutex<Vec<GameId>>,
}

impl RecordingExecutor {
    fn failing_for(fail_for: Vec<GameId>) -> Self {
        Self {
            fail_for,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<GameId> {
        self.calls.lock().unwrap().clone()
    }
}

impl DecisionExecutor for RecordingExecutor {
    async fn execute(&self, decision: &SyncDecision, _cover: Option<&str>) -> Result<(), CliError> {
        self.calls.lock().unwrap().push(decision.id);
        if self.fail_for.contains(&decision.id) {
            return Err(CliError::NotionApi(
                "page write returned HTTP 502".to_string(),
            ));
        }
        Ok(())
    }
}

const TITLE_ONLY_MAPPING: &str = r#"{ "Game Name": { "notion_field": "名称", "type": "title" } }"#;

fn named_game(id: u64, name: &str) -> GameRecord {
    GameRecord::new(GameId::new(id)).with_field("Game Name", name)
}

#[tokio::test]
async fn write_failure_loses_only_that_game() {
    let rules = load_mapping(TITLE_ONLY_MAPPING).unwrap();
    let games = vec![
        named_game(620, "Portal 2"),
        named_game(440, "Team Fortress 2"),
        named_game(730, "Counter-Strike 2"),
    ];
    let executor = RecordingExecutor::failing_for(vec![GameId::new(440)]);

    let outcome = sync_all(
        &executor,
        &games,
        &rules,
        &ExistingPageIndex::new(),
        Duration::ZERO,
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        SyncOutcome {
            synced: 2,
            skipped: 0,
            failed: 1,
        }
    );
    // The game after the failure was still written.
    assert_eq!(
        executor.calls(),
        vec![GameId::new(620), GameId::new(440), GameId::new(730)]
    );
}

#[tokio::test]
async fn mapping_errors_skip_the_game_and_continue() {
    let mapping = r#"
    {
        "Game Name": { "notion_field": "名称", "type": "title" },
        "Achievements": {
            "notion_field": "成就数",
            "type": "rich_text",
            "format": "{Achievements Unlocked}/{Achievements Total}"
        }
    }
    "#;
    let rules = load_mapping(mapping).unwrap();
    let games = vec![
        named_game(620, "Portal 2")
            .with_field("Achievements Unlocked", 10_i64)
            .with_field("Achievements Total", 40_i64),
        // No achievement fields, so the format rule cannot resolve.
        named_game(440, "Team Fortress 2"),
    ];
    let executor = RecordingExecutor::failing_for(Vec::new());

    let outcome = sync_all(
        &executor,
        &games,
        &rules,
        &ExistingPageIndex::new(),
        Duration::ZERO,
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        SyncOutcome {
            synced: 1,
            skipped: 1,
            failed: 0,
        }
    );
    assert_eq!(executor.calls(), vec![GameId::new(620)]);
}
