//! Notion API client: existing-page index and create/update execution.
//!
//! All create-vs-update policy lives in the core engine; this layer only
//! moves `SyncDecision`s over the wire.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use steamnote_core::{ExistingPageIndex, GameId, Operation, PageRef, SyncDecision};
use tracing::warn;

use crate::config::NotionSettings;
use crate::error::CliError;

const NOTION_API_BASE: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";
const QUERY_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
}

/// Executes reconciled decisions against the destination database.
///
/// `NotionClient` is the real implementation; the trait exists so the sync
/// loop's per-game failure handling can be exercised without a network.
pub trait DecisionExecutor {
    async fn execute(&self, decision: &SyncDecision, cover: Option<&str>) -> Result<(), CliError>;
}

pub struct NotionClient {
    client: reqwest::Client,
    token: String,
    database_id: String,
    id_property: String,
}

impl NotionClient {
    pub fn new(settings: &NotionSettings) -> Result<Self, CliError> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()?,
            token: settings.token.clone(),
            database_id: settings.database_id.clone(),
            id_property: settings.id_property.clone(),
        })
    }

    /// Query the whole database and index existing pages by game identifier.
    ///
    /// Pages without the identifier property (added by hand, or created
    /// before the property existed) are logged and left out; they will
    /// never be matched for update.
    pub async fn existing_pages(&self) -> Result<ExistingPageIndex, CliError> {
        let mut index = ExistingPageIndex::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({ "page_size": QUERY_PAGE_SIZE });
            if let Some(cursor) = &cursor {
                body["start_cursor"] = json!(cursor);
            }

            let response = self
                .client
                .post(format!(
                    "{NOTION_API_BASE}/databases/{}/query",
                    self.database_id
                ))
                .bearer_auth(&self.token)
                .header("Notion-Version", NOTION_VERSION)
                .json(&body)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(CliError::NotionApi(format!(
                    "database query returned HTTP {status}: {body}"
                )));
            }

            let payload = response.json::<QueryResponse>().await?;
            index_pages(&mut index, &payload.results, &self.id_property);

            match next_cursor(&payload)? {
                Some(next) => cursor = Some(next),
                None => return Ok(index),
            }
        }
    }
}

impl DecisionExecutor for NotionClient {
    /// Execute one decision as a page create or update.
    ///
    /// `cover` (the record's Banner URL) becomes the page cover when set.
    async fn execute(&self, decision: &SyncDecision, cover: Option<&str>) -> Result<(), CliError> {
        let mut body = serde_json::Map::new();
        body.insert("properties".to_string(), decision.properties_json());
        if let Some(url) = cover.filter(|url| !url.trim().is_empty()) {
            body.insert("cover".to_string(), json!({ "external": { "url": url } }));
        }

        let request = match &decision.operation {
            Operation::Create => {
                body.insert(
                    "parent".to_string(),
                    json!({ "database_id": self.database_id }),
                );
                self.client.post(format!("{NOTION_API_BASE}/pages"))
            }
            Operation::Update(page) => self
                .client
                .patch(format!("{NOTION_API_BASE}/pages/{page}")),
        };

        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&Value::Object(body))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CliError::NotionApi(format!(
                "page write for game {} returned HTTP {status}: {body}",
                decision.id
            )));
        }
        Ok(())
    }
}

/// The cursor for the next query batch, `None` when the query is complete.
///
/// `has_more` without a cursor would otherwise re-fetch the same batch
/// forever, so that combination is an error.
pub fn next_cursor(payload: &QueryResponse) -> Result<Option<String>, CliError> {
    if !payload.has_more {
        return Ok(None);
    }
    match &payload.next_cursor {
        Some(cursor) => Ok(Some(cursor.clone())),
        None => Err(CliError::NotionApi(
            "database query reported has_more without a next_cursor".to_string(),
        )),
    }
}

/// Fold a batch of query results into the index, keyed by the identifier
/// number property.
pub fn index_pages(index: &mut ExistingPageIndex, pages: &[Page], id_property: &str) {
    for page in pages {
        match extract_game_id(page, id_property) {
            Some(id) => index.insert(id, PageRef::new(page.id.clone())),
            None => warn!(
                page_id = %page.id,
                id_property,
                "page has no usable identifier property; skipping"
            ),
        }
    }
}

fn extract_game_id(page: &Page, id_property: &str) -> Option<GameId> {
    let number = page.properties.get(id_property)?.get("number")?.as_f64()?;
    if number.fract() != 0.0 || number < 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(GameId::new(number as u64))
}
