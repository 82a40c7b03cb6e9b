//! Typed property values and per-game sync decisions

use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::models::record::GameId;

/// A type-coerced value ready for a destination property write.
///
/// Constructed fresh per (game, rule) pair and immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Title(String),
    RichText(String),
    Number(f64),
    /// Normalized ISO-8601 date or date-time; `None` writes an empty date
    Date(Option<String>),
    Url(String),
}

impl PropertyValue {
    /// The Notion property object for this value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Title(text) => json!({ "title": [{ "text": { "content": text } }] }),
            Self::RichText(text) => json!({ "rich_text": [{ "text": { "content": text } }] }),
            Self::Number(number) => json!({ "number": number }),
            Self::Date(Some(start)) => json!({ "date": { "start": start } }),
            Self::Date(None) => json!({ "date": null }),
            Self::Url(url) => json!({ "url": url }),
        }
    }
}

/// An opaque reference to an existing Notion page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRef(String);

impl PageRef {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a game gets a new page or updates an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update(PageRef),
}

/// The full outcome of reconciling one game: the operation to perform and
/// the property payload, keyed by destination field in rule order.
///
/// Handed to the Notion-write collaborator and discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncDecision {
    pub id: GameId,
    pub operation: Operation,
    pub payload: Vec<(String, PropertyValue)>,
}

impl SyncDecision {
    /// Assemble the Notion `properties` object, preserving rule order.
    #[must_use]
    pub fn properties_json(&self) -> Value {
        let mut properties = Map::with_capacity(self.payload.len());
        for (notion_field, value) in &self.payload {
            properties.insert(notion_field.clone(), value.to_json());
        }
        Value::Object(properties)
    }
}

/// Identifier-to-page lookup built from the destination database before a
/// sync run; read-only during reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingPageIndex {
    pages: HashMap<GameId, PageRef>,
}

impl ExistingPageIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: GameId, page: PageRef) {
        self.pages.insert(id, page);
    }

    #[must_use]
    pub fn get(&self, id: GameId) -> Option<&PageRef> {
        self.pages.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl FromIterator<(GameId, PageRef)> for ExistingPageIndex {
    fn from_iter<I: IntoIterator<Item = (GameId, PageRef)>>(iter: I) -> Self {
        Self {
            pages: iter.into_iter().collect(),
        }
    }
}
