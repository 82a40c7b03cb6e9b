//! Mapping configuration loading and per-rule field mapping

mod mapper;

pub use mapper::apply_rule;

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{MappingRule, PropertyKind, Template};

/// Load and validate a mapping document into an ordered rule sequence.
///
/// The document is a JSON object, one entry per local field:
///
/// ```json
/// {
///   "Game Name": { "notion_field": "名称", "type": "title" },
///   "Achievements": {
///     "notion_field": "成就数",
///     "type": "rich_text",
///     "format": "{Achievements Unlocked}/{Achievements Total}"
///   }
/// }
/// ```
///
/// Rules come out in document order; that order is the payload order
/// downstream. Unrecognized keys inside an entry are ignored. Pure
/// transformation, no side effects.
pub fn load_mapping(raw: &str) -> Result<Vec<MappingRule>> {
    let document: Value =
        serde_json::from_str(raw).map_err(|error| Error::Config(format!("invalid JSON: {error}")))?;
    let entries = document
        .as_object()
        .ok_or_else(|| Error::Config("mapping document must be a JSON object".to_string()))?;

    let mut rules = Vec::with_capacity(entries.len());
    let mut seen_destinations = HashSet::new();

    for (local_field, entry) in entries {
        let entry = entry.as_object().ok_or_else(|| {
            Error::Config(format!("entry '{local_field}' must be a JSON object"))
        })?;

        let notion_field = required_str(entry, local_field, "notion_field")?;
        if notion_field.trim().is_empty() {
            return Err(Error::Config(format!(
                "entry '{local_field}': 'notion_field' must not be empty"
            )));
        }
        if !seen_destinations.insert(notion_field.to_string()) {
            return Err(Error::Config(format!(
                "duplicate notion_field '{notion_field}' (entry '{local_field}')"
            )));
        }

        let kind: PropertyKind = required_str(entry, local_field, "type")?
            .parse()
            .map_err(|error| Error::Config(format!("entry '{local_field}': {error}")))?;

        let format = match entry.get("format") {
            None => None,
            Some(Value::String(source)) => Some(
                Template::parse(source)
                    .map_err(|error| Error::Config(format!("entry '{local_field}': {error}")))?,
            ),
            Some(_) => {
                return Err(Error::Config(format!(
                    "entry '{local_field}': 'format' must be a string"
                )))
            }
        };

        rules.push(MappingRule {
            local_field: local_field.clone(),
            notion_field: notion_field.to_string(),
            kind,
            format,
        });
    }

    Ok(rules)
}

fn required_str<'a>(
    entry: &'a serde_json::Map<String, Value>,
    local_field: &str,
    key: &str,
) -> Result<&'a str> {
    entry
        .get(key)
        .ok_or_else(|| Error::Config(format!("entry '{local_field}' is missing '{key}'")))?
        .as_str()
        .ok_or_else(|| Error::Config(format!("entry '{local_field}': '{key}' must be a string")))
}
