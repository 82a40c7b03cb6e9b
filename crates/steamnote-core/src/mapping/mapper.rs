//! Field mapping: resolve one rule against one record and coerce the value

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Timelike, Utc};

use crate::error::{Error, Result};
use crate::models::{FieldValue, GameRecord, MappingRule, PropertyKind, PropertyValue};

/// Apply one mapping rule to one game record.
///
/// With a format template, every placeholder must resolve against the
/// record or the rule fails with `MissingField` (strict, no blank
/// substitution). Without one, a missing `local_field` falls back to the
/// kind-specific empty value. Either way the resolved value is coerced to
/// the rule's declared kind. Pure function, no mutation of inputs.
pub fn apply_rule(rule: &MappingRule, record: &GameRecord) -> Result<PropertyValue> {
    if let Some(template) = &rule.format {
        let rendered = template
            .render(&record.fields)
            .map_err(|field| Error::MissingField {
                rule: rule.notion_field.clone(),
                field,
            })?;
        return coerce(rule, &FieldValue::Text(rendered));
    }

    match record.field(&rule.local_field) {
        Some(value) => coerce(rule, value),
        None => Ok(empty_value(rule.kind)),
    }
}

/// The lenient fallback for a missing `local_field` on the non-format path.
fn empty_value(kind: PropertyKind) -> PropertyValue {
    match kind {
        PropertyKind::Title => PropertyValue::Title(String::new()),
        PropertyKind::RichText => PropertyValue::RichText(String::new()),
        PropertyKind::Url => PropertyValue::Url(String::new()),
        PropertyKind::Number => PropertyValue::Number(0.0),
        PropertyKind::Date => PropertyValue::Date(None),
    }
}

fn coerce(rule: &MappingRule, value: &FieldValue) -> Result<PropertyValue> {
    match rule.kind {
        PropertyKind::Title => Ok(PropertyValue::Title(value.to_string())),
        PropertyKind::RichText => Ok(PropertyValue::RichText(value.to_string())),
        // Pass through unvalidated; Notion's own URL validation is the backstop.
        PropertyKind::Url => Ok(PropertyValue::Url(value.to_string())),
        PropertyKind::Number => match value {
            FieldValue::Number(number) => Ok(PropertyValue::Number(*number)),
            FieldValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(PropertyValue::Number)
                .map_err(|_| coercion_error(rule, value)),
        },
        PropertyKind::Date => normalize_date(value)
            .map(|date| PropertyValue::Date(Some(date)))
            .ok_or_else(|| coercion_error(rule, value)),
    }
}

fn coercion_error(rule: &MappingRule, value: &FieldValue) -> Error {
    Error::TypeCoercion {
        rule: rule.notion_field.clone(),
        kind: rule.kind.to_string(),
        value: value.to_string(),
    }
}

/// Normalize a Unix timestamp or ISO-8601 text value.
///
/// Date-only input (or a timestamp landing exactly on midnight UTC) comes
/// out as `YYYY-MM-DD`; anything carrying a time-of-day keeps it.
fn normalize_date(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Number(number) => {
            if number.fract() != 0.0 {
                return None;
            }
            #[allow(clippy::cast_possible_truncation)]
            let timestamp = DateTime::<Utc>::from_timestamp(*number as i64, 0)?;
            Some(if is_midnight(&timestamp.naive_utc()) {
                timestamp.format("%Y-%m-%d").to_string()
            } else {
                timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
            })
        }
        FieldValue::Text(text) => {
            let text = text.trim();
            if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
                return Some(with_offset.to_rfc3339_opts(SecondsFormat::Secs, true));
            }
            // Offset-less date-times, the shape Python's isoformat() emits.
            for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
                    return Some(if is_midnight(&naive) {
                        naive.format("%Y-%m-%d").to_string()
                    } else {
                        naive.format("%Y-%m-%dT%H:%M:%S").to_string()
                    });
                }
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|date| date.format("%Y-%m-%d").to_string())
        }
    }
}

fn is_midnight(naive: &NaiveDateTime) -> bool {
    naive.time().num_seconds_from_midnight() == 0 && naive.time().nanosecond() == 0
}
