//! Mapping rules: destination property kinds and format templates

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::models::record::FieldValue;

/// The closed set of Notion property kinds the engine can write.
///
/// Dispatch over kinds is exhaustive; adding a kind extends this enum and
/// the coercion match, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Title,
    Number,
    Date,
    Url,
    RichText,
}

impl PropertyKind {
    /// The config spelling of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Number => "number",
            Self::Date => "date",
            Self::Url => "url",
            Self::RichText => "rich_text",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "number" => Ok(Self::Number),
            "date" => Ok(Self::Date),
            "url" => Ok(Self::Url),
            "rich_text" => Ok(Self::RichText),
            other => Err(format!("unrecognized property type '{other}'")),
        }
    }
}

/// A format template: literal text with `{Field Name}` placeholders.
///
/// Deliberately a minimal placeholder grammar resolved only against the
/// current record's fields, never a general expression evaluator. The only
/// failure mode at render time is a missing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

impl Template {
    /// Parse a template, rejecting malformed placeholder syntax.
    ///
    /// Empty `{}`, an unclosed `{`, or a stray `}` are parse errors.
    pub fn parse(source: &str) -> Result<Self, String> {
        let placeholder = Regex::new(r"\{([^{}]+)\}").expect("Invalid regex");
        let mut segments = Vec::new();
        let mut cursor = 0;

        for capture in placeholder.captures_iter(source) {
            let whole = capture.get(0).expect("capture group 0 always exists");
            let literal = &source[cursor..whole.start()];
            reject_stray_braces(literal)?;
            if !literal.is_empty() {
                segments.push(Segment::Literal(literal.to_string()));
            }
            segments.push(Segment::Placeholder(capture[1].to_string()));
            cursor = whole.end();
        }

        let tail = &source[cursor..];
        reject_stray_braces(tail)?;
        if !tail.is_empty() {
            segments.push(Segment::Literal(tail.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The placeholder names this template references, in order.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Render against a record's fields.
    ///
    /// Returns the first unresolved placeholder name as the error; callers
    /// attach the owning rule.
    pub fn render(&self, fields: &BTreeMap<String, FieldValue>) -> Result<String, String> {
        let mut rendered = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Placeholder(name) => match fields.get(name) {
                    Some(value) => rendered.push_str(&value.to_string()),
                    None => return Err(name.clone()),
                },
            }
        }
        Ok(rendered)
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn reject_stray_braces(literal: &str) -> Result<(), String> {
    if literal.contains('{') {
        Err("unclosed '{' in format string".to_string())
    } else if literal.contains('}') {
        Err("unmatched '}' in format string".to_string())
    } else {
        Ok(())
    }
}

/// One entry of the mapping configuration: source field (or formatted
/// combination) to destination property with a declared kind.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRule {
    /// Source attribute name; ignored when `format` is set
    pub local_field: String,
    /// Destination Notion property name; unique across the rule set
    pub notion_field: String,
    /// Declared destination property kind
    pub kind: PropertyKind,
    /// Optional template combining record fields into one value
    pub format: Option<Template>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, FieldValue)]) -> BTreeMap<String, FieldValue> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn property_kind_parses_config_spellings() {
        assert_eq!("title".parse::<PropertyKind>().unwrap(), PropertyKind::Title);
        assert_eq!(
            "rich_text".parse::<PropertyKind>().unwrap(),
            PropertyKind::RichText
        );
        assert!("checkbox".parse::<PropertyKind>().is_err());
    }

    #[test]
    fn template_parses_literals_and_placeholders() {
        let template = Template::parse("{Achievements Unlocked}/{Achievements Total}").unwrap();
        assert_eq!(
            template.placeholders(),
            vec!["Achievements Unlocked", "Achievements Total"]
        );
    }

    #[test]
    fn template_rejects_malformed_braces() {
        assert!(Template::parse("{unclosed").is_err());
        assert!(Template::parse("stray}").is_err());
        assert!(Template::parse("empty {} braces").is_err());
        assert!(Template::parse("{nested {deep}}").is_err());
    }

    #[test]
    fn template_renders_against_fields() {
        let template = Template::parse("{Achievements Unlocked}/{Achievements Total}").unwrap();
        let fields = fields(&[
            ("Achievements Unlocked", FieldValue::from(10_i64)),
            ("Achievements Total", FieldValue::from(40_i64)),
        ]);
        assert_eq!(template.render(&fields).unwrap(), "10/40");
    }

    #[test]
    fn template_render_names_missing_field() {
        let template = Template::parse("{Missing} thing").unwrap();
        assert_eq!(
            template.render(&BTreeMap::new()).unwrap_err(),
            "Missing".to_string()
        );
    }

    #[test]
    fn template_without_placeholders_is_literal() {
        let template = Template::parse("plain text").unwrap();
        assert!(template.placeholders().is_empty());
        assert_eq!(template.render(&BTreeMap::new()).unwrap(), "plain text");
    }
}
