//! Create-vs-update reconciliation for one game record

use tracing::debug;

use crate::error::Result;
use crate::mapping::apply_rule;
use crate::models::{ExistingPageIndex, GameRecord, MappingRule, Operation, SyncDecision};

/// Reconcile one game against the destination database.
///
/// The identifier's presence in `index` alone decides update-vs-create.
/// The payload applies every rule in order; the first failing rule aborts
/// the whole game, so no partial payload is ever emitted. Deterministic in
/// its inputs and side-effect free; all network writes happen in the
/// driver.
pub fn reconcile(
    record: &GameRecord,
    rules: &[MappingRule],
    index: &ExistingPageIndex,
) -> Result<SyncDecision> {
    let operation = match index.get(record.id) {
        Some(page) => Operation::Update(page.clone()),
        None => Operation::Create,
    };

    let mut payload = Vec::with_capacity(rules.len());
    for rule in rules {
        let value = apply_rule(rule, record)?;
        payload.push((rule.notion_field.clone(), value));
    }

    debug!(
        game_id = %record.id,
        create = matches!(operation, Operation::Create),
        properties = payload.len(),
        "reconciled game"
    );

    Ok(SyncDecision {
        id: record.id,
        operation,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mapping::load_mapping;
    use crate::models::{GameId, PageRef, PropertyValue};
    use pretty_assertions::assert_eq;

    const MAPPING: &str = r#"
    {
        "Game Name": { "notion_field": "名称", "type": "title" },
        "Playtime Hours": { "notion_field": "游玩时长", "type": "number" },
        "Last Played": { "notion_field": "上一次游玩时间", "type": "date" },
        "Banner": { "notion_field": "Banner", "type": "url" },
        "Achievements": {
            "notion_field": "成就数",
            "type": "rich_text",
            "format": "{Achievements Unlocked}/{Achievements Total}"
        }
    }
    "#;

    fn sample_record() -> GameRecord {
        GameRecord::new(GameId::new(620))
            .with_field("Game Name", "Portal 2")
            .with_field("Playtime Hours", 41.2)
            .with_field("Last Played", 1_700_000_000_i64)
            .with_field("Banner", "https://cdn.example.com/620/header.jpg")
            .with_field("Achievements Unlocked", 10_i64)
            .with_field("Achievements Total", 40_i64)
    }

    #[test]
    fn unknown_identifier_creates() {
        let rules = load_mapping(MAPPING).unwrap();
        let decision = reconcile(&sample_record(), &rules, &ExistingPageIndex::new()).unwrap();
        assert_eq!(decision.operation, Operation::Create);
        assert_eq!(decision.id, GameId::new(620));
    }

    #[test]
    fn known_identifier_updates_found_page() {
        let rules = load_mapping(MAPPING).unwrap();
        let index: ExistingPageIndex = [(GameId::new(620), PageRef::new("page-620"))]
            .into_iter()
            .collect();
        let decision = reconcile(&sample_record(), &rules, &index).unwrap();
        assert_eq!(decision.operation, Operation::Update(PageRef::new("page-620")));
    }

    #[test]
    fn payload_follows_rule_order() {
        let rules = load_mapping(MAPPING).unwrap();
        let decision = reconcile(&sample_record(), &rules, &ExistingPageIndex::new()).unwrap();
        let destinations: Vec<&str> = decision
            .payload
            .iter()
            .map(|(field, _)| field.as_str())
            .collect();
        assert_eq!(
            destinations,
            vec!["名称", "游玩时长", "上一次游玩时间", "Banner", "成就数"]
        );
        assert_eq!(
            decision.payload[4].1,
            PropertyValue::RichText("10/40".to_string())
        );
    }

    #[test]
    fn reconcile_is_idempotent() {
        let rules = load_mapping(MAPPING).unwrap();
        let index: ExistingPageIndex = [(GameId::new(620), PageRef::new("page-620"))]
            .into_iter()
            .collect();
        let record = sample_record();
        let first = reconcile(&record, &rules, &index).unwrap();
        let second = reconcile(&record, &rules, &index).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn failing_rule_emits_no_partial_payload() {
        let rules = load_mapping(MAPPING).unwrap();
        // No achievement fields, so the format rule cannot resolve.
        let record = GameRecord::new(GameId::new(620))
            .with_field("Game Name", "Portal 2")
            .with_field("Playtime Hours", 41.2);
        let error = reconcile(&record, &rules, &ExistingPageIndex::new()).unwrap_err();
        assert!(matches!(error, Error::MissingField { .. }));
    }

    #[test]
    fn coercion_failure_aborts_the_game() {
        let rules = load_mapping(MAPPING).unwrap();
        let record = sample_record().with_field("Playtime Hours", "a lot");
        let error = reconcile(&record, &rules, &ExistingPageIndex::new()).unwrap_err();
        assert!(matches!(error, Error::TypeCoercion { .. }));
    }

    #[test]
    fn missing_non_format_fields_use_lenient_defaults() {
        let rules = load_mapping(MAPPING).unwrap();
        let record = sample_record();
        let mut bare = GameRecord::new(GameId::new(620));
        bare.set_field(
            "Achievements Unlocked",
            record.field("Achievements Unlocked").unwrap().clone(),
        );
        bare.set_field(
            "Achievements Total",
            record.field("Achievements Total").unwrap().clone(),
        );

        let decision = reconcile(&bare, &rules, &ExistingPageIndex::new()).unwrap();
        assert_eq!(decision.payload[0].1, PropertyValue::Title(String::new()));
        assert_eq!(decision.payload[1].1, PropertyValue::Number(0.0));
        assert_eq!(decision.payload[2].1, PropertyValue::Date(None));
        assert_eq!(decision.payload[3].1, PropertyValue::Url(String::new()));
    }
}
