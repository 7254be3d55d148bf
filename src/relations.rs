//! Active management and partner extraction.
//!
//! Turns the raw link list of a company's network relation into the people and
//! organisations that currently run or own it.

use crate::models::{ActiveRelation, GermanLabel, RelationRecord};
use serde::Deserialize;
use serde_json::Value;

/// Label tokens that mark executive or ownership roles.
pub const EXECUTIVE_TOKENS: [&str; 4] = ["MANAGING", "BOARD", "FULLY_LIABLE_PARTNER", "OWNER"];
/// Label token that marks a power of attorney.
pub const PROCURA_TOKEN: &str = "PROCURA";

const UNKNOWN: &str = "Unknown";

/// Classifies a relation label, ignoring precedence.
pub fn classify_label(label: &str) -> Option<GermanLabel> {
    if EXECUTIVE_TOKENS.iter().any(|token| label.contains(token)) {
        Some(GermanLabel::Geschaeftsfuehrung)
    } else if label.contains(PROCURA_TOKEN) {
        Some(GermanLabel::Prokura)
    } else {
        None
    }
}

/// Extracts active, direct management and partner relations in input order.
///
/// A single forward scan: once an executive relation has been emitted, later
/// Prokura relations are dropped. Prokura relations seen before the first
/// executive stay in the output.
pub fn extract_active_relations(records: &[RelationRecord]) -> Vec<ActiveRelation> {
    let mut results = Vec::new();
    let mut executive_found = false;

    for record in records {
        if !record.is_active_direct() {
            continue;
        }

        let label = record.label();
        let german_label = match classify_label(label) {
            Some(GermanLabel::Geschaeftsfuehrung) => {
                executive_found = true;
                GermanLabel::Geschaeftsfuehrung
            }
            Some(GermanLabel::Prokura) if !executive_found => GermanLabel::Prokura,
            _ => continue,
        };

        let party = record.entity_from.as_ref();
        results.push(ActiveRelation {
            name: party
                .and_then(|p| p.english_name())
                .unwrap_or(UNKNOWN)
                .to_string(),
            fb_entity_id: party
                .and_then(|p| p.fb_entity_id.as_deref())
                .unwrap_or(UNKNOWN)
                .to_string(),
            label: label.to_string(),
            german_label,
        });
    }

    results
}

/// Reads the `links` list out of a resolved network relation.
///
/// Fields of a link are read independently, so only links that are not JSON
/// objects are skipped. A missing or non-list `links` field yields no records.
pub fn parse_links(network: &Value) -> Vec<RelationRecord> {
    let Some(links) = network.get("links").and_then(Value::as_array) else {
        return Vec::new();
    };

    links
        .iter()
        .enumerate()
        .filter_map(|(idx, link)| {
            if !link.is_object() {
                tracing::warn!("Skipping network link #{}: not an object", idx);
                return None;
            }
            match RelationRecord::deserialize(link) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed network link #{}: {}", idx, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn link(depth: i64, label: &str, end_date: Value, id: &str, name: &str) -> Value {
        json!({
            "depth": depth,
            "label": label,
            "meta": {"end_date": end_date},
            "entity_from": {
                "fb_entity_id": id,
                "attributes": {"display_name": {"en": name}}
            }
        })
    }

    fn records(links: Vec<Value>) -> Vec<RelationRecord> {
        parse_links(&json!({ "links": links }))
    }

    #[test]
    fn test_classify_label() {
        assert_eq!(
            classify_label("MANAGING_DIRECTOR"),
            Some(GermanLabel::Geschaeftsfuehrung)
        );
        assert_eq!(
            classify_label("SUPERVISORY_BOARD_MEMBER"),
            Some(GermanLabel::Geschaeftsfuehrung)
        );
        assert_eq!(
            classify_label("FULLY_LIABLE_PARTNER"),
            Some(GermanLabel::Geschaeftsfuehrung)
        );
        assert_eq!(classify_label("PROCURA"), Some(GermanLabel::Prokura));
        assert_eq!(classify_label("managing_director"), None);
        assert_eq!(classify_label("AUDITOR"), None);
        assert_eq!(classify_label(""), None);
    }

    #[test]
    fn test_executive_label_wins_over_procura_token() {
        assert_eq!(
            classify_label("OWNER_WITH_PROCURA"),
            Some(GermanLabel::Geschaeftsfuehrung)
        );
    }

    #[test]
    fn test_owner_then_procura_drops_procura() {
        let input = records(vec![
            link(1, "OWNER", Value::Null, "E1", "Alice"),
            link(1, "PROCURA", Value::Null, "E2", "Bob"),
        ]);

        let output = extract_active_relations(&input);

        assert_eq!(
            output,
            vec![ActiveRelation {
                name: "Alice".into(),
                fb_entity_id: "E1".into(),
                label: "OWNER".into(),
                german_label: GermanLabel::Geschaeftsfuehrung,
            }]
        );
    }

    #[test]
    fn test_procura_before_owner_keeps_both() {
        let input = records(vec![
            link(1, "PROCURA", Value::Null, "E2", "Bob"),
            link(1, "OWNER", Value::Null, "E1", "Alice"),
        ]);

        let output = extract_active_relations(&input);

        assert_eq!(output.len(), 2);
        assert_eq!(output[0].name, "Bob");
        assert_eq!(output[0].german_label, GermanLabel::Prokura);
        assert_eq!(output[1].name, "Alice");
        assert_eq!(output[1].german_label, GermanLabel::Geschaeftsfuehrung);
    }

    #[test]
    fn test_indirect_and_ended_relations_excluded() {
        let input = records(vec![
            link(2, "MANAGING_DIRECTOR", Value::Null, "E1", "Carla"),
            link(1, "MANAGING_DIRECTOR", json!("2019-12-31"), "E2", "Dieter"),
            link(1, "PROCURA", Value::Null, "E3", "Eva"),
        ]);

        let output = extract_active_relations(&input);

        // Neither excluded executive counts towards precedence
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].name, "Eva");
        assert_eq!(output[0].german_label, GermanLabel::Prokura);
    }

    #[test]
    fn test_unrelated_labels_dropped() {
        let input = records(vec![
            link(1, "AUDITOR", Value::Null, "E1", "KPMG"),
            link(1, "SHAREHOLDER_OF", Value::Null, "E2", "Holding"),
        ]);
        assert!(extract_active_relations(&input).is_empty());
    }

    #[test]
    fn test_missing_name_and_id_default_to_unknown() {
        let input = records(vec![
            json!({
                "depth": 1,
                "label": "MANAGING_DIRECTOR",
                "meta": {"end_date": null},
                "entity_from": {"fb_entity_id": "E9", "attributes": {"display_name": {"de": "Frank"}}}
            }),
            json!({
                "depth": 1,
                "label": "BOARD_MEMBER",
                "meta": {"end_date": null},
                "entity_from": {"attributes": {}}
            }),
        ]);

        let output = extract_active_relations(&input);

        assert_eq!(output.len(), 2);
        assert_eq!(output[0].name, "Unknown");
        assert_eq!(output[0].fb_entity_id, "E9");
        assert_eq!(output[1].name, "Unknown");
        assert_eq!(output[1].fb_entity_id, "Unknown");
    }

    #[test]
    fn test_parse_links_skips_only_non_objects() {
        let network = json!({
            "links": [
                "OWNER",
                {"depth": "one", "label": "OWNER"},
                {"depth": 1, "label": "OWNER", "meta": {"end_date": null}}
            ]
        });
        let parsed = parse_links(&network);
        assert_eq!(parsed.len(), 2);
        assert!(!parsed[0].is_active_direct());
        assert_eq!(parsed[1].label(), "OWNER");
    }

    #[test]
    fn test_numeric_entity_id_keeps_executive_precedence() {
        let mut manager = link(1, "MANAGING_DIRECTOR", Value::Null, "", "Anna");
        manager["entity_from"]["fb_entity_id"] = json!(12345);
        let input = records(vec![manager, link(1, "PROCURA", Value::Null, "P2", "Bob")]);

        let output = extract_active_relations(&input);

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].name, "Anna");
        assert_eq!(output[0].fb_entity_id, "12345");
        assert_eq!(output[0].german_label, GermanLabel::Geschaeftsfuehrung);
    }

    #[test]
    fn test_non_text_display_names_keep_executive_precedence() {
        let mut owner = link(1, "OWNER", Value::Null, "E1", "Alice");
        owner["entity_from"]["attributes"]["display_name"]["alt"] = json!(["A."]);
        let input = records(vec![owner, link(1, "PROCURA", Value::Null, "E2", "Bob")]);

        let output = extract_active_relations(&input);

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].name, "Alice");
    }

    #[test]
    fn test_float_depth_counts_as_direct() {
        let mut owner = link(1, "OWNER", Value::Null, "E1", "Alice");
        owner["depth"] = json!(1.0);

        let output = extract_active_relations(&records(vec![owner]));

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].german_label, GermanLabel::Geschaeftsfuehrung);
    }

    #[test]
    fn test_mistyped_name_and_id_default_to_unknown() {
        let mut owner = link(1, "OWNER", Value::Null, "E1", "Alice");
        owner["entity_from"]["fb_entity_id"] = json!({"id": "E1"});
        owner["entity_from"]["attributes"]["display_name"]["en"] = json!(null);

        let output = extract_active_relations(&records(vec![owner]));

        assert_eq!(output[0].name, "Unknown");
        assert_eq!(output[0].fb_entity_id, "Unknown");
    }

    #[test]
    fn test_parse_links_without_links_field() {
        assert!(parse_links(&json!({"nodes": []})).is_empty());
        assert!(parse_links(&json!({"links": {}})).is_empty());
        assert!(parse_links(&Value::Null).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_active_relations(&[]).is_empty());
    }
}
