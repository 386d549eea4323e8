// src/versioning.rs
// Version grouping. Unlike the dedup stages this never removes a record:
// revisions of the same underlying document are grouped under a shared
// base id and ordered newest first, so downstream consumers can show the
// current text with its history attached.

use std::cmp::Reverse;
use std::collections::HashMap;

use log::{debug, info};

use crate::models::ActionRecord;
use crate::results::VersionStats;

/// Strip a trailing `-v<digits>` revision suffix from an id. Anything
/// else, including a bare `-v` or a non-numeric suffix like `-vNext`,
/// is part of the id proper.
pub fn derive_base_id(id: &str) -> String {
    if let Some(pos) = id.rfind("-v") {
        let suffix = &id[pos + 2..];
        if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            return id[..pos].to_string();
        }
    }
    id.to_string()
}

/// Numeric ordering key for a version marker. `"3"` and `"v3"` both read
/// as 3; an absent or unparsable marker counts as revision 1.
pub fn parse_version(version: Option<&str>) -> u64 {
    version
        .map(|v| v.trim().trim_start_matches('v'))
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(1)
}

/// Group records by base id. Groups come out in the order their first
/// member appeared in the input; within a multi-revision group members
/// are ordered by version descending (ties keep input order). Record
/// content is untouched except that a missing `base_id` is filled in.
pub fn group_versions(records: Vec<ActionRecord>) -> (Vec<ActionRecord>, VersionStats) {
    let mut stats = VersionStats {
        total_processed: records.len(),
        ..VersionStats::default()
    };

    let mut groups: HashMap<String, Vec<ActionRecord>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for mut record in records {
        let base = record
            .base_id
            .clone()
            .unwrap_or_else(|| derive_base_id(&record.id));
        if record.base_id.is_none() {
            record.base_id = Some(base.clone());
        }
        let group = groups.entry(base.clone()).or_default();
        if group.is_empty() {
            order.push(base);
        }
        group.push(record);
    }

    let mut output = Vec::with_capacity(stats.total_processed);
    for base in &order {
        if let Some(mut group) = groups.remove(base) {
            if group.len() > 1 {
                group.sort_by_key(|record| Reverse(parse_version(record.version.as_deref())));
                stats.duplicates_found += group.len() - 1;
                stats.versions_preserved += group.len();
                stats.base_actions += 1;
                debug!("Version group '{}': {} revisions kept", base, group.len());
            }
            output.extend(group);
        }
    }

    info!(
        "Version grouping: {} processed, {} extra revisions across {} base documents, {} versions preserved",
        stats.total_processed, stats.duplicates_found, stats.base_actions, stats.versions_preserved
    );
    (output, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionMetadata, SourceSystem};

    fn record(id: &str, base_id: Option<&str>, version: Option<&str>) -> ActionRecord {
        ActionRecord {
            id: id.to_string(),
            base_id: base_id.map(str::to_string),
            version: version.map(str::to_string),
            title: format!("Record {}", id),
            date: "2024-06-01".to_string(),
            source_system: SourceSystem::Parliament,
            url: format!("https://example.com/{}", id),
            primary_entity: String::new(),
            summary: String::new(),
            labels: Vec::new(),
            metadata: ActionMetadata::default(),
            last_scraped: None,
        }
    }

    #[test]
    fn test_derive_base_id_strips_numeric_suffix() {
        assert_eq!(derive_base_id("parl-2024-001-v2"), "parl-2024-001");
        assert_eq!(derive_base_id("leg-2023-150-v12"), "leg-2023-150");
    }

    #[test]
    fn test_derive_base_id_leaves_plain_ids_alone() {
        assert_eq!(derive_base_id("parl-2024-001"), "parl-2024-001");
        assert_eq!(derive_base_id("gaz-2024-100-v"), "gaz-2024-100-v");
        assert_eq!(derive_base_id("bee-2024-055-vNext"), "bee-2024-055-vNext");
    }

    #[test]
    fn test_derive_base_id_uses_last_marker() {
        assert_eq!(derive_base_id("act-v2-v3"), "act-v2");
    }

    #[test]
    fn test_parse_version_variants() {
        assert_eq!(parse_version(Some("3")), 3);
        assert_eq!(parse_version(Some("v2")), 2);
        assert_eq!(parse_version(Some(" v10 ")), 10);
        assert_eq!(parse_version(Some("draft")), 1);
        assert_eq!(parse_version(None), 1);
    }

    #[test]
    fn test_groups_order_newest_first() {
        let input = vec![
            record("parl-2024-001-v3", None, Some("3")),
            record("parl-2024-001-v1", None, Some("1")),
            record("parl-2024-001-v2", None, Some("v2")),
        ];
        let (output, stats) = group_versions(input);
        let versions: Vec<u64> = output
            .iter()
            .map(|r| parse_version(r.version.as_deref()))
            .collect();
        assert_eq!(versions, vec![3, 2, 1]);
        assert_eq!(stats.total_processed, 3);
        assert_eq!(stats.duplicates_found, 2);
        assert_eq!(stats.versions_preserved, 3);
        assert_eq!(stats.base_actions, 1);
    }

    #[test]
    fn test_no_records_are_dropped() {
        let input = vec![
            record("parl-2024-001-v2", None, Some("2")),
            record("gaz-2024-100", None, None),
            record("parl-2024-001", None, None),
            record("leg-2024-031", None, None),
        ];
        let input_count = input.len();
        let (output, stats) = group_versions(input);
        assert_eq!(output.len(), input_count);
        assert_eq!(stats.total_processed, input_count);
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let input = vec![
            record("parl-2024-001-v1", None, Some("1")),
            record("gaz-2024-100", None, None),
            record("parl-2024-001-v2", None, Some("2")),
        ];
        let (output, _) = group_versions(input);
        let ids: Vec<&str> = output.iter().map(|r| r.id.as_str()).collect();
        // The parl group was seen first, so both its members come before
        // the gazette record even though v2 arrived last
        assert_eq!(
            ids,
            vec!["parl-2024-001-v2", "parl-2024-001-v1", "gaz-2024-100"]
        );
    }

    #[test]
    fn test_missing_base_id_is_filled_in() {
        let input = vec![record("parl-2024-001-v2", None, Some("2"))];
        let (output, _) = group_versions(input);
        assert_eq!(output[0].base_id.as_deref(), Some("parl-2024-001"));
    }

    #[test]
    fn test_explicit_base_id_wins_over_derivation() {
        let input = vec![
            record("parl-2024-001", Some("shared-doc"), Some("1")),
            record("leg-2024-031", Some("shared-doc"), Some("2")),
        ];
        let (output, stats) = group_versions(input);
        assert_eq!(stats.base_actions, 1);
        assert_eq!(output[0].id, "leg-2024-031");
        assert_eq!(output[1].id, "parl-2024-001");
    }

    #[test]
    fn test_singleton_groups_do_not_count_as_duplicates() {
        let input = vec![
            record("parl-2024-001", None, None),
            record("gaz-2024-100", None, None),
        ];
        let (_, stats) = group_versions(input);
        assert_eq!(stats.duplicates_found, 0);
        assert_eq!(stats.versions_preserved, 0);
        assert_eq!(stats.base_actions, 0);
    }

    #[test]
    fn test_version_tie_keeps_input_order() {
        let input = vec![
            record("parl-2024-001-v1", Some("parl-2024-001"), None),
            record("parl-2024-001-v1b", Some("parl-2024-001"), None),
        ];
        let (output, _) = group_versions(input);
        assert_eq!(output[0].id, "parl-2024-001-v1");
        assert_eq!(output[1].id, "parl-2024-001-v1b");
    }
}
