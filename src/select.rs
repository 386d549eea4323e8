// src/select.rs
// Representative selection: score every member of a duplicate cluster and
// keep the best one. Ties keep the first-seen record.

use log::debug;

use crate::config::ScoringConfig;
use crate::models::{ActionRecord, SourceSystem};

/// Weighted completeness score for one record under a given source-priority
/// table. Higher is better. A source missing from the table ranks zero.
pub fn score_record(
    record: &ActionRecord,
    priority_table: &[SourceSystem],
    config: &ScoringConfig,
) -> f64 {
    let rank = priority_table
        .iter()
        .position(|source| *source == record.source_system)
        .map(|position| (priority_table.len() - position) as f64)
        .unwrap_or(0.0);

    let mut score = rank * config.priority_weight;
    score += (record.summary.chars().count() as f64 / config.summary_length_divisor)
        .min(config.summary_score_cap);
    score += (record.title.chars().count() as f64 / config.title_length_divisor)
        .min(config.title_score_cap);
    score += record.metadata.field_count() as f64 * config.metadata_field_weight;
    if record.last_scraped.is_some() {
        score += config.recency_bonus;
    }
    score
}

/// Index (into `records`) of the cluster member to keep. `None` only for an
/// empty cluster, which the cluster builder never produces. Comparison is
/// strictly-greater, so equal scores keep the earliest member.
pub fn select_representative(
    cluster: &[usize],
    records: &[ActionRecord],
    priority_table: &[SourceSystem],
    config: &ScoringConfig,
) -> Option<usize> {
    let (&first, rest) = cluster.split_first()?;
    let mut best = first;
    let mut best_score = score_record(&records[first], priority_table, config);

    for &index in rest {
        let score = score_record(&records[index], priority_table, config);
        if score > best_score {
            best = index;
            best_score = score;
        }
    }

    if cluster.len() > 1 {
        debug!(
            "Cluster of {} kept '{}' (score {:.2})",
            cluster.len(),
            records[best].id,
            best_score
        );
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActionMetadata;

    fn record(source: SourceSystem, summary: &str, title: &str) -> ActionRecord {
        ActionRecord {
            id: format!("{}-2024-001", source.id_prefix()),
            base_id: None,
            version: None,
            title: title.to_string(),
            date: "2024-06-01".to_string(),
            source_system: source,
            url: String::new(),
            primary_entity: String::new(),
            summary: summary.to_string(),
            labels: Vec::new(),
            metadata: ActionMetadata::default(),
            last_scraped: None,
        }
    }

    #[test]
    fn test_source_rank_dominates() {
        let config = ScoringConfig::default();
        // A gazette notice with a long summary still loses to a bill: the
        // rank gap is 3 ranks x weight 10, the summary term caps at 5.
        let bill = record(SourceSystem::Parliament, "", "Bill");
        let notice = record(SourceSystem::Gazette, &"x".repeat(2000), "Notice");
        let records = vec![notice, bill];
        let kept = select_representative(
            &[0, 1],
            &records,
            &config.same_source_priority,
            &config,
        )
        .unwrap();
        assert_eq!(kept, 1);
    }

    #[test]
    fn test_cross_source_table_prefers_legislation() {
        let config = ScoringConfig::default();
        let bill = record(SourceSystem::Parliament, "summary", "Fast-track Approvals Bill");
        let act = record(
            SourceSystem::Legislation,
            "summary",
            "Fast-Track Approvals Act 2024",
        );
        let records = vec![bill, act];
        let kept = select_representative(
            &[0, 1],
            &records,
            &config.cross_source_priority,
            &config,
        )
        .unwrap();
        assert_eq!(records[kept].source_system, SourceSystem::Legislation);
    }

    #[test]
    fn test_summary_and_title_terms_are_capped() {
        let config = ScoringConfig::default();
        let short = record(SourceSystem::Beehive, &"s".repeat(500), &"t".repeat(150));
        let long = record(SourceSystem::Beehive, &"s".repeat(50_000), &"t".repeat(5_000));
        let short_score = score_record(&short, &config.same_source_priority, &config);
        let long_score = score_record(&long, &config.same_source_priority, &config);
        assert_eq!(short_score, long_score);
    }

    #[test]
    fn test_metadata_and_recency_contribute() {
        let config = ScoringConfig::default();
        let mut plain = record(SourceSystem::Beehive, "", "");
        let bare_score = score_record(&plain, &config.same_source_priority, &config);

        plain.metadata.portfolio = Some("Housing".to_string());
        plain.metadata.document_type = Some("release".to_string());
        plain.last_scraped = Some("2024-06-01T10:00:00Z".to_string());
        let enriched_score = score_record(&plain, &config.same_source_priority, &config);
        assert_eq!(enriched_score, bare_score + 2.0 + 1.0);
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let config = ScoringConfig::default();
        let a = record(SourceSystem::Beehive, "same", "same");
        let b = record(SourceSystem::Beehive, "same", "same");
        let records = vec![a, b];
        let kept = select_representative(
            &[0, 1],
            &records,
            &config.same_source_priority,
            &config,
        )
        .unwrap();
        assert_eq!(kept, 0);
    }

    #[test]
    fn test_empty_cluster_yields_none() {
        let config = ScoringConfig::default();
        assert!(select_representative(&[], &[], &config.same_source_priority, &config).is_none());
    }
}
