// src/matching/cross_source.rs
// Stage 3: the same real-world action reported by two different source
// systems. Titles are stripped of legislative boilerplate before comparison
// so a bill and the act it became line up.

use crate::config::MatchingConfig;
use crate::models::{ActionRecord, SourceSystem};
use crate::normalize::{clean_title, normalize_title};

use super::types::{MatchVerdict, SimilarityScorer};

/// Pairwise decision across source systems. Records from the same source
/// never match here; that is the similar stage's job.
pub fn match_cross_source(
    record1: &ActionRecord,
    record2: &ActionRecord,
    config: &MatchingConfig,
    scorer: &dyn SimilarityScorer,
) -> Option<MatchVerdict> {
    if record1.source_system == record2.source_system {
        return None;
    }

    // Bill and the act it was enacted as
    if is_bill_act_pair(record1, record2) {
        if let Some(similarity) = cleaned_title_similarity(record1, record2, scorer) {
            if similarity >= config.title_similarity_threshold {
                return Some(MatchVerdict::cross_source(
                    format!("bill/act cleaned titles align at {:.1}", similarity),
                    similarity,
                ));
            }
        }
    }

    // Near-identical titles settle any source pairing
    let title1 = normalize_title(&record1.title);
    let title2 = normalize_title(&record2.title);
    if !title1.is_empty() && !title2.is_empty() {
        let similarity = scorer.ratio(&title1, &title2);
        if similarity >= config.exact_match_threshold {
            return Some(MatchVerdict::cross_source(
                format!("titles align at {:.1} across sources", similarity),
                similarity,
            ));
        }
    }

    // Ministerial announcement of a formal document
    if is_announcement_formal_pair(record1, record2) {
        if let Some(similarity) = cleaned_title_similarity(record1, record2, scorer) {
            if similarity >= config.title_similarity_threshold {
                return Some(MatchVerdict::cross_source(
                    format!(
                        "announcement/formal cleaned titles align at {:.1}",
                        similarity
                    ),
                    similarity,
                ));
            }
        }
    }

    None
}

fn is_bill_act_pair(record1: &ActionRecord, record2: &ActionRecord) -> bool {
    matches!(
        (record1.source_system, record2.source_system),
        (SourceSystem::Parliament, SourceSystem::Legislation)
            | (SourceSystem::Legislation, SourceSystem::Parliament)
    )
}

fn is_announcement_formal_pair(record1: &ActionRecord, record2: &ActionRecord) -> bool {
    (record1.source_system == SourceSystem::Beehive && record2.source_system.is_formal_document())
        || (record2.source_system == SourceSystem::Beehive
            && record1.source_system.is_formal_document())
}

/// Boilerplate-stripped title similarity; None when either side cleans down
/// to nothing.
fn cleaned_title_similarity(
    record1: &ActionRecord,
    record2: &ActionRecord,
    scorer: &dyn SimilarityScorer,
) -> Option<f64> {
    let cleaned1 = clean_title(&record1.title);
    let cleaned2 = clean_title(&record2.title);
    if cleaned1.is_empty() || cleaned2.is_empty() {
        return None;
    }
    Some(scorer.ratio(&cleaned1, &cleaned2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::types::NormalizedLevenshtein;
    use crate::models::ActionMetadata;

    fn record(title: &str, source: SourceSystem) -> ActionRecord {
        ActionRecord {
            id: String::new(),
            base_id: None,
            version: None,
            title: title.to_string(),
            date: "2024-11-01".to_string(),
            source_system: source,
            url: String::new(),
            primary_entity: String::new(),
            summary: String::new(),
            labels: Vec::new(),
            metadata: ActionMetadata::default(),
            last_scraped: None,
        }
    }

    #[test]
    fn test_bill_act_pair_matches_after_cleaning() {
        let config = MatchingConfig::default();
        let bill = record("Fast-track Approvals Bill", SourceSystem::Parliament);
        let act = record("Fast-Track Approvals Act 2024", SourceSystem::Legislation);
        let verdict =
            match_cross_source(&bill, &act, &config, &NormalizedLevenshtein).unwrap();
        assert!(verdict.reason.contains("bill/act"));
        assert!(verdict.score.unwrap() >= config.title_similarity_threshold);
    }

    #[test]
    fn test_same_source_is_exempt() {
        let config = MatchingConfig::default();
        let a = record("Fast-track Approvals Bill", SourceSystem::Parliament);
        let b = record("Fast-track Approvals Bill", SourceSystem::Parliament);
        assert!(match_cross_source(&a, &b, &config, &NormalizedLevenshtein).is_none());
    }

    #[test]
    fn test_identical_titles_match_any_pairing() {
        let config = MatchingConfig::default();
        let notice = record("Reserve Bank appointments", SourceSystem::Gazette);
        let release = record("Reserve Bank appointments", SourceSystem::Beehive);
        let verdict =
            match_cross_source(&notice, &release, &config, &NormalizedLevenshtein).unwrap();
        assert_eq!(verdict.score, Some(100.0));
    }

    #[test]
    fn test_announcement_formal_pair_matches_after_cleaning() {
        let config = MatchingConfig::default();
        let release = record(
            "Government Residential Tenancies Amendment",
            SourceSystem::Beehive,
        );
        let act = record("Residential Tenancies Amendment Act 2024", SourceSystem::Legislation);
        let verdict =
            match_cross_source(&release, &act, &config, &NormalizedLevenshtein).unwrap();
        assert!(verdict.score.unwrap() >= config.title_similarity_threshold);
    }

    #[test]
    fn test_unrelated_cross_source_titles_do_not_match() {
        let config = MatchingConfig::default();
        let bill = record("Firearms Prohibition Orders Bill", SourceSystem::Parliament);
        let notice = record("Customs import levy schedule", SourceSystem::Gazette);
        assert!(match_cross_source(&bill, &notice, &config, &NormalizedLevenshtein).is_none());
    }
}
