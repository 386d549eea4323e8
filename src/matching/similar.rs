// src/matching/similar.rs
// Stage 2: fuzzy title similarity with date proximity, URL similarity as a
// fallback. Rules are evaluated in strict priority order.

use crate::config::MatchingConfig;
use crate::models::ActionRecord;
use crate::normalize::normalize_title;

use super::types::{MatchVerdict, SimilarityScorer};

/// Fuzzy pairwise decision for records that survived exact dedup.
///
/// Priority order: near-identical titles win outright; high title
/// similarity needs the dates within `max_days_diff` of each other; failing
/// both, very similar raw URLs still match. Missing titles, missing URLs
/// and unparsable dates all degrade to "no match" rather than erroring.
pub fn match_similar(
    record1: &ActionRecord,
    record2: &ActionRecord,
    config: &MatchingConfig,
    scorer: &dyn SimilarityScorer,
) -> Option<MatchVerdict> {
    let title1 = normalize_title(&record1.title);
    let title2 = normalize_title(&record2.title);

    if !title1.is_empty() && !title2.is_empty() {
        let title_similarity = scorer.ratio(&title1, &title2);

        if title_similarity >= config.exact_match_threshold {
            return Some(MatchVerdict::similar(
                format!(
                    "title similarity {:.1} at or above exact threshold {}",
                    title_similarity, config.exact_match_threshold
                ),
                title_similarity,
            ));
        }

        if title_similarity >= config.title_similarity_threshold
            && dates_proximate(record1, record2, config.max_days_diff)
        {
            return Some(MatchVerdict::similar(
                format!(
                    "title similarity {:.1} with dates within {} days",
                    title_similarity, config.max_days_diff
                ),
                title_similarity,
            ));
        }
    }

    // A missing URL scores zero and can never clear the threshold
    let url1 = record1.url.trim();
    let url2 = record2.url.trim();
    if url1.is_empty() || url2.is_empty() {
        return None;
    }
    let url_similarity = scorer.ratio(url1, url2);
    if url_similarity >= config.url_similarity_threshold {
        return Some(MatchVerdict::similar(
            format!("url similarity {:.1}", url_similarity),
            url_similarity,
        ));
    }

    None
}

/// True when both dates parse and are at most `max_days` apart.
pub fn dates_proximate(record1: &ActionRecord, record2: &ActionRecord, max_days: i64) -> bool {
    match (record1.parsed_date(), record2.parsed_date()) {
        (Some(date1), Some(date2)) => (date1 - date2).num_days().abs() <= max_days,
        _ => false,
    }
}
