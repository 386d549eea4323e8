// src/matching/exact.rs
// Stage 1: identical id or identical normalized URL. No fuzzy computation.

use crate::models::ActionRecord;
use crate::normalize::normalize_url;

use super::types::MatchVerdict;

/// Two records are the same record outright when their ids coincide or
/// their URLs normalize to the same key. Empty ids/URLs never match
/// anything.
pub fn match_exact(record1: &ActionRecord, record2: &ActionRecord) -> Option<MatchVerdict> {
    if !record1.id.is_empty() && record1.id == record2.id {
        return Some(MatchVerdict::exact(format!(
            "identical id '{}'",
            record1.id
        )));
    }

    let url1 = normalize_url(&record1.url);
    if url1.is_empty() {
        return None;
    }
    let url2 = normalize_url(&record2.url);
    if url1 == url2 {
        return Some(MatchVerdict::exact(format!(
            "identical normalized url '{}'",
            url1
        )));
    }

    None
}
