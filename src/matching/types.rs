// src/matching/types.rs
// Shared verdict types and the pluggable similarity scorer.

use std::fmt;

/// Which matching stage produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchCategory {
    Exact,
    Similar,
    CrossSource,
}

impl MatchCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchCategory::Exact => "exact",
            MatchCategory::Similar => "similar",
            MatchCategory::CrossSource => "cross_source",
        }
    }
}

impl fmt::Display for MatchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A positive pairwise decision. Absence of a verdict means no match.
#[derive(Debug, Clone)]
pub struct MatchVerdict {
    pub category: MatchCategory,
    pub reason: String,
    pub score: Option<f64>,
}

impl MatchVerdict {
    pub fn exact(reason: String) -> Self {
        Self {
            category: MatchCategory::Exact,
            reason,
            score: None,
        }
    }

    pub fn similar(reason: String, score: f64) -> Self {
        Self {
            category: MatchCategory::Similar,
            reason,
            score: Some(score),
        }
    }

    pub fn cross_source(reason: String, score: f64) -> Self {
        Self {
            category: MatchCategory::CrossSource,
            reason,
            score: Some(score),
        }
    }
}

/// String-similarity ratio on a 0-100 scale. The matchers only ever talk to
/// this trait so the underlying algorithm can be swapped (or faked in
/// tests) without touching any dedup logic.
pub trait SimilarityScorer: Send + Sync {
    fn ratio(&self, a: &str, b: &str) -> f64;

    fn name(&self) -> &'static str {
        "similarity"
    }
}

/// Default scorer: normalized Levenshtein edit distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLevenshtein;

impl SimilarityScorer for NormalizedLevenshtein {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b) * 100.0
    }

    fn name(&self) -> &'static str {
        "normalized_levenshtein"
    }
}

/// Alternative scorer weighting shared prefixes, useful for titles that
/// diverge only in trailing qualifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl SimilarityScorer for JaroWinkler {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        strsim::jaro_winkler(a, b) * 100.0
    }

    fn name(&self) -> &'static str {
        "jaro_winkler"
    }
}
