// src/matching/mod.rs

pub mod cross_source;
pub mod exact;
pub mod similar;
pub mod types;

// Re-export the per-stage matchers and verdict types for cleaner imports
pub use cross_source::match_cross_source;
pub use exact::match_exact;
pub use similar::{dates_proximate, match_similar};
pub use types::{
    JaroWinkler, MatchCategory, MatchVerdict, NormalizedLevenshtein, SimilarityScorer,
};
