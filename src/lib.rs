// src/lib.rs
// Record identity pipeline for New Zealand government-action data:
// validation and repair, staged deduplication, version grouping, topic
// labelling, and TypeScript/JSON export.

pub mod cluster;
pub mod config;
pub mod dedup;
pub mod export;
pub mod labeler;
pub mod matching;
pub mod models;
pub mod normalize;
pub mod results;
pub mod select;
pub mod validate;
pub mod versioning;

// Re-export the main pipeline surface at the crate root.
pub use config::{MatchingConfig, PipelineConfig, ScoringConfig};
pub use dedup::Deduplicator;
pub use export::Exporter;
pub use labeler::LabelClassifier;
pub use models::{ActionMetadata, ActionRecord, RawRecord, SourceSystem, PREDEFINED_LABELS};
pub use results::{DedupSummary, LabelStats, RunReport, StageStats, ValidationStats, VersionStats};
pub use validate::RecordValidator;
pub use versioning::group_versions;
