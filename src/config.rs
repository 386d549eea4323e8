// src/config.rs
// Tunable knobs for matching, representative scoring, and the pipeline
// binary. Everything here is plain data passed into constructors so tests
// can inject alternates without touching process state.

use std::env;
use std::path::PathBuf;

use log::{info, warn};

use crate::models::SourceSystem;

/// Thresholds driving the similar/cross-source matchers. All similarity
/// values are on the 0-100 ratio scale.
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    /// At or above this, titles alone settle it, dates ignored.
    pub exact_match_threshold: f64,
    /// At or above this plus date proximity, records match.
    pub title_similarity_threshold: f64,
    /// Raw-URL similarity needed for a URL-only match.
    pub url_similarity_threshold: f64,
    /// Two dates are "proximate" when this many days apart or fewer.
    pub max_days_diff: i64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            exact_match_threshold: 95.0,
            title_similarity_threshold: 85.0,
            url_similarity_threshold: 90.0,
            max_days_diff: 7,
        }
    }
}

impl MatchingConfig {
    /// Create configuration from environment variables, falling back to
    /// defaults on anything missing or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            exact_match_threshold: env_threshold(
                "DEDUP_EXACT_MATCH_THRESHOLD",
                defaults.exact_match_threshold,
            ),
            title_similarity_threshold: env_threshold(
                "DEDUP_TITLE_SIMILARITY_THRESHOLD",
                defaults.title_similarity_threshold,
            ),
            url_similarity_threshold: env_threshold(
                "DEDUP_URL_SIMILARITY_THRESHOLD",
                defaults.url_similarity_threshold,
            ),
            max_days_diff: env_days("DEDUP_MAX_DAYS_DIFF", defaults.max_days_diff),
        }
    }

    pub fn log_config(&self) {
        info!(
            "Matching thresholds: exact={}, title={}, url={}, max_days_diff={}",
            self.exact_match_threshold,
            self.title_similarity_threshold,
            self.url_similarity_threshold,
            self.max_days_diff
        );
    }
}

/// Source priority tables and weight constants for representative scoring.
/// Rank is positional: the first entry of a table outranks the rest.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Priority order for same-source ("similar") clusters.
    pub same_source_priority: Vec<SourceSystem>,
    /// Inverted order for cross-source clusters: formal authoritative
    /// documents outrank announcements.
    pub cross_source_priority: Vec<SourceSystem>,
    pub priority_weight: f64,
    pub summary_length_divisor: f64,
    pub summary_score_cap: f64,
    pub title_length_divisor: f64,
    pub title_score_cap: f64,
    pub metadata_field_weight: f64,
    pub recency_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            same_source_priority: vec![
                SourceSystem::Parliament,
                SourceSystem::Legislation,
                SourceSystem::Beehive,
                SourceSystem::Gazette,
            ],
            cross_source_priority: vec![
                SourceSystem::Legislation,
                SourceSystem::Parliament,
                SourceSystem::Gazette,
                SourceSystem::Beehive,
            ],
            priority_weight: 10.0,
            summary_length_divisor: 100.0,
            summary_score_cap: 5.0,
            title_length_divisor: 50.0,
            title_score_cap: 3.0,
            metadata_field_weight: 1.0,
            recency_bonus: 1.0,
        }
    }
}

/// Paths and modes for the pipeline binary.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub run_report_path: Option<PathBuf>,
    pub strict_validation: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/raw_actions.json"),
            output_dir: PathBuf::from("out"),
            run_report_path: None,
            strict_validation: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            input_path: env::var("INPUT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.input_path),
            output_dir: env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            run_report_path: env::var("RUN_REPORT_PATH").ok().map(PathBuf::from),
            strict_validation: env::var("VALIDATOR_STRICT")
                .unwrap_or_else(|_| "false".to_string())
                .parse::<bool>()
                .unwrap_or(false),
        }
    }

    pub fn log_config(&self) {
        info!(
            "Pipeline config: input={}, output_dir={}, strict_validation={}",
            self.input_path.display(),
            self.output_dir.display(),
            self.strict_validation
        );
        if let Some(report) = &self.run_report_path {
            info!("   Run report will be written to {}", report.display());
        }
    }
}

fn env_threshold(name: &str, default: f64) -> f64 {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<f64>() {
            Ok(value) if (0.0..=100.0).contains(&value) => value,
            _ => {
                warn!("Ignoring invalid {} value {:?}, using {}", name, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_days(name: &str, default: i64) -> i64 {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<i64>() {
            Ok(value) if value >= 0 => value,
            _ => {
                warn!("Ignoring invalid {} value {:?}, using {}", name, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}
