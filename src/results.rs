// src/results.rs
// Stats produced by each pipeline phase, and the serializable run report
// the binary can write next to its outputs.

use std::collections::BTreeMap;
use std::time::Duration;

use log::info;
use serde::Serialize;

/// Validator counters.
#[derive(Debug, Default, Clone)]
pub struct ValidationStats {
    pub input_count: usize,
    pub output_count: usize,
    pub fixed_count: usize,
    pub rejected_count: usize,
    pub error_count: usize,
}

/// One deduplication stage's counters.
#[derive(Debug, Default, Clone)]
pub struct StageStats {
    pub input_count: usize,
    pub output_count: usize,
    pub removed: usize,
    pub pairs_compared: usize,
    pub clusters_merged: usize,
    pub processing_time: Duration,
}

/// Whole-orchestrator accounting. Per-stage removals always sum to
/// `input_count - output_count`.
#[derive(Debug, Default, Clone)]
pub struct DedupSummary {
    pub input_count: usize,
    pub output_count: usize,
    pub exact: StageStats,
    pub similar: StageStats,
    pub cross_source: StageStats,
}

impl DedupSummary {
    pub fn total_removed(&self) -> usize {
        self.exact.removed + self.similar.removed + self.cross_source.removed
    }
}

/// Version grouper counters. `base_actions` counts multi-version groups,
/// `versions_preserved` the records retained inside them.
#[derive(Debug, Default, Clone)]
pub struct VersionStats {
    pub total_processed: usize,
    pub duplicates_found: usize,
    pub versions_preserved: usize,
    pub base_actions: usize,
}

/// Label classifier counters.
#[derive(Debug, Default, Clone)]
pub struct LabelStats {
    pub input_count: usize,
    pub labels_assigned: usize,
    pub unlabeled_count: usize,
}

impl LabelStats {
    pub fn average_per_record(&self) -> f64 {
        if self.input_count == 0 {
            return 0.0;
        }
        self.labels_assigned as f64 / self.input_count as f64
    }
}

/// Processor-style completion line: input, output, signed delta.
pub fn log_processing_delta(name: &str, input_count: usize, output_count: usize) {
    info!(
        "{}: Processed {} items, output {} items ({:+})",
        name,
        input_count,
        output_count,
        output_count as i64 - input_count as i64
    );
}

/// Serializable record of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: String,
    pub completed_at: String,
    pub duration_seconds: f64,
    pub input_count: usize,
    pub validated_count: usize,
    pub deduplicated_count: usize,
    pub final_count: usize,
    pub exact_removed: usize,
    pub similar_removed: usize,
    pub cross_source_removed: usize,
    pub version_groups: usize,
    pub versions_preserved: usize,
    pub labels_assigned: usize,
    pub phase_seconds: BTreeMap<String, f64>,
}
