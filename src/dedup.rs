// src/dedup.rs
// The deduplication orchestrator: exact, then similar, then cross-source.
// Stage order is fixed; exact duplicates must come off first so the fuzzy
// stages run over a smaller, pre-cleaned list.

use std::time::Instant;

use log::{debug, info};

use crate::cluster::build_clusters;
use crate::config::{MatchingConfig, ScoringConfig};
use crate::matching::{
    match_cross_source, match_exact, match_similar, NormalizedLevenshtein, SimilarityScorer,
};
use crate::models::{ActionRecord, SourceSystem};
use crate::results::{DedupSummary, StageStats};
use crate::select::select_representative;

pub struct Deduplicator {
    matching: MatchingConfig,
    scoring: ScoringConfig,
    scorer: Box<dyn SimilarityScorer>,
}

impl Deduplicator {
    pub fn new(matching: MatchingConfig, scoring: ScoringConfig) -> Self {
        Self {
            matching,
            scoring,
            scorer: Box::new(NormalizedLevenshtein),
        }
    }

    /// Same orchestrator with a different similarity algorithm plugged in.
    pub fn with_scorer(
        matching: MatchingConfig,
        scoring: ScoringConfig,
        scorer: Box<dyn SimilarityScorer>,
    ) -> Self {
        Self {
            matching,
            scoring,
            scorer,
        }
    }

    /// Run all three stages in order. Returns the surviving records (a
    /// strict subset of the input, content untouched) and per-stage
    /// accounting whose removals sum to `input - output`.
    pub fn run(&self, records: Vec<ActionRecord>) -> (Vec<ActionRecord>, DedupSummary) {
        let input_count = records.len();
        if records.is_empty() {
            return (records, DedupSummary::default());
        }

        info!(
            "Starting deduplication of {} records ({} scorer)",
            input_count,
            self.scorer.name()
        );

        let (records, exact) = self.dedup_exact(records);
        let (records, similar) = self.dedup_similar(records);
        let (records, cross_source) = self.dedup_cross_source(records);

        let summary = DedupSummary {
            input_count,
            output_count: records.len(),
            exact,
            similar,
            cross_source,
        };
        info!(
            "Deduplication kept {}/{} records (exact -{}, similar -{}, cross-source -{})",
            summary.output_count,
            summary.input_count,
            summary.exact.removed,
            summary.similar.removed,
            summary.cross_source.removed
        );
        (records, summary)
    }

    /// Stage 1: identical id or normalized URL. First-seen member of each
    /// cluster survives; no scoring involved.
    fn dedup_exact(&self, records: Vec<ActionRecord>) -> (Vec<ActionRecord>, StageStats) {
        let started = Instant::now();
        let input_count = records.len();
        let mut pairs_compared = 0usize;

        let clusters = build_clusters(&records, |anchor, candidate| {
            pairs_compared += 1;
            match match_exact(anchor, candidate) {
                Some(verdict) => {
                    debug!(
                        "'{}' is an exact duplicate of '{}': {}",
                        candidate.id, anchor.id, verdict.reason
                    );
                    true
                }
                None => false,
            }
        });

        let clusters_merged = clusters.iter().filter(|c| c.len() > 1).count();
        let mut keep = vec![false; records.len()];
        for cluster in &clusters {
            keep[cluster[0]] = true;
        }
        let survivors: Vec<ActionRecord> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| keep[index].then_some(record))
            .collect();

        let stats = stage_stats(
            "exact",
            input_count,
            survivors.len(),
            pairs_compared,
            clusters_merged,
            started,
        );
        (survivors, stats)
    }

    /// Stage 2: fuzzy title/date/URL matching within a single source
    /// system. Clusters collapse to their highest-scoring member under the
    /// same-source priority table.
    fn dedup_similar(&self, records: Vec<ActionRecord>) -> (Vec<ActionRecord>, StageStats) {
        let matching = &self.matching;
        let scorer = self.scorer.as_ref();
        self.collapse_scored(
            "similar",
            records,
            &self.scoring.same_source_priority,
            |anchor, candidate| {
                if anchor.source_system != candidate.source_system {
                    return None;
                }
                match_similar(anchor, candidate, matching, scorer)
            },
        )
    }

    /// Stage 3: cross-source identity (bill/act, announcement/formal,
    /// near-identical titles). Clusters collapse under the inverted
    /// priority table so formal documents outrank announcements.
    fn dedup_cross_source(&self, records: Vec<ActionRecord>) -> (Vec<ActionRecord>, StageStats) {
        let matching = &self.matching;
        let scorer = self.scorer.as_ref();
        self.collapse_scored(
            "cross-source",
            records,
            &self.scoring.cross_source_priority,
            |anchor, candidate| match_cross_source(anchor, candidate, matching, scorer),
        )
    }

    /// Cluster with the given matcher, then keep one scored representative
    /// per cluster, in cluster order.
    fn collapse_scored<F>(
        &self,
        stage: &str,
        records: Vec<ActionRecord>,
        priority_table: &[SourceSystem],
        mut matcher: F,
    ) -> (Vec<ActionRecord>, StageStats)
    where
        F: FnMut(&ActionRecord, &ActionRecord) -> Option<crate::matching::MatchVerdict>,
    {
        let started = Instant::now();
        let input_count = records.len();
        let mut pairs_compared = 0usize;

        let clusters = build_clusters(&records, |anchor, candidate| {
            pairs_compared += 1;
            match matcher(anchor, candidate) {
                Some(verdict) => {
                    debug!(
                        "'{}' clusters with '{}' ({}): {}",
                        candidate.id, anchor.id, stage, verdict.reason
                    );
                    true
                }
                None => false,
            }
        });

        let clusters_merged = clusters.iter().filter(|c| c.len() > 1).count();
        let mut keep = vec![false; records.len()];
        for cluster in &clusters {
            if let Some(winner) =
                select_representative(cluster, &records, priority_table, &self.scoring)
            {
                keep[winner] = true;
            }
        }
        let survivors: Vec<ActionRecord> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| keep[index].then_some(record))
            .collect();

        let stats = stage_stats(
            stage,
            input_count,
            survivors.len(),
            pairs_compared,
            clusters_merged,
            started,
        );
        (survivors, stats)
    }
}

fn stage_stats(
    stage: &str,
    input_count: usize,
    output_count: usize,
    pairs_compared: usize,
    clusters_merged: usize,
    started: Instant,
) -> StageStats {
    let stats = StageStats {
        input_count,
        output_count,
        removed: input_count - output_count,
        pairs_compared,
        clusters_merged,
        processing_time: started.elapsed(),
    };
    info!(
        "Dedup stage {}: {} -> {} records ({} removed, {} pairs compared, {} clusters merged) in {:.2?}",
        stage,
        stats.input_count,
        stats.output_count,
        stats.removed,
        stats.pairs_compared,
        stats.clusters_merged,
        stats.processing_time
    );
    stats
}
