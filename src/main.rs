use anyhow::{Context, Result};
use chrono::Utc;
use govdedupe_lib::config::{MatchingConfig, PipelineConfig, ScoringConfig};
use govdedupe_lib::dedup::Deduplicator;
use govdedupe_lib::export::Exporter;
use govdedupe_lib::labeler::LabelClassifier;
use govdedupe_lib::models::RawRecord;
use govdedupe_lib::results::RunReport;
use govdedupe_lib::validate::RecordValidator;
use govdedupe_lib::versioning::group_versions;
use log::{info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    info!("Starting government action record pipeline");

    let config = PipelineConfig::from_env();
    config.log_config();
    let matching = MatchingConfig::from_env();
    matching.log_config();

    let mut phase_times = HashMap::new();
    let run_id = Uuid::new_v4().to_string();
    let started_at = Utc::now();
    info!("Pipeline run ID: {}", run_id);

    // Phase 1: Load raw records
    info!(
        "[1/5] Loading raw records from {}",
        config.input_path.display()
    );
    let phase1_start = Instant::now();
    let raw_records = load_raw_records(&config.input_path)?;
    let input_count = raw_records.len();
    let phase1_duration = phase1_start.elapsed();
    phase_times.insert("load".to_string(), phase1_duration);
    info!(
        "[1/5] Loaded {} raw records in {:.2?} (20%)",
        input_count, phase1_duration
    );

    // Phase 2: Validation
    info!(
        "[2/5] Validating {} records (strict={})",
        input_count, config.strict_validation
    );
    let phase2_start = Instant::now();
    let validator = RecordValidator::new(config.strict_validation);
    let (records, validation_stats) = validator.process(raw_records);
    let phase2_duration = phase2_start.elapsed();
    phase_times.insert("validate".to_string(), phase2_duration);
    info!(
        "[2/5] Validation kept {} records ({} fixed, {} rejected) in {:.2?} (40%)",
        records.len(),
        validation_stats.fixed_count,
        validation_stats.rejected_count,
        phase2_duration
    );

    // Phase 3: Deduplication, then version grouping over the survivors
    info!("[3/5] Deduplicating {} records", records.len());
    let phase3_start = Instant::now();
    let deduplicator = Deduplicator::new(matching, ScoringConfig::default());
    let (records, dedup_summary) = deduplicator.run(records);
    let (mut records, version_stats) = group_versions(records);
    let phase3_duration = phase3_start.elapsed();
    phase_times.insert("dedup".to_string(), phase3_duration);
    info!(
        "[3/5] Dedup and version grouping kept {} records in {:.2?} (60%)",
        records.len(),
        phase3_duration
    );

    // Phase 4: Label classification
    info!("[4/5] Classifying topic labels");
    let phase4_start = Instant::now();
    let classifier = LabelClassifier::new();
    let label_stats = classifier.process(&mut records);
    let phase4_duration = phase4_start.elapsed();
    phase_times.insert("label".to_string(), phase4_duration);
    info!(
        "[4/5] Assigned {} labels across {} records in {:.2?} (80%)",
        label_stats.labels_assigned,
        records.len(),
        phase4_duration
    );

    // Phase 5: Export
    info!(
        "[5/5] Exporting {} records to {}",
        records.len(),
        config.output_dir.display()
    );
    let phase5_start = Instant::now();
    let exporter = Exporter::new(&config.output_dir, true);
    exporter.export(&records)?;
    let phase5_duration = phase5_start.elapsed();
    phase_times.insert("export".to_string(), phase5_duration);
    info!("[5/5] Export complete in {:.2?} (100%)", phase5_duration);

    let total_time =
        phase1_duration + phase2_duration + phase3_duration + phase4_duration + phase5_duration;
    let completed_at = Utc::now();

    info!("=== Pipeline Summary ===");
    info!("Run ID: {}", run_id);
    info!("Input records: {}", input_count);
    info!(
        "Validated: {} ({} fixed, {} rejected)",
        validation_stats.output_count, validation_stats.fixed_count, validation_stats.rejected_count
    );
    info!(
        "Duplicates removed: {} exact, {} similar, {} cross-source",
        dedup_summary.exact.removed,
        dedup_summary.similar.removed,
        dedup_summary.cross_source.removed
    );
    info!(
        "Version groups: {} ({} versions preserved)",
        version_stats.base_actions, version_stats.versions_preserved
    );
    info!(
        "Labels assigned: {} ({:.2} per record)",
        label_stats.labels_assigned,
        label_stats.average_per_record()
    );
    info!("Final records: {}", records.len());
    info!("=== Timing Breakdown ===");
    info!("Phase 1 (Load): {:.2?}", phase1_duration);
    info!("Phase 2 (Validation): {:.2?}", phase2_duration);
    info!("Phase 3 (Dedup & Versions): {:.2?}", phase3_duration);
    info!("Phase 4 (Labeling): {:.2?}", phase4_duration);
    info!("Phase 5 (Export): {:.2?}", phase5_duration);
    info!("Total execution time: {:.2?}", total_time);

    if let Some(report_path) = &config.run_report_path {
        let report = RunReport {
            run_id,
            started_at: started_at.to_rfc3339(),
            completed_at: completed_at.to_rfc3339(),
            duration_seconds: total_time.as_secs_f64(),
            input_count,
            validated_count: validation_stats.output_count,
            deduplicated_count: dedup_summary.output_count,
            final_count: records.len(),
            exact_removed: dedup_summary.exact.removed,
            similar_removed: dedup_summary.similar.removed,
            cross_source_removed: dedup_summary.cross_source.removed,
            version_groups: version_stats.base_actions,
            versions_preserved: version_stats.versions_preserved,
            labels_assigned: label_stats.labels_assigned,
            phase_seconds: phase_times
                .iter()
                .map(|(name, duration)| (name.clone(), duration.as_secs_f64()))
                .collect(),
        };
        write_run_report(report_path, &report)?;
    }

    info!("Pipeline completed successfully!");
    Ok(())
}

/// Parse the scraper output file: a JSON array of loosely-shaped records.
/// Entries that are not objects are skipped with a warning rather than
/// failing the run.
fn load_raw_records(path: &Path) -> Result<Vec<RawRecord>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    let values: Vec<Value> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {} as a JSON array", path.display()))?;

    let total = values.len();
    let mut records = Vec::with_capacity(total);
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<RawRecord>(value) {
            Ok(record) => records.push(record),
            Err(error) => warn!("Skipping entry {}: {}", index, error),
        }
    }
    if records.len() < total {
        warn!(
            "Skipped {} of {} entries that were not record objects",
            total - records.len(),
            total
        );
    }
    Ok(records)
}

fn write_run_report(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create report directory {}", parent.display())
            })?;
        }
    }
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write run report to {}", path.display()))?;
    info!("Run report written to {}", path.display());
    Ok(())
}
