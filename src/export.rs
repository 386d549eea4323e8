// src/export.rs
// Output-side of the pipeline: writes the final record list as a
// TypeScript data module for the front end and a plain JSON file for
// API consumers, with an optional timestamped backup of whatever was
// there before.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use log::{info, warn};
use serde::Serialize;

use crate::models::{ActionRecord, PREDEFINED_LABELS};

const GENERATOR_NAME: &str = "govdedupe";
const EXPORT_FORMAT_VERSION: &str = "1.0";

const TS_BANNER_TOP: &str = r"/**
 * Government Actions Data
 *
 * New Zealand government actions collected from official sources:
 * - Parliament (bills.parliament.nz)
 * - Legislation (legislation.govt.nz)
 * - Gazette (gazette.govt.nz)
 * - Beehive (beehive.govt.nz)
 *
 * Generated automatically by the govdedupe pipeline.
";

const TS_BANNER_BOTTOM: &str = r" *
 * DO NOT EDIT MANUALLY - this file is regenerated on every pipeline run.
 */

";

const TS_TYPES: &str = r"export type SourceSystem = 'PARLIAMENT' | 'LEGISLATION' | 'GAZETTE' | 'BEEHIVE';

export interface StageHistory {
  stage: string;
  date: string;
}

export interface ActionMetadata {
  bill_number?: string;
  parliament_number?: number;
  stage_history?: StageHistory[];
  act_number?: string;
  commencement_date?: string;
  notice_number?: string;
  notice_type?: string;
  document_type?: string;
  portfolio?: string;
}

export interface GovernmentAction {
  id: string;
  base_id?: string;
  version?: string;
  title: string;
  date: string;
  source_system: SourceSystem;
  url: string;
  primary_entity: string;
  summary: string;
  labels: string[];
  metadata: ActionMetadata;
}
";

#[derive(Debug, Clone, Serialize)]
struct DateRange {
    earliest: String,
    latest: String,
}

#[derive(Debug, Serialize)]
struct ExportMetadata {
    last_updated: String,
    total_count: usize,
    source_counts: BTreeMap<String, usize>,
    label_counts: BTreeMap<String, usize>,
    date_range: DateRange,
    generated_by: String,
    version: String,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    labels: [&'a str; 15],
    actions: &'a [ActionRecord],
    metadata: &'a ExportMetadata,
}

pub struct Exporter {
    output_dir: PathBuf,
    backup_enabled: bool,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>, backup_enabled: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            backup_enabled,
        }
    }

    pub fn typescript_path(&self) -> PathBuf {
        self.output_dir.join("actions.ts")
    }

    pub fn json_path(&self) -> PathBuf {
        self.output_dir.join("data.json")
    }

    /// Write both output files from the final record list.
    pub fn export(&self, records: &[ActionRecord]) -> Result<()> {
        info!("Exporting {} actions to {}", records.len(), self.output_dir.display());
        let actions = prepare_actions(records);
        let metadata = build_metadata(&actions);

        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "failed to create output directory {}",
                self.output_dir.display()
            )
        })?;
        self.write_typescript(&actions, &metadata)?;
        self.write_json(&actions, &metadata)?;
        Ok(())
    }

    fn write_typescript(&self, actions: &[ActionRecord], metadata: &ExportMetadata) -> Result<()> {
        let path = self.typescript_path();
        self.backup_existing(&path);
        let content = typescript_content(actions, metadata)?;
        fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote TypeScript data module {}", path.display());
        Ok(())
    }

    fn write_json(&self, actions: &[ActionRecord], metadata: &ExportMetadata) -> Result<()> {
        let path = self.json_path();
        self.backup_existing(&path);
        let export = JsonExport {
            labels: PREDEFINED_LABELS,
            actions,
            metadata,
        };
        let content = serde_json::to_string_pretty(&export)
            .context("failed to serialize JSON export")?;
        fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote JSON data file {}", path.display());
        Ok(())
    }

    /// Copy an existing output file to a timestamped sibling. Backup
    /// failure is logged, never fatal.
    fn backup_existing(&self, path: &Path) {
        if !self.backup_enabled || !path.exists() {
            return;
        }
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let backup = backup_path(path, &timestamp);
        match fs::copy(path, &backup) {
            Ok(_) => info!("Created backup {}", backup.display()),
            Err(e) => warn!("Failed to back up {}: {}", path.display(), e),
        }
    }
}

fn backup_path(path: &Path, timestamp: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("export");
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    path.with_file_name(format!("{}.backup_{}{}", stem, timestamp, extension))
}

/// Records in export order: (date, title) descending, labels sorted.
/// `last_scraped` is a pipeline-internal field and is not exported.
fn prepare_actions(records: &[ActionRecord]) -> Vec<ActionRecord> {
    let mut actions: Vec<ActionRecord> = records
        .iter()
        .cloned()
        .map(|mut record| {
            record.labels.sort();
            record.last_scraped = None;
            record
        })
        .collect();
    actions.sort_by(|a, b| {
        (b.date.as_str(), b.title.as_str()).cmp(&(a.date.as_str(), a.title.as_str()))
    });
    actions
}

fn build_metadata(actions: &[ActionRecord]) -> ExportMetadata {
    let mut source_counts: BTreeMap<String, usize> = BTreeMap::new();
    for action in actions {
        *source_counts
            .entry(action.source_system.as_str().to_string())
            .or_insert(0) += 1;
    }

    let mut label_counts: BTreeMap<String, usize> = BTreeMap::new();
    for action in actions {
        for label in &action.labels {
            if PREDEFINED_LABELS.contains(&label.as_str()) {
                *label_counts.entry(label.clone()).or_insert(0) += 1;
            }
        }
    }

    let mut dates: Vec<&str> = actions
        .iter()
        .map(|a| a.date.as_str())
        .filter(|d| !d.is_empty())
        .collect();
    dates.sort_unstable();
    let date_range = DateRange {
        earliest: dates.first().map(|d| d.to_string()).unwrap_or_default(),
        latest: dates.last().map(|d| d.to_string()).unwrap_or_default(),
    };

    ExportMetadata {
        last_updated: Utc::now().to_rfc3339(),
        total_count: actions.len(),
        source_counts,
        label_counts,
        date_range,
        generated_by: GENERATOR_NAME.to_string(),
        version: EXPORT_FORMAT_VERSION.to_string(),
    }
}

fn typescript_content(actions: &[ActionRecord], metadata: &ExportMetadata) -> Result<String> {
    let labels_json = serde_json::to_string_pretty(&PREDEFINED_LABELS)
        .context("failed to serialize label list")?;
    let actions_json =
        serde_json::to_string_pretty(actions).context("failed to serialize actions")?;
    let source_counts_json = serde_json::to_string(&metadata.source_counts)
        .context("failed to serialize source counts")?;
    let date_range_json = serde_json::to_string(&metadata.date_range)
        .context("failed to serialize date range")?;

    let mut content = String::new();
    content.push_str(TS_BANNER_TOP);
    content.push_str(&format!(" * Last updated: {}\n", metadata.last_updated));
    content.push_str(TS_BANNER_BOTTOM);
    content.push_str(TS_TYPES);
    content.push_str(&format!("\nexport const labels = {};\n\n", labels_json));
    content.push_str(&format!(
        "export const actions: GovernmentAction[] = {};\n",
        actions_json
    ));
    content.push_str(&format!(
        "\n/* Export metadata:\n * Last updated: {}\n * Total actions: {}\n * Source counts: {}\n * Date range: {}\n * Generated by: {}\n */\n",
        metadata.last_updated,
        metadata.total_count,
        source_counts_json,
        date_range_json,
        metadata.generated_by
    ));
    Ok(content)
}
