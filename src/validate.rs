// src/validate.rs
// Raw-record validation and repair, run before deduplication. Non-strict
// mode (the default) repairs whatever it can and never drops a record;
// strict mode drops any record that accumulated a validation error.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Utc};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::{ActionMetadata, ActionRecord, RawRecord, SourceSystem, PREDEFINED_LABELS};
use crate::results::{log_processing_delta, ValidationStats};

/// Expected id shape: `{source_prefix}-{year}-{number}`.
static ID_FORMAT: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[a-z]{3,8}-\d{4}-\d{3,6}$").ok());

static ID_JUNK: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9-]").ok());

static ISO_DATE_SHAPE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok());

static URL_SHAPE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)^https?://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
    )
    .ok()
});

/// Qualifiers scrapers sometimes stack onto titles.
static TITLE_QUALIFIERS: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)^(?:New Zealand |NZ |Government |Official )+").ok());

/// Date formats observed in scraper output, tried in order.
const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
];

/// Current minister per portfolio, for primary-entity inference.
const PORTFOLIO_MINISTERS: [(&str, &str); 7] = [
    ("Prime Minister", "Rt Hon Christopher Luxon"),
    ("Finance", "Hon Nicola Willis"),
    ("Housing", "Hon Chris Bishop"),
    ("Health", "Hon Dr Shane Reti"),
    ("Education", "Hon Erica Stanford"),
    ("Transport", "Hon Simeon Brown"),
    ("Justice", "Hon Mark Mitchell"),
];

pub struct RecordValidator {
    strict_mode: bool,
}

impl RecordValidator {
    pub fn new(strict_mode: bool) -> Self {
        Self { strict_mode }
    }

    /// Validate and repair a batch of raw records. Returns the typed
    /// records plus counts of what was repaired, rejected and flagged.
    pub fn process(&self, raw: Vec<RawRecord>) -> (Vec<ActionRecord>, ValidationStats) {
        let input_count = raw.len();
        info!(
            "Starting validation of {} raw records (strict_mode={})",
            input_count, self.strict_mode
        );

        let mut stats = ValidationStats {
            input_count,
            ..ValidationStats::default()
        };
        let mut output = Vec::with_capacity(input_count);
        for (index, record) in raw.iter().enumerate() {
            let mut errors = Vec::new();
            let (validated, fixed) = self.validate_record(record, index, &mut errors);
            for error in &errors {
                debug!("Validation error: {}", error);
            }
            stats.error_count += errors.len();
            if self.strict_mode && !errors.is_empty() {
                warn!(
                    "Rejecting record {} ('{}'): {} validation errors",
                    index,
                    validated.title,
                    errors.len()
                );
                stats.rejected_count += 1;
                continue;
            }
            if fixed {
                stats.fixed_count += 1;
            }
            output.push(validated);
        }
        stats.output_count = output.len();

        if stats.rejected_count > 0 {
            warn!(
                "Rejected {} records due to validation errors",
                stats.rejected_count
            );
        }
        if stats.fixed_count > 0 {
            info!("Repaired validation issues in {} records", stats.fixed_count);
        }
        if stats.error_count > 0 {
            info!("Found {} validation errors", stats.error_count);
        }
        log_processing_delta("validation", input_count, stats.output_count);
        (output, stats)
    }

    fn validate_record(
        &self,
        raw: &RawRecord,
        index: usize,
        errors: &mut Vec<String>,
    ) -> (ActionRecord, bool) {
        let mut fixed = false;

        let title_raw = raw.title.clone().unwrap_or_default();
        let url_raw = raw.url.clone().unwrap_or_default();
        if title_raw.is_empty() {
            errors.push(format!("record {}: missing required field 'title'", index));
        }
        if url_raw.is_empty() {
            errors.push(format!("record {}: missing required field 'url'", index));
        }
        if raw.source_system.as_deref().unwrap_or("").is_empty() {
            errors.push(format!(
                "record {}: missing required field 'source_system'",
                index
            ));
        }

        let source_system = match raw.source_system.as_deref().filter(|s| !s.is_empty()) {
            Some(name) => {
                if let Some(source) = SourceSystem::ALL.iter().find(|s| s.as_str() == name) {
                    *source
                } else if let Some(source) = SourceSystem::from_alias(name) {
                    debug!(
                        "record {}: normalized source_system '{}' to {}",
                        index, name, source
                    );
                    fixed = true;
                    source
                } else {
                    errors.push(format!("record {}: invalid source_system '{}'", index, name));
                    fixed = true;
                    SourceSystem::Beehive
                }
            }
            None => {
                let inferred = infer_source_from_url(&url_raw);
                debug!("record {}: inferred source_system {} from url", index, inferred);
                fixed = true;
                inferred
            }
        };

        let date = match raw.date.as_deref().filter(|d| !d.is_empty()) {
            Some(raw_date) => match normalize_date(raw_date) {
                Some(normalized) => {
                    if normalized != raw_date {
                        fixed = true;
                    }
                    normalized
                }
                None => {
                    errors.push(format!(
                        "record {}: unrecognized date format '{}'",
                        index, raw_date
                    ));
                    warn!(
                        "record {}: unrecognized date '{}', falling back to today",
                        index, raw_date
                    );
                    fixed = true;
                    today()
                }
            },
            None => {
                debug!("record {}: missing date, using today", index);
                fixed = true;
                today()
            }
        };

        let id = match raw.id.as_deref().filter(|s| !s.is_empty()) {
            Some(raw_id) => {
                let (repaired, changed) = repair_id(raw_id, index, errors);
                if changed {
                    fixed = true;
                }
                repaired
            }
            None => {
                let generated = generate_id(source_system, &date, index);
                debug!("record {}: generated id {}", index, generated);
                fixed = true;
                generated
            }
        };

        let (url, url_changed) = repair_url(&url_raw, index, errors);
        if url_changed {
            fixed = true;
        }

        let title = clean_title(&title_raw);
        if title != title_raw {
            fixed = true;
        }

        let summary_raw = raw.summary.clone().unwrap_or_default();
        let summary = clean_summary(&summary_raw);
        if summary != summary_raw {
            fixed = true;
        }

        let metadata = match &raw.metadata {
            None | Some(Value::Null) => ActionMetadata::default(),
            Some(value @ Value::Object(_)) => {
                match serde_json::from_value::<ActionMetadata>(value.clone()) {
                    Ok(mut metadata) => {
                        if scrub_metadata(&mut metadata) {
                            fixed = true;
                        }
                        metadata
                    }
                    Err(e) => {
                        errors.push(format!(
                            "record {}: metadata failed to deserialize: {}",
                            index, e
                        ));
                        fixed = true;
                        ActionMetadata::default()
                    }
                }
            }
            Some(other) => {
                errors.push(format!(
                    "record {}: metadata must be an object, got {}",
                    index,
                    value_kind(other)
                ));
                fixed = true;
                ActionMetadata::default()
            }
        };

        let primary_entity = match raw.primary_entity.as_deref().filter(|s| !s.is_empty()) {
            Some(entity) => entity.to_string(),
            None => {
                fixed = true;
                infer_primary_entity(source_system, &title, &metadata)
            }
        };

        let labels = match &raw.labels {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => {
                let mut originals = Vec::with_capacity(items.len());
                let mut kept = BTreeSet::new();
                for item in items {
                    match item {
                        Value::String(label) => {
                            if PREDEFINED_LABELS.contains(&label.as_str()) {
                                kept.insert(label.clone());
                            } else {
                                errors.push(format!(
                                    "record {}: unknown label '{}'",
                                    index, label
                                ));
                            }
                            originals.push(label.clone());
                        }
                        other => {
                            errors.push(format!("record {}: unknown label '{}'", index, other));
                            originals.push(other.to_string());
                        }
                    }
                }
                let finals: Vec<String> = kept.into_iter().collect();
                if finals != originals {
                    fixed = true;
                }
                finals
            }
            Some(other) => {
                errors.push(format!(
                    "record {}: labels must be an array, got {}",
                    index,
                    value_kind(other)
                ));
                fixed = true;
                Vec::new()
            }
        };

        let record = ActionRecord {
            id,
            base_id: raw.base_id.clone().filter(|s| !s.is_empty()),
            version: raw.version_string(),
            title,
            date,
            source_system,
            url,
            primary_entity,
            summary,
            labels,
            metadata,
            last_scraped: raw.last_scraped.clone().filter(|s| !s.is_empty()),
        };
        (record, fixed)
    }
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

fn infer_source_from_url(url: &str) -> SourceSystem {
    let url = url.to_lowercase();
    if url.contains("parliament.nz") {
        SourceSystem::Parliament
    } else if url.contains("legislation.govt.nz") {
        SourceSystem::Legislation
    } else if url.contains("gazette.govt.nz") {
        SourceSystem::Gazette
    } else {
        SourceSystem::Beehive
    }
}

/// Normalize a date string to ISO, trying each known format. Shape-valid
/// but impossible dates (a 13th month) pass through untouched rather than
/// being replaced with today.
fn normalize_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    if let Some(re) = ISO_DATE_SHAPE.as_ref() {
        if re.is_match(trimmed) {
            return Some(trimmed.to_string());
        }
    }
    None
}

/// Keep a well-formed id, scrub a near-miss, flag anything else. Returns
/// the id and whether it changed.
fn repair_id(raw_id: &str, index: usize, errors: &mut Vec<String>) -> (String, bool) {
    if let Some(format) = ID_FORMAT.as_ref() {
        if format.is_match(raw_id) {
            return (raw_id.to_string(), false);
        }
        if let Some(junk) = ID_JUNK.as_ref() {
            let scrubbed = junk.replace_all(raw_id, "").to_lowercase();
            if format.is_match(&scrubbed) {
                return (scrubbed, true);
            }
        }
    }
    errors.push(format!("record {}: invalid id format '{}'", index, raw_id));
    (raw_id.to_string(), false)
}

fn generate_id(source: SourceSystem, date: &str, index: usize) -> String {
    let year = date
        .get(..4)
        .filter(|y| y.bytes().all(|b| b.is_ascii_digit()))
        .map(str::to_string)
        .unwrap_or_else(|| Utc::now().year().to_string());
    let millis = Utc::now().timestamp_subsec_millis();
    format!("{}-{}-{:03}{:03}", source.id_prefix(), year, index, millis)
}

fn repair_url(raw_url: &str, index: usize, errors: &mut Vec<String>) -> (String, bool) {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return (String::new(), raw_url != trimmed);
    }
    let mut url = trimmed.to_string();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        let looks_like_domain = url.starts_with("www.") || (url.contains('.') && !url.starts_with('/'));
        if looks_like_domain {
            url = format!("https://{}", url);
        }
    }
    if let Some(re) = URL_SHAPE.as_ref() {
        if !re.is_match(&url) {
            errors.push(format!("record {}: invalid url '{}'", index, url));
        }
    }
    let changed = url != raw_url;
    (url, changed)
}

fn clean_title(raw_title: &str) -> String {
    if raw_title.is_empty() {
        return String::new();
    }
    let collapsed = collapse_whitespace(raw_title);
    match TITLE_QUALIFIERS.as_ref() {
        Some(re) => re.replace(&collapsed, "").into_owned(),
        None => collapsed,
    }
}

fn clean_summary(raw_summary: &str) -> String {
    if raw_summary.is_empty() {
        return String::new();
    }
    let mut summary = collapse_whitespace(raw_summary);
    if summary.chars().count() > 1000 {
        summary = summary.chars().take(997).collect();
        summary.push_str("...");
    }
    summary
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim string-valued metadata fields, drop empties. Returns whether
/// anything changed.
fn scrub_metadata(metadata: &mut ActionMetadata) -> bool {
    let mut changed = false;
    for field in [
        &mut metadata.bill_number,
        &mut metadata.act_number,
        &mut metadata.commencement_date,
        &mut metadata.notice_number,
        &mut metadata.notice_type,
        &mut metadata.document_type,
        &mut metadata.portfolio,
    ] {
        if let Some(value) = field.take() {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                changed = true;
            } else if trimmed != value {
                changed = true;
                *field = Some(trimmed.to_string());
            } else {
                *field = Some(value);
            }
        }
    }

    let before = metadata.extra.len();
    metadata.extra.retain(|_, value| {
        !value.is_null() && value.as_str().map_or(true, |s| !s.trim().is_empty())
    });
    if metadata.extra.len() != before {
        changed = true;
    }
    for value in metadata.extra.values_mut() {
        if let Value::String(s) = value {
            if s.trim() != s {
                *s = s.trim().to_string();
                changed = true;
            }
        }
    }
    changed
}

fn infer_primary_entity(source: SourceSystem, title: &str, metadata: &ActionMetadata) -> String {
    if let Some(portfolio) = metadata.portfolio.as_deref() {
        for (known, minister) in PORTFOLIO_MINISTERS {
            if known == portfolio {
                return minister.to_string();
            }
        }
    }
    // Many gazette appointment notices are made by the Governor-General
    if source == SourceSystem::Gazette && title.to_lowercase().contains("appointment") {
        return "Governor-General".to_string();
    }
    match source {
        SourceSystem::Parliament | SourceSystem::Legislation => "Parliament".to_string(),
        SourceSystem::Gazette | SourceSystem::Beehive => "Government".to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
