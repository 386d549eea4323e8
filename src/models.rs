// src/models.rs
// Core record types shared across the pipeline.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fixed topical label set the front end understands. The validator
/// drops anything outside this list and the classifier only ever assigns
/// from it.
pub const PREDEFINED_LABELS: [&str; 15] = [
    "Housing",
    "Health",
    "Education",
    "Infrastructure",
    "Environment",
    "Economy",
    "Justice",
    "Immigration",
    "Defence",
    "Transport",
    "Social Welfare",
    "Tax",
    "Local Government",
    "Treaty of Waitangi",
    "Agriculture",
];

/// The four systems records are scraped from, serialized as the upper-case
/// identifiers the exported data file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceSystem {
    Parliament,
    Legislation,
    Gazette,
    Beehive,
}

impl SourceSystem {
    pub const ALL: [SourceSystem; 4] = [
        SourceSystem::Parliament,
        SourceSystem::Legislation,
        SourceSystem::Gazette,
        SourceSystem::Beehive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceSystem::Parliament => "PARLIAMENT",
            SourceSystem::Legislation => "LEGISLATION",
            SourceSystem::Gazette => "GAZETTE",
            SourceSystem::Beehive => "BEEHIVE",
        }
    }

    /// Prefix used when generating record ids for this source.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            SourceSystem::Parliament => "parl",
            SourceSystem::Legislation => "leg",
            SourceSystem::Gazette => "gaz",
            SourceSystem::Beehive => "bee",
        }
    }

    /// Formal documents (bills, acts, notices) as opposed to ministerial
    /// announcements. Cross-source matching treats these asymmetrically.
    pub fn is_formal_document(&self) -> bool {
        !matches!(self, SourceSystem::Beehive)
    }

    /// Resolve the upstream names scrapers use for a source. Matching is
    /// case-insensitive and covers the aliases observed in scraper output.
    pub fn from_alias(value: &str) -> Option<SourceSystem> {
        match value.trim().to_lowercase().as_str() {
            "parliament" | "bills" | "bill" => Some(SourceSystem::Parliament),
            "legislation" | "acts" | "act" => Some(SourceSystem::Legislation),
            "gazette" | "notices" | "notice" => Some(SourceSystem::Gazette),
            "beehive" | "announcements" | "announcement" | "press release" | "press releases" => {
                Some(SourceSystem::Beehive)
            }
            _ => None,
        }
    }
}

impl fmt::Display for SourceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One step of a bill's progress through the house.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageHistory {
    pub stage: String,
    pub date: String,
}

/// Source-specific fields. Every field is optional; serialization omits
/// absent ones so exported metadata objects stay sparse. Fields a scraper
/// emits that we do not model explicitly are preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parliament_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_history: Option<Vec<StageHistory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commencement_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ActionMetadata {
    /// Number of populated fields, used by representative scoring.
    pub fn field_count(&self) -> usize {
        let known = [
            self.bill_number.is_some(),
            self.parliament_number.is_some(),
            self.stage_history.is_some(),
            self.act_number.is_some(),
            self.commencement_date.is_some(),
            self.notice_number.is_some(),
            self.notice_type.is_some(),
            self.document_type.is_some(),
            self.portfolio.is_some(),
        ];
        known.iter().filter(|populated| **populated).count() + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// All string-valued fields, for label classification text assembly.
    pub fn text_values(&self) -> Vec<&str> {
        let mut values = Vec::new();
        for field in [
            &self.bill_number,
            &self.act_number,
            &self.commencement_date,
            &self.notice_number,
            &self.notice_type,
            &self.document_type,
            &self.portfolio,
        ] {
            if let Some(value) = field {
                values.push(value.as_str());
            }
        }
        for value in self.extra.values() {
            if let Some(text) = value.as_str() {
                values.push(text);
            }
        }
        values
    }
}

/// A validated government action. The unit the dedup/version core operates
/// on; field order here matches the exported data shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub id: String,
    /// Shared identifier across versions of the same underlying document.
    /// Populated by the version grouper when derivable from `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_id: Option<String>,
    /// Revision marker within a base_id group. Missing means "1".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub title: String,
    pub date: String,
    pub source_system: SourceSystem,
    pub url: String,
    pub primary_entity: String,
    pub summary: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub metadata: ActionMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scraped: Option<String>,
}

impl ActionRecord {
    /// Record date as a calendar date, if it parses as ISO.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }
}

/// The shape scrapers hand us: everything optional, source a free-form
/// string, version possibly a bare integer, labels and metadata raw JSON
/// until the validator coerces them. Only the validator reads this.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub id: Option<String>,
    pub base_id: Option<String>,
    pub version: Option<Value>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub source_system: Option<String>,
    pub url: Option<String>,
    pub primary_entity: Option<String>,
    pub summary: Option<String>,
    pub labels: Option<Value>,
    pub metadata: Option<Value>,
    pub last_scraped: Option<String>,
}

impl RawRecord {
    /// Version field as a string, whether the scraper sent `3` or `"v3"`.
    pub fn version_string(&self) -> Option<String> {
        match &self.version {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_system_aliases() {
        assert_eq!(
            SourceSystem::from_alias("Bills"),
            Some(SourceSystem::Parliament)
        );
        assert_eq!(
            SourceSystem::from_alias("acts"),
            Some(SourceSystem::Legislation)
        );
        assert_eq!(
            SourceSystem::from_alias("  notices "),
            Some(SourceSystem::Gazette)
        );
        assert_eq!(
            SourceSystem::from_alias("Press Releases"),
            Some(SourceSystem::Beehive)
        );
        assert_eq!(SourceSystem::from_alias("rss"), None);
    }

    #[test]
    fn test_source_system_serialization() {
        let json = serde_json::to_string(&SourceSystem::Parliament).unwrap();
        assert_eq!(json, "\"PARLIAMENT\"");
        let back: SourceSystem = serde_json::from_str("\"BEEHIVE\"").unwrap();
        assert_eq!(back, SourceSystem::Beehive);
    }

    #[test]
    fn test_formal_document_split() {
        assert!(SourceSystem::Parliament.is_formal_document());
        assert!(SourceSystem::Legislation.is_formal_document());
        assert!(SourceSystem::Gazette.is_formal_document());
        assert!(!SourceSystem::Beehive.is_formal_document());
    }

    #[test]
    fn test_metadata_field_count() {
        let mut metadata = ActionMetadata::default();
        assert_eq!(metadata.field_count(), 0);
        assert!(metadata.is_empty());

        metadata.bill_number = Some("123-1".to_string());
        metadata.portfolio = Some("Housing".to_string());
        metadata
            .extra
            .insert("reading".to_string(), Value::String("first".to_string()));
        assert_eq!(metadata.field_count(), 3);
        assert!(!metadata.is_empty());
    }

    #[test]
    fn test_raw_record_version_string() {
        let raw: RawRecord = serde_json::from_str(r#"{"version": 3}"#).unwrap();
        assert_eq!(raw.version_string(), Some("3".to_string()));

        let raw: RawRecord = serde_json::from_str(r#"{"version": "v2"}"#).unwrap();
        assert_eq!(raw.version_string(), Some("v2".to_string()));

        let raw: RawRecord = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(raw.version_string(), None);
    }

    #[test]
    fn test_action_record_date_parsing() {
        let record = ActionRecord {
            id: "parl-2024-001".to_string(),
            base_id: None,
            version: None,
            title: "Test Bill".to_string(),
            date: "2024-12-15".to_string(),
            source_system: SourceSystem::Parliament,
            url: "https://bills.parliament.nz/test".to_string(),
            primary_entity: "New Zealand Parliament".to_string(),
            summary: String::new(),
            labels: Vec::new(),
            metadata: ActionMetadata::default(),
            last_scraped: None,
        };
        assert!(record.parsed_date().is_some());

        let mut bad = record.clone();
        bad.date = "15 December".to_string();
        assert!(bad.parsed_date().is_none());
    }

    #[test]
    fn test_metadata_extra_fields_roundtrip() {
        let json = r#"{"bill_number":"99-2","reading":"second"}"#;
        let metadata: ActionMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.bill_number.as_deref(), Some("99-2"));
        assert_eq!(
            metadata.extra.get("reading").and_then(|v| v.as_str()),
            Some("second")
        );
        assert_eq!(metadata.field_count(), 2);
    }
}
