// src/labeler.rs
// Keyword-driven label classification, run after deduplication. Each
// record's text is matched against per-label keyword patterns, then a
// set of business rules refines the result. Assigned labels replace
// whatever the record carried before.

use std::collections::BTreeSet;

use log::{debug, info, warn};
use regex::Regex;

use crate::models::{ActionRecord, SourceSystem};
use crate::results::{log_processing_delta, LabelStats};

/// Default keyword table for the NZ taxonomy. Keyword lists are data,
/// not contract: callers can swap the whole table via `with_keywords`.
pub const DEFAULT_LABEL_KEYWORDS: [(&str, &[&str]); 15] = [
    (
        "Housing",
        &[
            "housing", "homes", "residential", "property", "rent", "rental",
            "accommodation", "tenancy", "landlord", "tenant", "mortgage",
            "affordable housing", "social housing", "public housing",
            "kainga ora", "kāinga ora", "building consent", "construction",
            "development", "urban planning", "zoning", "density",
        ],
    ),
    (
        "Health",
        &[
            "health", "healthcare", "medical", "hospital", "clinic", "doctor",
            "nurse", "patient", "treatment", "medicine", "pharmaceutical",
            "mental health", "public health", "wellbeing", "wellness",
            "health nz", "te whatu ora", "pharmac", "covid", "pandemic",
            "disability", "aged care", "elder care",
        ],
    ),
    (
        "Education",
        &[
            "education", "school", "student", "teacher", "university",
            "college", "learning", "curriculum", "scholarship", "exam",
            "qualification", "training", "skill", "literacy", "numeracy",
            "early childhood", "tertiary", "vocational", "apprenticeship",
            "education funding",
        ],
    ),
    (
        "Infrastructure",
        &[
            "infrastructure", "road", "bridge", "tunnel", "highway",
            "motorway", "rail", "railway", "public transport", "water",
            "sewage", "electricity", "power", "broadband", "internet",
            "telecommunications", "energy", "utility", "construction",
            "development", "maintenance", "upgrade", "investment",
        ],
    ),
    (
        "Environment",
        &[
            "environment", "environmental", "climate", "carbon", "emissions",
            "renewable", "sustainability", "conservation", "biodiversity",
            "pollution", "waste", "recycling", "water quality", "air quality",
            "forest", "marine", "coastal", "national park", "reserve",
            "climate change", "greenhouse gas", "clean energy", "green",
            "nature", "wildlife", "ecosystem",
        ],
    ),
    (
        "Economy",
        &[
            "economy", "economic", "business", "industry", "commerce",
            "trade", "export", "import", "investment", "employment",
            "job", "work", "productivity", "growth", "development",
            "innovation", "technology", "digital", "manufacturing",
            "tourism", "agriculture", "fisheries", "forestry",
            "small business", "enterprise",
        ],
    ),
    (
        "Justice",
        &[
            "justice", "court", "judge", "law", "legal", "crime", "police",
            "prison", "corrections", "bail", "sentence", "trial", "jury",
            "solicitor", "barrister", "lawyer", "attorney", "prosecution",
            "defence", "civil", "criminal", "offence", "penalty", "fine",
            "legal aid", "family court", "youth justice",
        ],
    ),
    (
        "Immigration",
        &[
            "immigration", "migrant", "visa", "residence", "citizenship",
            "border", "refugee", "asylum", "deportation", "work permit",
            "student visa", "family reunion", "skilled migrant",
            "points system", "immigration nz", "customs", "passport",
        ],
    ),
    (
        "Defence",
        &[
            "defence", "defense", "military", "army", "navy", "air force",
            "nzdf", "security", "national security", "peacekeeping",
            "veteran", "deployment", "equipment", "training",
            "international relations", "alliance", "treaty",
        ],
    ),
    (
        "Transport",
        &[
            "transport", "transportation", "road", "rail", "bus", "ferry",
            "aviation", "airport", "port", "shipping", "logistics",
            "public transport", "cycling", "walking", "safety",
            "traffic", "vehicle", "driver", "license", "registration",
            "waka kotahi", "nzta",
        ],
    ),
    (
        "Social Welfare",
        &[
            "welfare", "benefit", "pension", "allowance", "support",
            "social development", "family", "child", "youth", "senior",
            "disability", "poverty", "hardship", "assistance", "community",
            "social service", "msd", "work and income", "winz",
            "superannuation", "accommodation supplement",
        ],
    ),
    (
        "Tax",
        &[
            "tax", "taxation", "gst", "income tax", "company tax",
            "ird", "inland revenue", "customs duty", "excise",
            "tax credit", "tax relief", "tax rate", "tax policy",
            "provisional tax", "fringe benefit", "working for families",
            "family boost", "rates", "levy",
        ],
    ),
    (
        "Local Government",
        &[
            "local government", "council", "mayor", "councillor", "rates",
            "district", "city", "regional", "local authority", "bylaw",
            "planning", "consent", "resource management", "three waters",
            "waste management", "community facility", "library", "park",
            "local road", "water supply", "wastewater",
        ],
    ),
    (
        "Treaty of Waitangi",
        &[
            "treaty", "waitangi", "iwi", "māori", "maori", "tangata whenua",
            "settlement", "claim", "tribunal", "partnership", "sovereignty",
            "tino rangatiratanga", "biculturalism", "te tiriti",
            "indigenous rights", "cultural heritage", "land rights",
            "co-governance", "co-management",
        ],
    ),
    (
        "Agriculture",
        &[
            "agriculture", "farming", "farm", "farmer", "livestock",
            "dairy", "beef", "sheep", "crop", "harvest", "rural",
            "primary sector", "food production", "meat", "milk",
            "wool", "horticulture", "fruit", "vegetable", "wine",
            "viticulture", "pastoral", "irrigation", "drought",
            "biosecurity", "animal welfare",
        ],
    ),
];

/// Portfolio names mapped to the label they imply.
const PORTFOLIO_LABELS: [(&str, &str); 13] = [
    ("Finance", "Economy"),
    ("Housing", "Housing"),
    ("Health", "Health"),
    ("Education", "Education"),
    ("Transport", "Transport"),
    ("Justice", "Justice"),
    ("Environment", "Environment"),
    ("Defence", "Defence"),
    ("Immigration", "Immigration"),
    ("Internal Affairs", "Local Government"),
    ("Social Development", "Social Welfare"),
    ("Agriculture", "Agriculture"),
    ("Prime Minister", "Economy"),
];

pub struct LabelClassifier {
    patterns: Vec<(String, Regex)>,
}

impl LabelClassifier {
    pub fn new() -> Self {
        Self::with_keywords(&DEFAULT_LABEL_KEYWORDS)
    }

    /// Build a classifier from a custom label -> keywords table.
    pub fn with_keywords(table: &[(&str, &[&str])]) -> Self {
        let mut patterns = Vec::with_capacity(table.len());
        for (label, keywords) in table {
            let alternation = keywords
                .iter()
                .map(|keyword| regex::escape(keyword))
                .collect::<Vec<_>>()
                .join("|");
            match Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)) {
                Ok(re) => patterns.push((label.to_string(), re)),
                Err(e) => warn!("Invalid keyword pattern for label '{}': {}", label, e),
            }
        }
        Self { patterns }
    }

    /// Classify every record, replacing its labels with the derived set.
    pub fn process(&self, records: &mut [ActionRecord]) -> LabelStats {
        let input_count = records.len();
        info!("Starting label classification for {} records", input_count);

        let mut stats = LabelStats {
            input_count,
            ..LabelStats::default()
        };
        for record in records.iter_mut() {
            let labels = self.classify(record);
            if labels.is_empty() {
                stats.unlabeled_count += 1;
            }
            stats.labels_assigned += labels.len();
            record.labels = labels;
        }

        info!(
            "Assigned {} labels across {} records (avg {:.1} per record)",
            stats.labels_assigned,
            input_count,
            stats.average_per_record()
        );
        log_processing_delta("labeling", input_count, input_count);
        stats
    }

    /// Labels for a single record, sorted and deduplicated.
    pub fn classify(&self, record: &ActionRecord) -> Vec<String> {
        let text = classification_text(record);
        if text.is_empty() {
            debug!("No text content for record {}", record.id);
            return Vec::new();
        }

        let mut matched: BTreeSet<String> = BTreeSet::new();
        for (label, pattern) in &self.patterns {
            if pattern.is_match(&text) {
                debug!("Record {} matched label '{}'", record.id, label);
                matched.insert(label.clone());
            }
        }
        apply_business_rules(record, &mut matched);
        matched.into_iter().collect()
    }
}

impl Default for LabelClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-cased text blob for keyword scanning. The title is weighted by
/// repetition and the portfolio doubled, matching how the taxonomy was
/// tuned.
fn classification_text(record: &ActionRecord) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let title = record.title.trim();
    if !title.is_empty() {
        for _ in 0..3 {
            parts.push(title);
        }
    }
    let summary = record.summary.trim();
    if !summary.is_empty() {
        parts.push(summary);
    }
    let entity = record.primary_entity.trim();
    if !entity.is_empty() {
        parts.push(entity);
    }
    for value in record.metadata.text_values() {
        if !value.trim().is_empty() {
            parts.push(value);
        }
    }
    if let Some(portfolio) = record.metadata.portfolio.as_deref() {
        let portfolio = portfolio.trim();
        if !portfolio.is_empty() {
            parts.push(portfolio);
            parts.push(portfolio);
        }
    }
    parts.join(" ").to_lowercase()
}

fn apply_business_rules(record: &ActionRecord, labels: &mut BTreeSet<String>) {
    let title = record.title.to_lowercase();

    // Gazette appointment notices carry their subject in the title
    if record.source_system == SourceSystem::Gazette
        && (title.contains("appointment") || title.contains("appoint"))
    {
        if title.contains("judge") || title.contains("court") {
            labels.insert("Justice".to_string());
        } else if title.contains("health") {
            labels.insert("Health".to_string());
        }
    }

    if let Some(portfolio) = record.metadata.portfolio.as_deref() {
        for (known, label) in PORTFOLIO_LABELS {
            if known == portfolio {
                labels.insert(label.to_string());
            }
        }
    }

    // Title substrings, deliberately looser than the word-boundary
    // keyword patterns
    if title.contains("tax") {
        labels.insert("Tax".to_string());
    }
    if title.contains("treaty principles") || title.contains("waitangi") {
        labels.insert("Treaty of Waitangi".to_string());
    }
    if title.contains("gang") && title.contains("legislation") {
        labels.insert("Justice".to_string());
    }

    if labels.contains("Infrastructure") && title.contains("housing") {
        labels.insert("Housing".to_string());
    }

    if labels.contains("Economy") {
        let combined = format!("{} {}", title, record.summary.to_lowercase());
        if ["agriculture", "farming", "rural"]
            .iter()
            .any(|word| combined.contains(word))
        {
            labels.insert("Agriculture".to_string());
        }
    }

    // Amendment acts with no other signal still affect some policy area
    if labels.is_empty()
        && record.source_system == SourceSystem::Legislation
        && title.contains("amendment")
        && !["health", "education", "housing"]
            .iter()
            .any(|word| title.contains(word))
    {
        labels.insert("Economy".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActionMetadata;

    fn record(title: &str, summary: &str, source: SourceSystem) -> ActionRecord {
        ActionRecord {
            id: "test-2024-001".to_string(),
            base_id: None,
            version: None,
            title: title.to_string(),
            date: "2024-06-01".to_string(),
            source_system: source,
            url: "https://example.com/test".to_string(),
            primary_entity: String::new(),
            summary: summary.to_string(),
            labels: Vec::new(),
            metadata: ActionMetadata::default(),
            last_scraped: None,
        }
    }

    #[test]
    fn test_housing_keywords_label_housing() {
        let classifier = LabelClassifier::new();
        let labels = classifier.classify(&record(
            "Affordable housing package announced",
            "",
            SourceSystem::Beehive,
        ));
        assert_eq!(labels, vec!["Housing"]);
    }

    #[test]
    fn test_multiple_labels_from_one_record() {
        let classifier = LabelClassifier::new();
        let labels = classifier.classify(&record(
            "Road and rail infrastructure upgrade near new housing",
            "",
            SourceSystem::Beehive,
        ));
        assert_eq!(labels, vec!["Housing", "Infrastructure", "Transport"]);
    }

    #[test]
    fn test_taxation_act_gets_tax_and_economy() {
        let mut r = record(
            "Taxation (Budget Measures) Act 2024",
            "Income tax changes.",
            SourceSystem::Legislation,
        );
        r.metadata.portfolio = Some("Finance".to_string());
        let labels = LabelClassifier::new().classify(&r);
        assert_eq!(labels, vec!["Economy", "Tax"]);
    }

    #[test]
    fn test_gazette_judicial_appointment_gets_justice() {
        let labels = LabelClassifier::new().classify(&record(
            "Appointment of High Court Judge",
            "",
            SourceSystem::Gazette,
        ));
        assert_eq!(labels, vec!["Justice"]);
    }

    #[test]
    fn test_portfolio_business_rule_adds_label() {
        let mut r = record("Department circular", "", SourceSystem::Beehive);
        r.metadata.portfolio = Some("Internal Affairs".to_string());
        let labels = LabelClassifier::new().classify(&r);
        assert_eq!(labels, vec!["Local Government"]);
    }

    #[test]
    fn test_treaty_bill_gets_treaty_label() {
        let labels = LabelClassifier::new().classify(&record(
            "Treaty Principles Bill",
            "",
            SourceSystem::Parliament,
        ));
        assert!(labels.contains(&"Treaty of Waitangi".to_string()));
    }

    #[test]
    fn test_legislation_amendment_fallback_is_economy() {
        let labels = LabelClassifier::new().classify(&record(
            "Companies Amendment Act",
            "",
            SourceSystem::Legislation,
        ));
        assert_eq!(labels, vec!["Economy"]);
    }

    #[test]
    fn test_keyword_matching_respects_word_boundaries() {
        let classifier = LabelClassifier::new();
        // "farmland" must not hit the "farm" keyword
        assert!(classifier
            .classify(&record("Farmland registry notice", "", SourceSystem::Gazette))
            .is_empty());
        assert_eq!(
            classifier.classify(&record("Farm registry notice", "", SourceSystem::Gazette)),
            vec!["Agriculture"]
        );
    }

    #[test]
    fn test_existing_labels_are_replaced() {
        let classifier = LabelClassifier::new();
        let mut r = record("Hospital funding boost", "", SourceSystem::Beehive);
        r.labels = vec!["Housing".to_string()];
        let mut records = vec![r];
        let stats = classifier.process(&mut records);
        assert_eq!(records[0].labels, vec!["Health"]);
        assert_eq!(stats.labels_assigned, 1);
        assert_eq!(stats.unlabeled_count, 0);
    }

    #[test]
    fn test_empty_record_gets_no_labels() {
        let classifier = LabelClassifier::new();
        let mut records = vec![record("", "", SourceSystem::Beehive)];
        let stats = classifier.process(&mut records);
        assert!(records[0].labels.is_empty());
        assert_eq!(stats.unlabeled_count, 1);
    }

    #[test]
    fn test_custom_keyword_table() {
        let classifier = LabelClassifier::with_keywords(&[("Housing", &["bungalow"])]);
        assert_eq!(
            classifier.classify(&record("Bungalow consent scheme", "", SourceSystem::Beehive)),
            vec!["Housing"]
        );
        assert!(classifier
            .classify(&record("Hospital funding boost", "", SourceSystem::Beehive))
            .is_empty());
    }
}
