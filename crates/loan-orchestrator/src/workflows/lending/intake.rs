//! Label-driven heuristics that turn free-text applications into structured inputs.
//!
//! Nothing here fails: missing or ambiguous input degrades to defaults.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;

use super::domain::{labels, ClientId, ClientRecord, PropertyIntake, PropertyType};

/// Applications do not collect employment history, so every applicant gets this value.
pub const STABLE_EMPLOYMENT_YEARS: i32 = 3;

const DEFAULT_LOCATION: &str = "Paris";
const SECONDARY_LOCATION: &str = "Lyon";
const HOUSE_KEYWORDS: [&str; 3] = ["maison", "villa", "pavillon"];
const DEFAULT_SIZE_SQM: f64 = 75.0;

static SIZE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*m²").expect("static regex should not panic"));

static LOAN_AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Montant du Prêt Demandé:\s*(\d+)\s*EUR").expect("static regex should not panic")
});

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Email:\s*(\S+)").expect("static regex should not panic"));

/// One row of the extraction table: where a field starts and which labels end it.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub label: &'static str,
    pub stop_labels: &'static [&'static str],
}

/// Generic label scanner driven by a declarative table of [`FieldRule`]s.
#[derive(Debug, Clone)]
pub struct TextFieldExtractor {
    rules: Vec<FieldRule>,
}

impl Default for TextFieldExtractor {
    fn default() -> Self {
        Self::standard()
    }
}

impl TextFieldExtractor {
    /// Table where each label is bounded by every label that follows it.
    pub fn standard() -> Self {
        let rules = labels::ORDERED
            .iter()
            .copied()
            .enumerate()
            .map(|(index, label)| FieldRule {
                field: label,
                label,
                stop_labels: &labels::ORDERED[index + 1..],
            })
            .collect();
        Self { rules }
    }

    pub fn with_rules(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Extract every field whose label is present. Empty captures are kept.
    pub fn extract(&self, text: &str) -> ClientRecord {
        let mut record = ClientRecord::default();
        for rule in &self.rules {
            if let Some(value) = capture(text, rule) {
                record.insert(rule.field, value);
            }
        }
        record
    }
}

/// Capture from `label:` up to the first stop label, end of line, or end of text.
fn capture<'t>(text: &'t str, rule: &FieldRule) -> Option<&'t str> {
    let marker = format!("{}:", rule.label);
    let start = text.find(&marker)? + marker.len();
    let rest = &text[start..];
    let line = rest.split('\n').next().unwrap_or(rest);

    let end = rule
        .stop_labels
        .iter()
        .filter_map(|stop| line.find(&format!("{stop}:")))
        .min()
        .unwrap_or(line.len());

    Some(line[..end].trim())
}

/// Value on the same line after `label:`.
fn line_after<'t>(text: &'t str, label: &str) -> Option<&'t str> {
    let marker = format!("{label}:");
    let start = text.find(&marker)? + marker.len();
    let rest = &text[start..];
    let line = rest.split('\n').next().unwrap_or(rest);
    Some(line.trim())
}

/// Derives property-evaluation inputs independently of [`TextFieldExtractor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyIntakeDeriver;

impl PropertyIntakeDeriver {
    pub fn derive(&self, text: &str) -> PropertyIntake {
        let location = match line_after(text, labels::ADDRESS) {
            Some(address) if address.contains(SECONDARY_LOCATION) => SECONDARY_LOCATION,
            _ => DEFAULT_LOCATION,
        };

        let description = line_after(text, labels::PROPERTY_DESCRIPTION)
            .unwrap_or_default()
            .to_string();

        let lowered = description.to_lowercase();
        let property_type = if HOUSE_KEYWORDS.iter().any(|word| lowered.contains(word)) {
            PropertyType::House
        } else {
            PropertyType::Apartment
        };

        let size_sqm = SIZE_PATTERN
            .captures(&description)
            .and_then(|captures| captures[1].parse::<f64>().ok())
            .unwrap_or(DEFAULT_SIZE_SQM);

        PropertyIntake {
            location: location.to_string(),
            property_type,
            size_sqm,
            description,
        }
    }
}

/// Requested loan amount in euros; `0.0` means unspecified.
pub fn requested_loan_amount(text: &str) -> f64 {
    LOAN_AMOUNT_PATTERN
        .captures(text)
        .and_then(|captures| captures[1].parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Client identifier from the `Email:` field, or a timestamped fallback.
pub fn client_id_for(text: &str) -> ClientId {
    match EMAIL_PATTERN.captures(text) {
        Some(captures) => ClientId(captures[1].to_string()),
        None => ClientId(format!("client_{}", Utc::now().timestamp_millis())),
    }
}
