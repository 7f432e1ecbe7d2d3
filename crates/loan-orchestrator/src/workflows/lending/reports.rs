//! Textual contracts shared with the scoring services.
//!
//! The valuation and approval services answer with formatted French reports. The
//! orchestrator reads numbers back out of them, so the markers below are part of the wire
//! contract and must not drift.

use std::sync::LazyLock;

use regex::Regex;

use super::domain::Solvency;

pub const NON_COMPLIANT_PREFIX: &str = "NON CONFORME:";
pub const ESTIMATED_VALUE_MARKER: &str = "Valeur Estimée:";
pub const DECISION_PREFIX: &str = "DÉCISION:";
pub const APPROVED_DECISION: &str = "DÉCISION: APPROUVÉ";
pub const REFUSED_DECISION: &str = "DÉCISION: REFUSÉ";

static ESTIMATED_VALUE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Valeur Estimée: ([\d,]+\.?\d*)").expect("static regex should not panic")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("valuation report has no parseable 'Valeur Estimée:' amount")]
    MissingEstimatedValue,
    #[error("unrecognised solvency verdict '{0}'")]
    UnknownSolvency(String),
    #[error("approval reply does not start with 'DÉCISION:': '{0}'")]
    MissingDecision(String),
}

/// Interpretation of a property valuation reply.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyReport {
    NonCompliant { reason: String },
    Valued { estimated_value: f64 },
}

pub fn parse_property_report(report: &str) -> Result<PropertyReport, ReportError> {
    let trimmed = report.trim_start();
    if let Some(reason) = trimmed.strip_prefix(NON_COMPLIANT_PREFIX) {
        return Ok(PropertyReport::NonCompliant {
            reason: reason.trim().to_string(),
        });
    }

    parse_estimated_value(report)
        .map(|estimated_value| PropertyReport::Valued { estimated_value })
        .ok_or(ReportError::MissingEstimatedValue)
}

/// Amount following `Valeur Estimée:`, ignoring thousands separators.
pub fn parse_estimated_value(report: &str) -> Option<f64> {
    let captures = ESTIMATED_VALUE_PATTERN.captures(report)?;
    captures[1].replace(',', "").parse::<f64>().ok()
}

pub fn parse_solvency(reply: &str) -> Result<Solvency, ReportError> {
    match reply.trim() {
        "solvent" => Ok(Solvency::Solvent),
        "not solvent" => Ok(Solvency::NotSolvent),
        other => Err(ReportError::UnknownSolvency(other.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionVerdict {
    Approved,
    Refused,
    Other,
}

/// Check the approval reply carries a decision header and classify it.
pub fn parse_decision(reply: &str) -> Result<DecisionVerdict, ReportError> {
    let trimmed = reply.trim_start();
    if trimmed.starts_with(APPROVED_DECISION) {
        Ok(DecisionVerdict::Approved)
    } else if trimmed.starts_with(REFUSED_DECISION) {
        Ok(DecisionVerdict::Refused)
    } else if trimmed.starts_with(DECISION_PREFIX) {
        Ok(DecisionVerdict::Other)
    } else {
        let excerpt: String = trimmed.chars().take(60).collect();
        Err(ReportError::MissingDecision(excerpt))
    }
}

/// Two decimals with `,` thousands separators, e.g. `220,000.00`.
pub fn format_euros(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

/// Ratio rendered as a percentage with one decimal, e.g. `0.034` -> `3.4%`.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}
