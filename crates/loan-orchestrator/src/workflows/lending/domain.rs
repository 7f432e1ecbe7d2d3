use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Labels recognised in free-text applications, in the order they bound each other.
pub mod labels {
    pub const CLIENT_NAME: &str = "Nom du Client";
    pub const ADDRESS: &str = "Adresse";
    pub const EMAIL: &str = "Email";
    pub const PHONE: &str = "Numéro de Téléphone";
    pub const LOAN_AMOUNT: &str = "Montant du Prêt Demandé";
    pub const LOAN_TERM: &str = "Durée du Prêt";
    pub const PROPERTY_DESCRIPTION: &str = "Description de la Propriété";
    pub const MONTHLY_INCOME: &str = "Revenu Mensuel";
    pub const MONTHLY_EXPENSES: &str = "Dépenses Mensuelles";

    pub(crate) static ORDERED: [&str; 9] = [
        CLIENT_NAME,
        ADDRESS,
        EMAIL,
        PHONE,
        LOAN_AMOUNT,
        LOAN_TERM,
        PROPERTY_DESCRIPTION,
        MONTHLY_INCOME,
        MONTHLY_EXPENSES,
    ];
}

/// Identifier wrapper for loan applicants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub String);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Structured fields extracted from an application, keyed by label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientRecord(pub BTreeMap<String, String>);

impl ClientRecord {
    pub fn field(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.0.insert(label.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Monthly income in whole euros; `0` when absent or unparsable.
    pub fn monthly_income(&self) -> u64 {
        self.amount(labels::MONTHLY_INCOME)
    }

    /// Monthly expenses in whole euros; `0` when absent or unparsable.
    pub fn monthly_expenses(&self) -> u64 {
        self.amount(labels::MONTHLY_EXPENSES)
    }

    fn amount(&self, label: &str) -> u64 {
        let Some(raw) = self.field(label) else {
            return 0;
        };

        parse_euro_amount(raw).unwrap_or_else(|| {
            warn!(field = label, value = raw, "unparsable amount, reading as 0");
            0
        })
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ClientRecord {
    fn from(fields: [(&str, &str); N]) -> Self {
        Self(
            fields
                .into_iter()
                .map(|(label, value)| (label.to_string(), value.to_string()))
                .collect(),
        )
    }
}

/// Parse values such as `"4000 EUR"` into whole euros.
pub fn parse_euro_amount(raw: &str) -> Option<u64> {
    raw.replace("EUR", "").trim().parse::<u64>().ok()
}

/// Synthetic credit history kept per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub outstanding_debt: u64,
    pub late_payments: u32,
    pub has_bankruptcy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
}

impl PropertyType {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::House => "house",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Property-evaluation inputs derived from the raw text; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyIntake {
    pub location: String,
    pub property_type: PropertyType,
    pub size_sqm: f64,
    pub description: String,
}

/// Binary outcome of the solvency service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Solvency {
    #[serde(rename = "solvent")]
    Solvent,
    #[serde(rename = "not solvent")]
    NotSolvent,
}

/// Proxy credit score forwarded to the approval service for solvent clients.
pub const SOLVENT_CREDIT_PROXY: f64 = 750.0;
/// Proxy credit score forwarded to the approval service otherwise.
pub const INSOLVENT_CREDIT_PROXY: f64 = 650.0;

impl Solvency {
    pub fn label(self) -> &'static str {
        match self {
            Solvency::Solvent => "solvent",
            Solvency::NotSolvent => "not solvent",
        }
    }

    pub fn credit_proxy_score(self) -> f64 {
        match self {
            Solvency::Solvent => SOLVENT_CREDIT_PROXY,
            Solvency::NotSolvent => INSOLVENT_CREDIT_PROXY,
        }
    }
}

impl fmt::Display for Solvency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Composite output of one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub client_data: ClientRecord,
    pub property_evaluation: String,
    pub approval_decision: String,
}

/// Read-side view returned by `inspect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditInspection {
    pub solvency: Solvency,
    pub client_data: ClientRecord,
}
