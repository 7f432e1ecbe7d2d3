//! Narrow client interfaces to the four scoring services.
//!
//! Each trait exposes one capability and returns the service's raw reply; interpreting
//! the reply belongs to the orchestrator (see `reports`).

mod http;

pub use http::{
    paths, ExtractionRequest, HttpApprovalGateway, HttpExtractionGateway, HttpPropertyGateway,
    HttpSolvencyGateway, RpcReply,
};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::PropertyIntake;
use super::scoring::reference_gateways;
use crate::config::{GatewayConfig, GatewayMode};

/// Named arguments of the solvency `credit_check` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvencyRequest {
    pub monthly_income: u64,
    pub monthly_expenses: u64,
    pub outstanding_debt: u64,
    pub late_payments: u32,
    pub has_bankruptcy: bool,
}

/// Named arguments of the approval `evaluate_loan_application` operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub credit_score: f64,
    pub property_value: f64,
    pub loan_amount: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub stable_employment_years: i32,
    pub late_payments: u32,
    pub has_bankruptcy: bool,
    pub property_valuation: f64,
}

#[async_trait]
pub trait ExtractionGateway: Send + Sync {
    /// JSON-encoded field map for `text`.
    async fn extract(&self, text: &str) -> Result<String, GatewayError>;
}

#[async_trait]
pub trait SolvencyGateway: Send + Sync {
    /// `"solvent"` or `"not solvent"`.
    async fn check_solvency(&self, request: SolvencyRequest) -> Result<String, GatewayError>;
}

#[async_trait]
pub trait PropertyValuationGateway: Send + Sync {
    async fn valuate_property(&self, intake: &PropertyIntake) -> Result<String, GatewayError>;
}

#[async_trait]
pub trait ApprovalGateway: Send + Sync {
    async fn decide_approval(&self, request: ApprovalRequest) -> Result<String, GatewayError>;
}

/// The four collaborators the orchestrator talks to.
#[derive(Clone)]
pub struct ScoringGateways {
    pub extraction: Arc<dyn ExtractionGateway>,
    pub solvency: Arc<dyn SolvencyGateway>,
    pub property: Arc<dyn PropertyValuationGateway>,
    pub approval: Arc<dyn ApprovalGateway>,
}

impl ScoringGateways {
    /// In-process reference services, or HTTP clients pointed at the configured URLs.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        match config.mode {
            GatewayMode::Local => Ok(reference_gateways()),
            GatewayMode::Remote => Ok(Self {
                extraction: Arc::new(HttpExtractionGateway::new(
                    config.extraction_url.clone(),
                    config.timeout,
                )?),
                solvency: Arc::new(HttpSolvencyGateway::new(
                    config.solvency_url.clone(),
                    config.timeout,
                )?),
                property: Arc::new(HttpPropertyGateway::new(
                    config.property_url.clone(),
                    config.timeout,
                )?),
                approval: Arc::new(HttpApprovalGateway::new(
                    config.approval_url.clone(),
                    config.timeout,
                )?),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayKind {
    Extraction,
    Solvency,
    PropertyValuation,
    Approval,
}

impl GatewayKind {
    pub fn label(self) -> &'static str {
        match self {
            GatewayKind::Extraction => "extraction",
            GatewayKind::Solvency => "solvency",
            GatewayKind::PropertyValuation => "property valuation",
            GatewayKind::Approval => "approval",
        }
    }
}

impl fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure reaching or talking to a scoring service.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    #[error("service answered with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("reply envelope could not be decoded: {0}")]
    Malformed(String),
}
