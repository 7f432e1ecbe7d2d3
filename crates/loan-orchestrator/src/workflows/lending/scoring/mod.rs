//! In-process reference implementations of the four scoring services.
//!
//! They reproduce the textual contracts the orchestrator depends on and let the stack run
//! without any remote deployment. The arithmetic is illustrative, not underwriting advice.

mod decision;
mod extraction;
mod solvency;
mod valuation;

pub use decision::{ApprovalDecisionService, InstitutionPolicy, InterestRates};
pub use extraction::ExtractionService;
pub use solvency::{CreditCheckService, MIN_SOLVENT_SCORE};
pub use valuation::{LegalRules, MarketSegment, PropertyValuationService};

use std::sync::Arc;

use super::gateways::ScoringGateways;

/// Bundle the reference services behind the gateway traits.
pub fn reference_gateways() -> ScoringGateways {
    ScoringGateways {
        extraction: Arc::new(ExtractionService::default()),
        solvency: Arc::new(CreditCheckService),
        property: Arc::new(PropertyValuationService::default()),
        approval: Arc::new(ApprovalDecisionService::default()),
    }
}
