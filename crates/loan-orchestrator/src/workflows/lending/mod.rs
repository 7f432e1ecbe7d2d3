//! Loan application orchestration.
//!
//! A free-text application is valued, gated on property compliance, extracted into a
//! client record, and scored for approval. The four scoring services sit behind the
//! traits in [`gateways`]; [`scoring`] provides in-process reference implementations and
//! the HTTP adapters reach remote deployments of the same contracts.

pub mod domain;
pub mod gateways;
pub mod intake;
pub mod memory;
pub mod reports;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ClientId, ClientRecord, CreditInspection, EvaluationResult, FinancialRecord, PropertyIntake,
    PropertyType, Solvency,
};
pub use gateways::{
    ApprovalGateway, ApprovalRequest, ExtractionGateway, GatewayError, GatewayKind,
    PropertyValuationGateway, ScoringGateways, SolvencyGateway, SolvencyRequest,
};
pub use intake::{client_id_for, PropertyIntakeDeriver, TextFieldExtractor};
pub use memory::{
    FixedFinancialHistory, InMemoryClientRecordStore, InMemoryFinancialRecordStore,
    SeededFinancialHistory,
};
pub use repository::{
    ClientRecordStore, FinancialHistorySource, FinancialRecordStore, RepositoryError,
};
pub use router::{loan_router, scoring_router};
pub use scoring::reference_gateways;
pub use service::{LoanOrchestrator, OrchestrationError};
