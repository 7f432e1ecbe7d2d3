use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use tracing::{error, info, warn};

use super::domain::{
    ClientId, ClientRecord, CreditInspection, EvaluationResult, FinancialRecord, Solvency,
};
use super::gateways::{
    ApprovalRequest, GatewayError, GatewayKind, ScoringGateways, SolvencyRequest,
};
use super::intake::{requested_loan_amount, PropertyIntakeDeriver, STABLE_EMPLOYMENT_YEARS};
use super::reports::{self, PropertyReport};
use super::repository::{ClientRecordStore, FinancialRecordStore, RepositoryError};

/// Default bound on a single gateway round-trip.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Coordinates the scoring services and the per-client stores for one application at a time.
pub struct LoanOrchestrator<C, F> {
    gateways: ScoringGateways,
    clients: Arc<C>,
    financials: Arc<F>,
    intake: PropertyIntakeDeriver,
    call_timeout: Duration,
}

impl<C, F> LoanOrchestrator<C, F>
where
    C: ClientRecordStore + 'static,
    F: FinancialRecordStore + 'static,
{
    pub fn new(gateways: ScoringGateways, clients: Arc<C>, financials: Arc<F>) -> Self {
        Self {
            gateways,
            clients,
            financials,
            intake: PropertyIntakeDeriver,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn clients(&self) -> &Arc<C> {
        &self.clients
    }

    pub fn financials(&self) -> &Arc<F> {
        &self.financials
    }

    /// Run one application through valuation, the compliance gate, extraction, and approval.
    pub async fn process(
        &self,
        client_id: &ClientId,
        text: &str,
    ) -> Result<EvaluationResult, OrchestrationError> {
        let intake = self.intake.derive(text);
        let property_evaluation = self
            .call(
                GatewayKind::PropertyValuation,
                self.gateways.property.valuate_property(&intake),
            )
            .await?;

        let property_value = match reports::parse_property_report(&property_evaluation)
            .map_err(|err| malformed(GatewayKind::PropertyValuation, err))?
        {
            PropertyReport::NonCompliant { reason } => {
                warn!(%client_id, %reason, "property failed the compliance gate");
                return Err(OrchestrationError::NonCompliantProperty {
                    reason,
                    evaluation: property_evaluation,
                });
            }
            PropertyReport::Valued { estimated_value } => estimated_value,
        };

        let extracted = self
            .call(GatewayKind::Extraction, self.gateways.extraction.extract(text))
            .await?;
        let client_data = decode_client_record(&extracted)?;
        let financial = self.financials.ensure(client_id)?;

        // The client record is stored only once the approval reply is accepted.
        let monthly_income = client_data.monthly_income();
        let monthly_expenses = client_data.monthly_expenses();
        let solvency = self
            .check_solvency(monthly_income, monthly_expenses, financial)
            .await?;

        let loan_amount = requested_loan_amount(text);
        if loan_amount == 0.0 {
            warn!(%client_id, "requested loan amount not found, forwarding 0");
        }

        let request = ApprovalRequest {
            credit_score: solvency.credit_proxy_score(),
            property_value,
            loan_amount,
            monthly_income: monthly_income as f64,
            monthly_expenses: monthly_expenses as f64,
            stable_employment_years: STABLE_EMPLOYMENT_YEARS,
            late_payments: financial.late_payments,
            has_bankruptcy: financial.has_bankruptcy,
            property_valuation: property_value,
        };
        let approval_decision = self
            .call(
                GatewayKind::Approval,
                self.gateways.approval.decide_approval(request),
            )
            .await?;
        let verdict = reports::parse_decision(&approval_decision)
            .map_err(|err| malformed(GatewayKind::Approval, err))?;

        self.clients.add(client_id, client_data.clone())?;
        info!(%client_id, ?verdict, %solvency, property_value, "application evaluated");

        Ok(EvaluationResult {
            client_data,
            property_evaluation,
            approval_decision,
        })
    }

    /// Stored application data for `client_id` with a freshly computed solvency verdict.
    pub async fn inspect(
        &self,
        client_id: &ClientId,
    ) -> Result<CreditInspection, OrchestrationError> {
        let client_data = self.clients.get(client_id)?;
        let financial = self.financials.ensure(client_id)?;

        let solvency = self
            .check_solvency(
                client_data.monthly_income(),
                client_data.monthly_expenses(),
                financial,
            )
            .await?;

        info!(%client_id, %solvency, "credit inspection served");
        Ok(CreditInspection {
            solvency,
            client_data,
        })
    }

    async fn check_solvency(
        &self,
        monthly_income: u64,
        monthly_expenses: u64,
        financial: FinancialRecord,
    ) -> Result<Solvency, OrchestrationError> {
        let request = SolvencyRequest {
            monthly_income,
            monthly_expenses,
            outstanding_debt: financial.outstanding_debt,
            late_payments: financial.late_payments,
            has_bankruptcy: financial.has_bankruptcy,
        };
        let reply = self
            .call(
                GatewayKind::Solvency,
                self.gateways.solvency.check_solvency(request),
            )
            .await?;
        reports::parse_solvency(&reply).map_err(|err| malformed(GatewayKind::Solvency, err))
    }

    async fn call<Fut>(
        &self,
        gateway: GatewayKind,
        call: Fut,
    ) -> Result<String, OrchestrationError>
    where
        Fut: Future<Output = Result<String, GatewayError>>,
    {
        let outcome = match tokio::time::timeout(self.call_timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(GatewayError::Timeout(self.call_timeout)),
        };

        outcome.map_err(|source| match source {
            GatewayError::Malformed(detail) => {
                error!(%gateway, %detail, "gateway reply could not be decoded");
                OrchestrationError::MalformedResponse { gateway, detail }
            }
            source => {
                error!(%gateway, error = %source, "gateway call failed");
                OrchestrationError::UpstreamService { gateway, source }
            }
        })
    }
}

fn malformed(gateway: GatewayKind, detail: impl ToString) -> OrchestrationError {
    let detail = detail.to_string();
    error!(%gateway, %detail, "gateway reply has an unexpected format");
    OrchestrationError::MalformedResponse { gateway, detail }
}

fn decode_client_record(reply: &str) -> Result<ClientRecord, OrchestrationError> {
    serde_json::from_str::<BTreeMap<String, String>>(reply)
        .map(ClientRecord)
        .map_err(|err| {
            malformed(
                GatewayKind::Extraction,
                format!("expected a JSON object of strings: {err}"),
            )
        })
}

/// Error raised by the loan orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error("property is not compliant: {reason}")]
    NonCompliantProperty { reason: String, evaluation: String },
    #[error("no client found with id {0}")]
    NotFound(ClientId),
    #[error("{gateway} service failed: {source}")]
    UpstreamService {
        gateway: GatewayKind,
        #[source]
        source: GatewayError,
    },
    #[error("{gateway} service returned an unexpected reply: {detail}")]
    MalformedResponse { gateway: GatewayKind, detail: String },
    #[error(transparent)]
    Repository(RepositoryError),
}

impl OrchestrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrchestrationError::NonCompliantProperty { .. } => StatusCode::BAD_REQUEST,
            OrchestrationError::NotFound(_) => StatusCode::NOT_FOUND,
            OrchestrationError::UpstreamService { .. }
            | OrchestrationError::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
            OrchestrationError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for OrchestrationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => OrchestrationError::NotFound(id),
            other => OrchestrationError::Repository(other),
        }
    }
}
