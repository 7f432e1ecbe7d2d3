use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::lending::domain::{FinancialRecord, PropertyIntake};
use crate::workflows::lending::gateways::{
    ApprovalGateway, ApprovalRequest, ExtractionGateway, GatewayError, GatewayKind,
    PropertyValuationGateway, ScoringGateways, SolvencyGateway, SolvencyRequest,
};
use crate::workflows::lending::intake::TextFieldExtractor;
use crate::workflows::lending::memory::{
    FixedFinancialHistory, InMemoryClientRecordStore, InMemoryFinancialRecordStore,
};
use crate::workflows::lending::service::LoanOrchestrator;

pub(super) const APPLICATION: &str = "Adresse: 12 Rue de Lyon\n\
Description de la Propriété: appartement rénové 60 m²\n\
Revenu Mensuel: 4000 EUR\n\
Dépenses Mensuelles: 1000 EUR\n\
Montant du Prêt Demandé: 150000 EUR\n\
Email: a@b.com";

pub(super) const COMPLIANT_REPORT: &str = "EVALUATION DÉTAILLÉE:\n\
Valeur Estimée: 200000.00 EUR\n\
Analyse du Marché: 200000.00 EUR\n\
État du Bien: État moyen\n\
Conformité Légale: Conforme\n\
Remarques: État général satisfaisant";

pub(super) const APPROVED_REPLY: &str = "DÉCISION: APPROUVÉ\nScore de Risque: 85.0/100";

pub(super) const STALL: Duration = Duration::from_secs(30);

pub(super) fn financial_history() -> FinancialRecord {
    FinancialRecord {
        outstanding_debt: 1_002,
        late_payments: 1,
        has_bankruptcy: false,
    }
}

/// Arguments seen by the stub gateways, in call order.
#[derive(Debug, Default, Clone)]
pub(super) struct CallLog {
    pub(super) extraction: Vec<String>,
    pub(super) solvency: Vec<SolvencyRequest>,
    pub(super) property: Vec<PropertyIntake>,
    pub(super) approval: Vec<ApprovalRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Fault {
    Unreachable,
    Stall,
}

/// Scripted stand-in for all four scoring services.
pub(super) struct StubScoring {
    property_reply: String,
    extraction_reply: Option<String>,
    solvency_reply: String,
    approval_reply: String,
    fault: Option<(GatewayKind, Fault)>,
    log: Mutex<CallLog>,
}

impl Default for StubScoring {
    fn default() -> Self {
        Self {
            property_reply: COMPLIANT_REPORT.to_string(),
            extraction_reply: None,
            solvency_reply: "solvent".to_string(),
            approval_reply: APPROVED_REPLY.to_string(),
            fault: None,
            log: Mutex::new(CallLog::default()),
        }
    }
}

impl StubScoring {
    pub(super) fn with_property_reply(mut self, reply: &str) -> Self {
        self.property_reply = reply.to_string();
        self
    }

    pub(super) fn with_extraction_reply(mut self, reply: &str) -> Self {
        self.extraction_reply = Some(reply.to_string());
        self
    }

    pub(super) fn with_solvency_reply(mut self, reply: &str) -> Self {
        self.solvency_reply = reply.to_string();
        self
    }

    pub(super) fn with_approval_reply(mut self, reply: &str) -> Self {
        self.approval_reply = reply.to_string();
        self
    }

    pub(super) fn with_fault(mut self, gateway: GatewayKind, fault: Fault) -> Self {
        self.fault = Some((gateway, fault));
        self
    }

    pub(super) fn log(&self) -> CallLog {
        self.log.lock().expect("call log mutex poisoned").clone()
    }

    pub(super) fn into_gateways(self) -> (ScoringGateways, Arc<StubScoring>) {
        let stub = Arc::new(self);
        let gateways = ScoringGateways {
            extraction: stub.clone(),
            solvency: stub.clone(),
            property: stub.clone(),
            approval: stub.clone(),
        };
        (gateways, stub)
    }

    async fn reply(&self, gateway: GatewayKind, reply: String) -> Result<String, GatewayError> {
        match self.fault {
            Some((kind, Fault::Unreachable)) if kind == gateway => Err(GatewayError::Transport(
                "connection refused".to_string(),
            )),
            Some((kind, Fault::Stall)) if kind == gateway => {
                tokio::time::sleep(STALL).await;
                Ok(reply)
            }
            _ => Ok(reply),
        }
    }
}

#[async_trait]
impl ExtractionGateway for StubScoring {
    async fn extract(&self, text: &str) -> Result<String, GatewayError> {
        self.log
            .lock()
            .expect("call log mutex poisoned")
            .extraction
            .push(text.to_string());
        let reply = match &self.extraction_reply {
            Some(reply) => reply.clone(),
            None => serde_json::to_string(&TextFieldExtractor::standard().extract(text))
                .expect("record serializes"),
        };
        self.reply(GatewayKind::Extraction, reply).await
    }
}

#[async_trait]
impl SolvencyGateway for StubScoring {
    async fn check_solvency(&self, request: SolvencyRequest) -> Result<String, GatewayError> {
        self.log
            .lock()
            .expect("call log mutex poisoned")
            .solvency
            .push(request);
        self.reply(GatewayKind::Solvency, self.solvency_reply.clone())
            .await
    }
}

#[async_trait]
impl PropertyValuationGateway for StubScoring {
    async fn valuate_property(&self, intake: &PropertyIntake) -> Result<String, GatewayError> {
        self.log
            .lock()
            .expect("call log mutex poisoned")
            .property
            .push(intake.clone());
        self.reply(GatewayKind::PropertyValuation, self.property_reply.clone())
            .await
    }
}

#[async_trait]
impl ApprovalGateway for StubScoring {
    async fn decide_approval(&self, request: ApprovalRequest) -> Result<String, GatewayError> {
        self.log
            .lock()
            .expect("call log mutex poisoned")
            .approval
            .push(request);
        self.reply(GatewayKind::Approval, self.approval_reply.clone())
            .await
    }
}

pub(super) type MemoryOrchestrator =
    LoanOrchestrator<InMemoryClientRecordStore, InMemoryFinancialRecordStore>;

pub(super) fn build_orchestrator(gateways: ScoringGateways) -> MemoryOrchestrator {
    let clients = Arc::new(InMemoryClientRecordStore::new());
    let financials = Arc::new(InMemoryFinancialRecordStore::new(Arc::new(
        FixedFinancialHistory(financial_history()),
    )));
    LoanOrchestrator::new(gateways, clients, financials)
}

pub(super) fn build_stubbed(stub: StubScoring) -> (MemoryOrchestrator, Arc<StubScoring>) {
    let (gateways, stub) = stub.into_gateways();
    (build_orchestrator(gateways), stub)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
