use loan_orchestrator::config::AppConfig;
use loan_orchestrator::error::AppError;
use loan_orchestrator::workflows::lending::{
    InMemoryClientRecordStore, InMemoryFinancialRecordStore, LoanOrchestrator, ScoringGateways,
    SeededFinancialHistory,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type MemoryOrchestrator =
    LoanOrchestrator<InMemoryClientRecordStore, InMemoryFinancialRecordStore>;

/// Process-local stores wired to the configured scoring gateways.
pub(crate) fn build_orchestrator(config: &AppConfig) -> Result<MemoryOrchestrator, AppError> {
    let gateways = ScoringGateways::from_config(&config.gateways)?;
    Ok(orchestrator_with(
        gateways,
        config.financial.seed,
        config.gateways.timeout,
    ))
}

pub(crate) fn orchestrator_with(
    gateways: ScoringGateways,
    seed: Option<u64>,
    call_timeout: Duration,
) -> MemoryOrchestrator {
    let history = SeededFinancialHistory::from_config(seed);
    let clients = Arc::new(InMemoryClientRecordStore::new());
    let financials = Arc::new(InMemoryFinancialRecordStore::new(Arc::new(history)));

    LoanOrchestrator::new(gateways, clients, financials).with_call_timeout(call_timeout)
}
