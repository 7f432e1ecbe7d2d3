use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ClientId, PropertyIntake};
use super::gateways::{
    paths, ApprovalRequest, ExtractionRequest, GatewayError, RpcReply, ScoringGateways,
    SolvencyRequest,
};
use super::intake::client_id_for;
use super::repository::{ClientRecordStore, FinancialRecordStore};
use super::service::{LoanOrchestrator, OrchestrationError};

#[derive(Debug, Deserialize)]
pub struct ProcessPayload {
    #[serde(default)]
    pub content: Option<String>,
}

/// Router builder exposing application processing and credit checks.
pub fn loan_router<C, F>(orchestrator: Arc<LoanOrchestrator<C, F>>) -> Router
where
    C: ClientRecordStore + 'static,
    F: FinancialRecordStore + 'static,
{
    Router::new()
        .route("/", get(home_handler))
        .route("/process", post(process_handler::<C, F>))
        .route("/credit-check/:client_id", get(credit_check_handler::<C, F>))
        .with_state(orchestrator)
}

async fn home_handler() -> &'static str {
    "Service is running"
}

pub(crate) async fn process_handler<C, F>(
    State(orchestrator): State<Arc<LoanOrchestrator<C, F>>>,
    Json(payload): Json<ProcessPayload>,
) -> Response
where
    C: ClientRecordStore + 'static,
    F: FinancialRecordStore + 'static,
{
    let Some(content) = payload.content.filter(|content| !content.trim().is_empty()) else {
        let payload = json!({
            "status": "error",
            "message": "Aucun contenu fourni",
        });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    };

    let client_id = client_id_for(&content);
    match orchestrator.process(&client_id, &content).await {
        Ok(result) => {
            let payload = json!({
                "status": "success",
                "client_id": client_id.0,
                "client_data": result.client_data,
                "property_evaluation": result.property_evaluation,
                "approval_decision": result.approval_decision,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(OrchestrationError::NonCompliantProperty { evaluation, .. }) => {
            let payload = json!({
                "status": "error",
                "message": "Demande non valide",
                "evaluation": evaluation,
            });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn credit_check_handler<C, F>(
    State(orchestrator): State<Arc<LoanOrchestrator<C, F>>>,
    Path(client_id): Path<String>,
) -> Response
where
    C: ClientRecordStore + 'static,
    F: FinancialRecordStore + 'static,
{
    let client_id = ClientId(client_id);
    match orchestrator.inspect(&client_id).await {
        Ok(inspection) => {
            let payload = json!({
                "status": "success",
                "client_id": client_id.0,
                "solvency": inspection.solvency,
                "client_data": inspection.client_data,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

fn error_response(err: OrchestrationError) -> Response {
    let payload = json!({
        "status": "error",
        "message": err.to_string(),
    });
    (err.status_code(), Json(payload)).into_response()
}

/// Router hosting the reference scoring services behind the RPC paths the HTTP gateways call.
pub fn scoring_router(gateways: ScoringGateways) -> Router {
    Router::new()
        .route(paths::EXTRACTION, post(extraction_rpc))
        .route(paths::SOLVENCY, post(solvency_rpc))
        .route(paths::PROPERTY, post(property_rpc))
        .route(paths::APPROVAL, post(approval_rpc))
        .with_state(gateways)
}

async fn extraction_rpc(
    State(gateways): State<ScoringGateways>,
    Json(request): Json<ExtractionRequest>,
) -> Response {
    rpc_reply(gateways.extraction.extract(&request.text).await)
}

async fn solvency_rpc(
    State(gateways): State<ScoringGateways>,
    Json(request): Json<SolvencyRequest>,
) -> Response {
    rpc_reply(gateways.solvency.check_solvency(request).await)
}

async fn property_rpc(
    State(gateways): State<ScoringGateways>,
    Json(intake): Json<PropertyIntake>,
) -> Response {
    rpc_reply(gateways.property.valuate_property(&intake).await)
}

async fn approval_rpc(
    State(gateways): State<ScoringGateways>,
    Json(request): Json<ApprovalRequest>,
) -> Response {
    rpc_reply(gateways.approval.decide_approval(request).await)
}

fn rpc_reply(outcome: Result<String, GatewayError>) -> Response {
    match outcome {
        Ok(result) => (StatusCode::OK, Json(RpcReply { result })).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
