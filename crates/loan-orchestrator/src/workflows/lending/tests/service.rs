use super::common::*;
use std::sync::Arc;
use std::time::Duration;

use crate::workflows::lending::domain::{labels, ClientId, PropertyType, Solvency};
use crate::workflows::lending::gateways::{GatewayError, GatewayKind};
use crate::workflows::lending::memory::{InMemoryFinancialRecordStore, SeededFinancialHistory};
use crate::workflows::lending::repository::{ClientRecordStore, FinancialRecordStore};
use crate::workflows::lending::service::OrchestrationError;

fn client() -> ClientId {
    ClientId::from("a@b.com")
}

#[tokio::test]
async fn process_returns_approval_verbatim_with_stored_amounts() {
    let (orchestrator, stub) = build_stubbed(StubScoring::default());

    let result = orchestrator
        .process(&client(), APPLICATION)
        .await
        .expect("application evaluates");

    assert!(result.approval_decision.starts_with("DÉCISION: APPROUVÉ"));
    assert_eq!(result.approval_decision, APPROVED_REPLY);
    assert_eq!(result.property_evaluation, COMPLIANT_REPORT);
    assert_eq!(
        result.client_data.field(labels::MONTHLY_INCOME),
        Some("4000 EUR")
    );

    let clients = orchestrator.clients();
    assert_eq!(clients.monthly_income(&client()).expect("stored"), 4000);
    assert_eq!(clients.monthly_expenses(&client()).expect("stored"), 1000);

    let log = stub.log();
    assert_eq!(log.property.len(), 1);
    assert_eq!(log.property[0].location, "Lyon");
    assert_eq!(log.property[0].property_type, PropertyType::Apartment);
    assert_eq!(log.property[0].size_sqm, 60.0);
    assert_eq!(log.extraction, vec![APPLICATION.to_string()]);

    let approval = log.approval.first().expect("approval called");
    assert_eq!(approval.property_value, 200_000.0);
    assert_eq!(approval.property_valuation, 200_000.0);
    assert_eq!(approval.loan_amount, 150_000.0);
    assert_eq!(approval.monthly_income, 4000.0);
    assert_eq!(approval.monthly_expenses, 1000.0);
    assert_eq!(approval.stable_employment_years, 3);
    assert_eq!(approval.late_payments, financial_history().late_payments);
    assert!(!approval.has_bankruptcy);
}

#[tokio::test]
async fn non_compliant_property_stops_before_extraction() {
    let report = "NON CONFORME: Situé dans une zone protégée (Marais)";
    let (orchestrator, stub) =
        build_stubbed(StubScoring::default().with_property_reply(report));

    match orchestrator.process(&client(), APPLICATION).await {
        Err(OrchestrationError::NonCompliantProperty { reason, evaluation }) => {
            assert_eq!(reason, "Situé dans une zone protégée (Marais)");
            assert_eq!(evaluation, report);
        }
        other => panic!("expected non-compliant property, got {other:?}"),
    }

    let log = stub.log();
    assert_eq!(log.property.len(), 1);
    assert!(log.extraction.is_empty());
    assert!(log.solvency.is_empty());
    assert!(log.approval.is_empty());
    assert!(orchestrator.clients().is_empty().expect("store readable"));
    assert!(orchestrator.financials().is_empty().expect("store readable"));
}

#[tokio::test]
async fn inspect_requires_a_processed_application() {
    let (orchestrator, stub) = build_stubbed(StubScoring::default());

    match orchestrator.inspect(&client()).await {
        Err(OrchestrationError::NotFound(id)) => assert_eq!(id, client()),
        other => panic!("expected not found, got {other:?}"),
    }
    assert!(stub.log().solvency.is_empty());

    orchestrator
        .process(&client(), APPLICATION)
        .await
        .expect("application evaluates");
    let inspection = orchestrator
        .inspect(&client())
        .await
        .expect("client now known");

    assert_eq!(inspection.solvency, Solvency::Solvent);
    assert_eq!(
        inspection.client_data.field(labels::MONTHLY_EXPENSES),
        Some("1000 EUR")
    );
    // one check during process, a fresh one for inspect
    let solvency_calls = stub.log().solvency;
    assert_eq!(solvency_calls.len(), 2);
    assert_eq!(solvency_calls[0], solvency_calls[1]);
    assert_eq!(solvency_calls[1].monthly_income, 4000);
    assert_eq!(
        solvency_calls[1].outstanding_debt,
        financial_history().outstanding_debt
    );
}

#[tokio::test]
async fn solvency_verdict_sets_credit_proxy() {
    for (verdict, expected) in [("solvent", 750.0), ("not solvent", 650.0)] {
        let (orchestrator, stub) =
            build_stubbed(StubScoring::default().with_solvency_reply(verdict));

        orchestrator
            .process(&client(), APPLICATION)
            .await
            .expect("application evaluates");

        let log = stub.log();
        assert_eq!(log.approval.len(), 1);
        assert_eq!(log.approval[0].credit_score, expected, "verdict {verdict}");
    }
}

#[tokio::test]
async fn missing_loan_amount_is_forwarded_as_zero() {
    let text = "Adresse: 3 rue Oberkampf, Paris\n\
                Description de la Propriété: appartement 45 m²\n\
                Revenu Mensuel: 3000 EUR\n\
                Email: z@y.fr";
    let (orchestrator, stub) = build_stubbed(StubScoring::default());

    orchestrator
        .process(&ClientId::from("z@y.fr"), text)
        .await
        .expect("application evaluates");

    let log = stub.log();
    assert_eq!(log.approval[0].loan_amount, 0.0);
    assert_eq!(log.approval[0].monthly_expenses, 0.0);
}

#[tokio::test]
async fn later_process_overwrites_client_record() {
    let (orchestrator, _stub) = build_stubbed(StubScoring::default());
    let raised = APPLICATION.replace("4000 EUR", "5200 EUR");

    orchestrator
        .process(&client(), APPLICATION)
        .await
        .expect("first evaluation");
    orchestrator
        .process(&client(), &raised)
        .await
        .expect("second evaluation");

    assert_eq!(orchestrator.clients().len().expect("store readable"), 1);
    assert_eq!(orchestrator.financials().len().expect("store readable"), 1);
    assert_eq!(
        orchestrator
            .clients()
            .monthly_income(&client())
            .expect("stored"),
        5200
    );
}

#[tokio::test]
async fn concurrent_clients_do_not_share_records() {
    let (orchestrator, _stub) = build_stubbed(StubScoring::default());
    let other_text = APPLICATION
        .replace("a@b.com", "c@d.com")
        .replace("4000 EUR", "6100 EUR");
    let first_id = client();
    let other = ClientId::from("c@d.com");

    let (first, second) = tokio::join!(
        orchestrator.process(&first_id, APPLICATION),
        orchestrator.process(&other, &other_text),
    );
    first.expect("first client evaluates");
    second.expect("second client evaluates");

    let clients = orchestrator.clients();
    assert_eq!(clients.monthly_income(&client()).expect("stored"), 4000);
    assert_eq!(clients.monthly_income(&other).expect("stored"), 6100);
}

#[tokio::test]
async fn unreachable_extraction_fails_without_side_effects() {
    let (orchestrator, stub) = build_stubbed(
        StubScoring::default().with_fault(GatewayKind::Extraction, Fault::Unreachable),
    );

    match orchestrator.process(&client(), APPLICATION).await {
        Err(OrchestrationError::UpstreamService {
            gateway: GatewayKind::Extraction,
            source: GatewayError::Transport(_),
        }) => {}
        other => panic!("expected upstream failure, got {other:?}"),
    }

    assert!(orchestrator.clients().is_empty().expect("store readable"));
    assert!(stub.log().approval.is_empty());
}

#[tokio::test]
async fn failures_after_extraction_leave_no_client_record() {
    for gateway in [GatewayKind::Solvency, GatewayKind::Approval] {
        let (orchestrator, stub) =
            build_stubbed(StubScoring::default().with_fault(gateway, Fault::Unreachable));

        match orchestrator.process(&client(), APPLICATION).await {
            Err(OrchestrationError::UpstreamService { gateway: failed, .. }) => {
                assert_eq!(failed, gateway)
            }
            other => panic!("expected {gateway} failure, got {other:?}"),
        }
        assert_eq!(stub.log().extraction.len(), 1);

        match orchestrator.inspect(&client()).await {
            Err(OrchestrationError::NotFound(id)) => assert_eq!(id, client()),
            other => panic!("expected not found after {gateway} failure, got {other:?}"),
        }
        assert!(orchestrator.clients().is_empty().expect("store readable"));
    }
}

#[tokio::test]
async fn stalled_gateway_times_out_as_upstream_failure() {
    let (gateways, _stub) = StubScoring::default()
        .with_fault(GatewayKind::Solvency, Fault::Stall)
        .into_gateways();
    let orchestrator = build_orchestrator(gateways).with_call_timeout(Duration::from_millis(50));

    match orchestrator.process(&client(), APPLICATION).await {
        Err(OrchestrationError::UpstreamService {
            gateway: GatewayKind::Solvency,
            source: GatewayError::Timeout(limit),
        }) => assert_eq!(limit, Duration::from_millis(50)),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn unexpected_reply_formats_are_malformed() {
    let cases = [
        (
            StubScoring::default().with_property_reply("EVALUATION DÉTAILLÉE:\nRemarques: -"),
            GatewayKind::PropertyValuation,
        ),
        (
            StubScoring::default().with_extraction_reply(r#"["Revenu Mensuel", 4000]"#),
            GatewayKind::Extraction,
        ),
        (
            StubScoring::default().with_solvency_reply("probably"),
            GatewayKind::Solvency,
        ),
        (
            StubScoring::default()
                .with_approval_reply("ERREUR: Impossible d'évaluer la demande de prêt"),
            GatewayKind::Approval,
        ),
    ];

    for (stub, expected) in cases {
        let (orchestrator, _stub) = build_stubbed(stub);
        match orchestrator.process(&client(), APPLICATION).await {
            Err(OrchestrationError::MalformedResponse { gateway, .. }) => {
                assert_eq!(gateway, expected)
            }
            other => panic!("expected malformed {expected} reply, got {other:?}"),
        }
        assert!(orchestrator.clients().is_empty().expect("store readable"));
    }
}

#[test]
fn ensure_materializes_history_once() {
    let store = InMemoryFinancialRecordStore::new(Arc::new(SeededFinancialHistory::new(11)));
    let id = client();

    let first = store.ensure(&id).expect("record created");
    let second = store.ensure(&id).expect("record reused");

    assert_eq!(first, second);
    assert_eq!(store.len().expect("store readable"), 1);
    assert_eq!(store.get(&id).expect("record stored"), first);
}
