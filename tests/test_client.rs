//! Client orchestration against a scripted transport.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{client, client_with, Reply, StubTransport};
use finance_feasibility_sdk::models::{
    ConstructionLoanConfig, IdValue, ProjectIdInput, ScenarioListParams, ScenarioUpdate,
    SensitivityBand,
};
use finance_feasibility_sdk::transport::Method;
use finance_feasibility_sdk::{
    cancel_pair, AbortCause, ClientConfig, EndpointSet, FallbackPolicy, FeasibilityClient,
    FeasibilityError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn client_with_config(stub: &Arc<StubTransport>, config: ClientConfig) -> FeasibilityClient {
    FeasibilityClient::new(config, stub.clone())
}

// ---------------------------------------------------------------------------
// run_feasibility
// ---------------------------------------------------------------------------

#[tokio::test]
async fn live_response_is_mapped() {
    let stub = StubTransport::new(vec![Reply::ok(common::feasibility_response())]);
    let summary = client(&stub)
        .run_feasibility(&common::sample_request(), None)
        .await
        .unwrap();

    assert_eq!(summary.scenario_id, 101);
    assert_eq!(summary.capital_stack.unwrap().slices[0].category, "equity");

    let sent = stub.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, Method::Post);
    assert_eq!(sent[0].path, "/api/v1/finance/feasibility");
    assert_eq!(sent[0].body.as_ref().unwrap()["project_id"], json!(401));
}

#[tokio::test]
async fn network_failure_yields_offline_scenario() {
    let stub = StubTransport::new(vec![Reply::NetworkError("connection refused".into())]);
    let summary = client(&stub)
        .run_feasibility(&common::sample_request(), None)
        .await
        .unwrap();

    assert!(summary.scenario_id < 0);
    assert_eq!(summary.project_id, IdValue::Number(401));
    assert_eq!(summary.scenario_name, "Scheme A");
}

#[tokio::test]
async fn auth_rejection_yields_offline_scenario() {
    for reply in [
        Reply::Text(401, "unauthorized".into()),
        Reply::Text(403, String::new()),
        Reply::Text(404, "Project is restricted to its owner".into()),
    ] {
        let stub = StubTransport::new(vec![reply]);
        let summary = client(&stub)
            .run_feasibility(&common::sample_request(), None)
            .await
            .unwrap();
        assert!(!summary.is_persisted());
    }
}

#[tokio::test]
async fn server_error_on_feasibility_is_returned() {
    let stub = StubTransport::new(vec![Reply::Text(500, "boom".into())]);
    let err = client(&stub)
        .run_feasibility(&common::sample_request(), None)
        .await
        .unwrap_err();
    match err {
        FeasibilityError::Http { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn empty_error_body_gets_status_message() {
    let stub = StubTransport::new(vec![Reply::Text(422, "  ".into())]);
    let err = client(&stub)
        .run_feasibility(&common::sample_request(), None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "HTTP 422: request failed with status 422");
}

#[tokio::test]
async fn feasibility_timeout_is_returned_by_default() {
    let stub = StubTransport::new(vec![Reply::hang()]);
    let err = client_with(&stub, Duration::from_millis(30))
        .run_feasibility(&common::sample_request(), None)
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn feasibility_timeout_falls_back_when_policy_allows() {
    let stub = StubTransport::new(vec![Reply::hang()]);
    let mut config = ClientConfig {
        timeout: Duration::from_millis(30),
        ..ClientConfig::default()
    };
    config.capabilities.fallback_policy = FallbackPolicy {
        enabled: true,
        fallback_on_feasibility_timeout: true,
    };
    let summary = client_with_config(&stub, config)
        .run_feasibility(&common::sample_request(), None)
        .await
        .unwrap();
    assert!(summary.scenario_id < 0);
}

#[tokio::test]
async fn disabled_fallback_returns_network_errors() {
    let stub = StubTransport::new(vec![Reply::NetworkError("dns".into())]);
    let mut config = ClientConfig::default();
    config.capabilities.fallback_policy = FallbackPolicy::disabled();
    let err = client_with_config(&stub, config)
        .list_scenarios(&ScenarioListParams::for_project(777), None)
        .await
        .unwrap_err();
    assert!(matches!(err, FeasibilityError::Network(_)));
}

#[tokio::test]
async fn invalid_project_id_never_reaches_the_network() {
    let stub = StubTransport::new(vec![Reply::ok(common::feasibility_response())]);
    let mut request = common::sample_request();
    request.project_id = ProjectIdInput::Text("abc".into());

    let err = client(&stub).run_feasibility(&request, None).await.unwrap_err();
    assert!(matches!(err, FeasibilityError::Validation(_)));
    assert_eq!(stub.request_count(), 0);

    let params = ScenarioListParams {
        project_id: Some(ProjectIdInput::Text("abc".into())),
        ..ScenarioListParams::default()
    };
    let err = client(&stub).list_scenarios(&params, None).await.unwrap_err();
    assert!(matches!(err, FeasibilityError::Validation(_)));
    assert_eq!(stub.request_count(), 0);
}

#[tokio::test]
async fn malformed_success_body_is_an_error() {
    let stub = StubTransport::new(vec![Reply::Text(200, "<html>".into())]);
    let err = client(&stub)
        .run_feasibility(&common::sample_request(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, FeasibilityError::Json(_)));
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn caller_cancel_is_always_returned() {
    let stub = StubTransport::new(vec![Reply::hang()]);
    let client = client(&stub);
    let (handle, signal) = cancel_pair();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
    });
    let err = client
        .list_scenarios(&ScenarioListParams::for_project(777), Some(signal))
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, FeasibilityError::Aborted(AbortCause::Caller)));
}

#[tokio::test]
async fn caller_cancel_beats_an_expired_deadline() {
    let stub = StubTransport::new(vec![Reply::hang()]);
    let (handle, signal) = cancel_pair();
    handle.cancel();

    let err = client_with(&stub, Duration::from_millis(1))
        .list_scenarios(&ScenarioListParams::for_project(777), Some(signal))
        .await
        .unwrap_err();
    assert!(matches!(err, FeasibilityError::Aborted(AbortCause::Caller)));
}

// ---------------------------------------------------------------------------
// list_scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn offline_list_end_to_end() {
    let stub = StubTransport::new(vec![Reply::NetworkError("connection refused".into())]);
    let list = client(&stub)
        .list_scenarios(&ScenarioListParams::for_project(777), None)
        .await
        .unwrap();

    let ids: Vec<i64> = list.iter().map(|s| s.scenario_id).collect();
    assert_eq!(ids, vec![0, -1, -2]);
    for summary in &list {
        assert_eq!(summary.project_id, IdValue::Number(777));
        assert!(summary.capital_stack.is_some());
    }

    let sent = stub.requests();
    assert_eq!(sent[0].method, Method::Get);
    assert_eq!(sent[0].path, "/api/v1/finance/scenarios");
    assert_eq!(sent[0].query, vec![("project_id".to_string(), "777".to_string())]);
}

#[tokio::test]
async fn list_falls_back_on_server_error_and_timeout() {
    let stub = StubTransport::new(vec![Reply::Text(503, "unavailable".into())]);
    let list = client(&stub)
        .list_scenarios(&ScenarioListParams::for_project(777), None)
        .await
        .unwrap();
    assert_eq!(list.len(), 3);

    let stub = StubTransport::new(vec![Reply::hang()]);
    let list = client_with(&stub, Duration::from_millis(30))
        .list_scenarios(&ScenarioListParams::for_project(777), None)
        .await
        .unwrap();
    assert_eq!(list.len(), 3);
}

#[tokio::test]
async fn list_client_errors_are_returned() {
    let stub = StubTransport::new(vec![Reply::Text(400, "bad project".into())]);
    let err = client(&stub)
        .list_scenarios(&ScenarioListParams::for_project(777), None)
        .await
        .unwrap_err();
    assert!(matches!(err, FeasibilityError::Http { status: 400, .. }));
}

#[tokio::test]
async fn live_list_is_mapped() {
    let stub = StubTransport::new(vec![Reply::ok(json!([
        common::feasibility_response(),
        { "scenario_id": 102, "project_id": "401", "scenario_name": "Scheme B", "currency": "SGD" }
    ]))]);
    let params = ScenarioListParams {
        fin_project_id: Some(12),
        ..ScenarioListParams::for_project(401)
    };
    let list = client(&stub).list_scenarios(&params, None).await.unwrap();

    assert_eq!(list.len(), 2);
    assert!(list.iter().all(|s| s.is_persisted()));
    assert_eq!(list[1].project_id, IdValue::Number(401));
    assert_eq!(
        stub.requests()[0].query,
        vec![
            ("project_id".to_string(), "401".to_string()),
            ("fin_project_id".to_string(), "12".to_string()),
        ]
    );
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn batch_mixes_live_and_offline_results() {
    let stub = StubTransport::new(vec![
        Reply::ok(common::feasibility_response()),
        Reply::NetworkError("reset".into()),
    ]);
    let requests = vec![common::sample_request(), common::minimal_request()];
    let results = client(&stub)
        .run_feasibility_batch(&requests, None)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(stub.request_count(), 2);
    assert_eq!(results.iter().filter(|s| s.is_persisted()).count(), 1);
}

#[tokio::test]
async fn batch_fails_when_one_request_cannot_fall_back() {
    let stub = StubTransport::new(vec![Reply::ok(common::feasibility_response())]);
    let mut invalid = common::minimal_request();
    invalid.project_id = ProjectIdInput::Text("abc".into());
    let requests = vec![common::sample_request(), invalid];

    let outcome = client(&stub).run_feasibility_batch(&requests, None).await;
    assert!(matches!(outcome, Err(FeasibilityError::Validation(_))));

    let stub = StubTransport::new(vec![
        Reply::NetworkError("reset".into()),
        Reply::Text(422, "cash flows must not be empty".into()),
    ]);
    let requests = vec![common::sample_request(), common::minimal_request()];
    let outcome = client(&stub).run_feasibility_batch(&requests, None).await;
    match outcome {
        Err(FeasibilityError::Http { status, .. }) => assert_eq!(status, 422),
        other => panic!("expected the batch to fail, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Write paths
// ---------------------------------------------------------------------------

fn loan() -> ConstructionLoanConfig {
    ConstructionLoanConfig {
        interest_rate: "0.05".into(),
        periods_per_year: Some(12),
        capitalise_interest: true,
        facilities: Vec::new(),
    }
}

#[tokio::test]
async fn write_paths_never_fall_back() {
    let stub = StubTransport::new(vec![Reply::NetworkError("connection refused".into())]);
    let client = client(&stub);

    let err = client.update_construction_loan(101, &loan(), None).await.unwrap_err();
    assert!(matches!(err, FeasibilityError::Network(_)));

    let update = ScenarioUpdate {
        scenario_name: Some("Renamed".into()),
        ..ScenarioUpdate::default()
    };
    let err = client.update_scenario(101, &update, None).await.unwrap_err();
    assert!(matches!(err, FeasibilityError::Network(_)));

    let err = client.delete_scenario(101, None).await.unwrap_err();
    assert!(matches!(err, FeasibilityError::Network(_)));

    let bands = vec![SensitivityBand {
        parameter: "Rent".into(),
        low: Some("-5".into()),
        high: Some("5".into()),
        ..SensitivityBand::default()
    }];
    let err = client.rerun_sensitivity(101, &bands, None).await.unwrap_err();
    assert!(matches!(err, FeasibilityError::Network(_)));

    let stub = StubTransport::new(vec![Reply::Text(403, "forbidden".into())]);
    let err = common::client(&stub)
        .update_construction_loan(101, &loan(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, FeasibilityError::Http { status: 403, .. }));
}

#[tokio::test]
async fn construction_loan_update_is_patched() {
    let stub = StubTransport::new(vec![Reply::ok(common::full_response())]);
    let summary = client(&stub)
        .update_construction_loan(101, &loan(), None)
        .await
        .unwrap();
    assert!(summary.construction_loan_interest.is_some());

    let sent = &stub.requests()[0];
    assert_eq!(sent.method, Method::Patch);
    assert_eq!(sent.path, "/api/v1/finance/scenarios/101/construction-loan");
    assert_eq!(
        sent.body.as_ref().unwrap()["construction_loan"]["interest_rate"],
        "0.05"
    );
}

#[tokio::test]
async fn delete_sends_delete_and_accepts_empty_body() {
    let stub = StubTransport::new(vec![Reply::Bytes(204, Vec::new())]);
    client(&stub).delete_scenario(101, None).await.unwrap();
    let sent = &stub.requests()[0];
    assert_eq!(sent.method, Method::Delete);
    assert_eq!(sent.path, "/api/v1/finance/scenarios/101");
}

#[tokio::test]
async fn offline_ids_are_rejected_by_mutations() {
    let stub = StubTransport::new(vec![Reply::ok(json!({}))]);
    let client = client(&stub);

    for id in [0, -1, -1_735_689_600_000] {
        let err = client.delete_scenario(id, None).await.unwrap_err();
        assert!(matches!(err, FeasibilityError::Validation(_)));
    }
    let err = client.update_construction_loan(-2, &loan(), None).await.unwrap_err();
    assert!(matches!(err, FeasibilityError::Validation(_)));
    assert_eq!(stub.request_count(), 0);
}

#[tokio::test]
async fn disabled_endpoints_are_unsupported() {
    let stub = StubTransport::new(vec![Reply::ok(json!({}))]);
    let mut config = ClientConfig::default();
    config.capabilities.endpoints = EndpointSet {
        construction_loan: false,
        sensitivity: false,
        export: false,
    };
    let client = client_with_config(&stub, config);

    let err = client.update_construction_loan(101, &loan(), None).await.unwrap_err();
    assert!(matches!(err, FeasibilityError::Unsupported(_)));
    let err = client
        .rerun_sensitivity(101, &[SensitivityBand::default()], None)
        .await
        .unwrap_err();
    assert!(matches!(err, FeasibilityError::Unsupported(_)));
    let err = client.export_scenario(101, None).await.unwrap_err();
    assert!(matches!(err, FeasibilityError::Unsupported(_)));
    assert_eq!(stub.request_count(), 0);
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn export_is_written_atomically() {
    let csv = b"period,equity_draw,debt_draw\nM1,400.00,0.00\n".to_vec();
    let stub = StubTransport::new(vec![Reply::Bytes(200, csv.clone())]);
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("exports").join("scenario-101.csv");

    let written = client(&stub)
        .export_scenario_to(101, &dest, None)
        .await
        .unwrap();

    assert_eq!(written, dest);
    assert_eq!(std::fs::read(&dest).unwrap(), csv);
    let entries: Vec<_> = std::fs::read_dir(dest.parent().unwrap())
        .unwrap()
        .collect();
    assert_eq!(entries.len(), 1);

    let sent = &stub.requests()[0];
    assert_eq!(sent.path, "/api/v1/finance/export");
    assert_eq!(sent.query, vec![("scenario_id".to_string(), "101".to_string())]);
}

#[tokio::test]
async fn failed_export_leaves_no_file() {
    let stub = StubTransport::new(vec![Reply::Text(500, "export failed".into())]);
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("scenario-101.csv");

    let err = client(&stub)
        .export_scenario_to(101, &dest, None)
        .await
        .unwrap_err();
    assert!(err.is_server_error());
    assert!(!dest.exists());
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[tokio::test]
async fn builder_wires_custom_transport_and_policy() {
    let stub = StubTransport::new(vec![Reply::NetworkError("down".into())]);
    let client = FeasibilityClient::builder()
        .base_url("https://finance.example.com")
        .timeout(Duration::from_millis(500))
        .identity_header("X-Role", "developer")
        .fallback_policy(FallbackPolicy::disabled())
        .transport(stub.clone())
        .build()
        .unwrap();

    assert_eq!(client.config().timeout, Duration::from_millis(500));
    assert_eq!(
        client.config().identity_headers.get("X-Role").map(String::as_str),
        Some("developer")
    );
    assert!(!client.capabilities().fallback_policy.enabled);
    assert!(client
        .list_scenarios(&ScenarioListParams::for_project(1), None)
        .await
        .is_err());
}

#[test]
fn builder_rejects_invalid_identity_header() {
    let err = FeasibilityClient::builder()
        .identity_header("X-Role", "line\nbreak")
        .build()
        .unwrap_err();
    assert!(matches!(err, FeasibilityError::Validation(_)));
}
