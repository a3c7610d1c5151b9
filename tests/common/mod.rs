//! Shared test fixtures for the feasibility SDK integration tests.
//!
//! Provides `StubTransport`, a scripted in-memory transport that records
//! every request it receives, plus sample requests and service responses.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use finance_feasibility_sdk::models::{
    CapitalStackInput, CashFlowInput, CostEscalationInput, DrawdownPeriodInput, DscrInput,
    FeasibilityRequest, ProjectIdInput, ScenarioInput,
};
use finance_feasibility_sdk::transport::{TransportRequest, TransportResponse};
use finance_feasibility_sdk::{
    ClientConfig, FeasibilityClient, FeasibilityError, Result, Transport,
};
use serde_json::{json, Value};

/// What the stub does with the next request.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(u16, Value),
    Text(u16, String),
    Bytes(u16, Vec<u8>),
    NetworkError(String),
    /// Sleep, then answer with the inner reply.
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Reply::Json(200, body)
    }

    pub fn hang() -> Self {
        Reply::Delayed(Duration::from_secs(30), Box::new(Reply::ok(json!({}))))
    }
}

/// Scripted transport. Replies are consumed in order; once the script runs
/// out, the last reply repeats.
#[derive(Debug, Default)]
pub struct StubTransport {
    replies: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl StubTransport {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_reply(&self) -> Reply {
        let mut replies = self.replies.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        match replies.pop_front() {
            Some(reply) => {
                *last = Some(reply.clone());
                reply
            }
            None => last
                .clone()
                .unwrap_or_else(|| Reply::NetworkError("no scripted reply".into())),
        }
    }
}

async fn play(reply: Reply) -> Result<TransportResponse> {
    let mut reply = reply;
    loop {
        match reply {
            Reply::Json(status, body) => {
                return Ok(TransportResponse::new(status, body.to_string().into_bytes()))
            }
            Reply::Text(status, text) => return Ok(TransportResponse::new(status, text.into_bytes())),
            Reply::Bytes(status, bytes) => return Ok(TransportResponse::new(status, bytes)),
            Reply::NetworkError(message) => return Err(FeasibilityError::Network(message)),
            Reply::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
        }
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(request);
        let reply = self.next_reply();
        play(reply).await
    }
}

/// Build a client over the stub with the given deadline.
pub fn client_with(stub: &Arc<StubTransport>, timeout: Duration) -> FeasibilityClient {
    let config = ClientConfig {
        timeout,
        ..ClientConfig::default()
    };
    FeasibilityClient::new(config, stub.clone())
}

pub fn client(stub: &Arc<StubTransport>) -> FeasibilityClient {
    client_with(stub, Duration::from_secs(5))
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub fn sample_request() -> FeasibilityRequest {
    FeasibilityRequest {
        project_id: ProjectIdInput::Text("401".into()),
        project_name: Some("Harbourfront Mixed Use".into()),
        fin_project_id: Some(12),
        scenario: ScenarioInput {
            name: "  Scheme A  ".into(),
            description: Some("Mid-rise residential over retail podium".into()),
            currency: "SGD".into(),
            is_primary: Some(true),
            cost_escalation: CostEscalationInput {
                amount: "38950000.00".into(),
                base_period: "2024-Q1".into(),
                series_name: "construction_all_in".into(),
                jurisdiction: "SG".into(),
                provider: Some("internal".into()),
            },
            cash_flow: CashFlowInput {
                discount_rate: "0.08".into(),
                cash_flows: vec![
                    "-2500000".into(),
                    "4200000".into(),
                    "4500000".into(),
                    "4800000".into(),
                ],
            },
            dscr: Some(DscrInput {
                net_operating_incomes: vec!["0".into(), "3500000".into()],
                debt_services: vec!["0".into(), "2000000".into()],
                period_labels: vec!["Y0".into(), "Y1".into()],
            }),
            capital_stack: vec![
                CapitalStackInput {
                    name: "Sponsor Equity".into(),
                    source_type: "equity".into(),
                    amount: "400.00".into(),
                    rate: None,
                    tranche_order: Some(0),
                    metadata: None,
                },
                CapitalStackInput {
                    name: "Senior Loan".into(),
                    source_type: "bank_loan".into(),
                    amount: "800.00".into(),
                    rate: Some("0.045".into()),
                    tranche_order: Some(1),
                    metadata: Some(json!({ "lender": "Bank A" })),
                },
            ],
            drawdown_schedule: vec![
                DrawdownPeriodInput {
                    period: "M1".into(),
                    equity_draw: "400.00".into(),
                    debt_draw: "0".into(),
                },
                DrawdownPeriodInput {
                    period: "M2".into(),
                    equity_draw: "0".into(),
                    debt_draw: "300.00".into(),
                },
            ],
            asset_mix: Vec::new(),
            construction_loan: None,
            sensitivity_bands: Vec::new(),
        },
    }
}

/// The smallest request the service accepts: no optional collections.
pub fn minimal_request() -> FeasibilityRequest {
    FeasibilityRequest {
        project_id: ProjectIdInput::Number(777.0),
        scenario: ScenarioInput {
            name: "Minimal".into(),
            currency: "SGD".into(),
            cost_escalation: CostEscalationInput {
                amount: "1000.00".into(),
                base_period: "2024-Q1".into(),
                series_name: "construction_all_in".into(),
                jurisdiction: "SG".into(),
                provider: None,
            },
            cash_flow: CashFlowInput {
                discount_rate: "0.08".into(),
                cash_flows: vec!["-1000".into(), "1200".into()],
            },
            ..ScenarioInput::default()
        },
        ..FeasibilityRequest::default()
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// A service response with a 2-slice SGD capital stack and a 2-entry
/// drawdown schedule.
pub fn feasibility_response() -> Value {
    json!({
        "scenario_id": 101,
        "project_id": "401",
        "fin_project_id": 12,
        "scenario_name": "Scheme A",
        "currency": "SGD",
        "escalated_cost": "1250.00",
        "cost_index": {
            "series_name": "construction_all_in",
            "jurisdiction": "SG",
            "provider": "internal",
            "base_period": "2024-Q1",
            "latest_period": "2025-Q1",
            "scalar": "1.0417",
            "base_index": { "period": "2024-Q1", "value": "100.00", "unit": "index", "source": "bca", "provider": "internal" },
            "latest_index": { "period": "2025-Q1", "value": "104.17", "unit": "index", "source": "bca", "provider": "internal" }
        },
        "results": [
            { "name": "npv", "value": "154.23", "unit": "SGD", "metadata": { "discount_rate": "0.08" } },
            { "name": "irr", "value": "0.1234", "unit": "ratio" }
        ],
        "dscr_timeline": [
            { "period": "Y1", "noi": "3500000", "debt_service": "2000000", "dscr": "1.75", "currency": "SGD" }
        ],
        "capital_stack": {
            "currency": "SGD",
            "total": "1200.00",
            "equity_total": "400.00",
            "debt_total": "800.00",
            "other_total": "0.00",
            "equity_ratio": "0.3333",
            "debt_ratio": "0.6667",
            "other_ratio": "0.0000",
            "loan_to_cost": "0.6667",
            "weighted_average_debt_rate": "0.0450",
            "slices": [
                { "name": "Sponsor Equity", "source_type": "equity", "category": "equity", "amount": "400.00", "share": "0.3333", "rate": null, "tranche_order": 0, "metadata": {} },
                { "name": "Senior Loan", "source_type": "bank_loan", "category": "debt", "amount": "800.00", "share": "0.6667", "rate": "0.045", "tranche_order": 1, "metadata": { "lender": "Bank A" } }
            ]
        },
        "drawdown_schedule": {
            "currency": "SGD",
            "entries": [
                { "period": "M1", "equity_draw": "400.00", "debt_draw": "0.00", "total_draw": "400.00", "cumulative_equity": "400.00", "cumulative_debt": "0.00", "outstanding_debt": "0.00" },
                { "period": "M2", "equity_draw": "0.00", "debt_draw": "300.00", "total_draw": "300.00", "cumulative_equity": "400.00", "cumulative_debt": "300.00", "outstanding_debt": "300.00" }
            ],
            "total_equity": "400.00",
            "total_debt": "300.00",
            "peak_debt_balance": "300.00",
            "final_debt_balance": "300.00"
        },
        "is_primary": true,
        "is_private": false,
        "updated_at": "2025-03-01T08:00:00Z"
    })
}

/// Every optional part populated.
pub fn full_response() -> Value {
    let mut body = feasibility_response();
    let extra = json!({
        "description": "Mid-rise residential over retail podium",
        "asset_mix_summary": {
            "total_programme_gfa_sqm": "12000.00",
            "total_estimated_revenue": "5400000.00",
            "total_estimated_capex": "38950000.00",
            "dominant_risk_profile": "balanced",
            "notes": ["Retail absorption assumed at 12 months"]
        },
        "asset_breakdowns": [
            {
                "asset_type": "residential",
                "allocation_pct": "0.60",
                "nia_sqm": "7200.00",
                "rent_psm_month": "45.00",
                "gross_revenue": "3888000.00",
                "operating_cost": "777600.00",
                "noi": "3110400.00",
                "estimated_capex": "23370000.00",
                "payback_years": "7.51",
                "absorption_months": "18",
                "risk_level": "moderate",
                "notes": ["Strata sales"]
            }
        ],
        "construction_loan": {
            "interest_rate": "0.045",
            "periods_per_year": 12,
            "capitalise_interest": true,
            "facilities": [
                { "name": "Senior Loan", "amount": "800.00", "interest_rate": "0.045", "periods_per_year": 12, "capitalise_interest": true, "upfront_fee_pct": "0.01", "exit_fee_pct": "0.005", "reserve_months": 3, "amortisation_months": 24, "metadata": { "lender": "Bank A" } }
            ]
        },
        "construction_loan_interest": {
            "currency": "SGD",
            "interest_rate": "0.045",
            "periods_per_year": 12,
            "capitalised": true,
            "total_interest": "18.00",
            "upfront_fee_total": "8.00",
            "exit_fee_total": "4.00",
            "facilities": [
                { "name": "Senior Loan", "amount": "800.00", "interest_rate": "0.045", "periods_per_year": 12, "capitalised": true, "total_interest": "18.00", "upfront_fee": "8.00", "exit_fee": "4.00" }
            ],
            "entries": [
                { "period": "M2", "opening_balance": "0.00", "closing_balance": "300.00", "average_balance": "150.00", "interest": "0.56" }
            ]
        },
        "sensitivity_results": [
            { "parameter": "Construction cost", "scenario": "high", "delta_label": "+10%", "delta_value": "0.10", "npv": "120.00", "irr": "0.1100", "escalated_cost": "1375.00", "total_interest": "19.80" }
        ],
        "sensitivity_jobs": [
            { "scenario_id": 101, "task_id": "task-9", "status": "queued", "backend": "celery", "queued_at": "2025-03-01T08:00:05Z" }
        ],
        "sensitivity_bands": [
            { "parameter": "Construction cost", "low": "-5", "base": "0", "high": "10", "notes": "BCA tender index" }
        ]
    });
    if let (Some(target), Some(source)) = (body.as_object_mut(), extra.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    body
}
