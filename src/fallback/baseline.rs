//! The fixed scenario every offline fallback starts from.
//!
//! Figures are internally consistent: capital stack totals equal the sum of
//! their slices, and the drawdown schedule disburses exactly the equity and
//! debt the stack commits.

use once_cell::sync::Lazy;
use serde_json::json;

use crate::models::{
    AssetBreakdown, AssetMixSummary, CapitalStackSlice, CapitalStackSummary,
    ConstructionLoanInterest, CostIndexProvenance, CostIndexSnapshot, DrawdownEntry,
    DrawdownSchedule, DscrEntry, FacilityInterest, FinanceResult, FinanceScenarioSummary,
    IdValue, InterestEntry,
};

pub const BASELINE_CURRENCY: &str = "SGD";
pub const BASELINE_SCENARIO_NAME: &str = "Offline Baseline Scenario";

static BASELINE: Lazy<FinanceScenarioSummary> = Lazy::new(build_baseline);

/// Shared, read-only baseline. Clone before changing anything.
pub fn baseline() -> &'static FinanceScenarioSummary {
    &BASELINE
}

fn s(value: &str) -> String {
    value.to_string()
}

fn some(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn build_baseline() -> FinanceScenarioSummary {
    FinanceScenarioSummary {
        scenario_id: 0,
        project_id: IdValue::Number(0),
        fin_project_id: None,
        scenario_name: s(BASELINE_SCENARIO_NAME),
        description: some("Generated offline while the finance service was unreachable"),
        currency: s(BASELINE_CURRENCY),
        escalated_cost: some("38950000.00"),
        cost_index: Some(CostIndexProvenance {
            series_name: some("construction_all_in"),
            jurisdiction: some("SG"),
            provider: some("internal"),
            base_period: some("2024-Q1"),
            latest_period: some("2025-Q1"),
            scalar: some("1.0425"),
            base_index: Some(CostIndexSnapshot {
                period: some("2024-Q1"),
                value: some("100.00"),
                unit: some("index"),
                source: some("offline"),
                provider: some("internal"),
                currency: some(BASELINE_CURRENCY),
            }),
            latest_index: Some(CostIndexSnapshot {
                period: some("2025-Q1"),
                value: some("104.25"),
                unit: some("index"),
                source: some("offline"),
                provider: some("internal"),
                currency: some(BASELINE_CURRENCY),
            }),
        }),
        results: vec![
            FinanceResult {
                name: s("escalated_cost"),
                value: some("38950000.00"),
                unit: some(BASELINE_CURRENCY),
                metadata: json!({ "currency": BASELINE_CURRENCY }),
            },
            FinanceResult {
                name: s("npv"),
                value: some("2450000.00"),
                unit: some(BASELINE_CURRENCY),
                metadata: json!({ "currency": BASELINE_CURRENCY, "discount_rate": "0.08" }),
            },
            FinanceResult {
                name: s("irr"),
                value: some("0.1125"),
                unit: some("ratio"),
                metadata: json!({}),
            },
        ],
        dscr_timeline: vec![
            dscr("Y1", "2100000.00", "1680000.00", "1.25"),
            dscr("Y2", "2268000.00", "1680000.00", "1.35"),
            dscr("Y3", "2352000.00", "1680000.00", "1.40"),
            dscr("Y4", "2436000.00", "1680000.00", "1.45"),
        ],
        capital_stack: Some(CapitalStackSummary {
            currency: some(BASELINE_CURRENCY),
            total: s("38950000.00"),
            equity_total: s("13632500.00"),
            debt_total: s("25317500.00"),
            other_total: s("0.00"),
            equity_ratio: some("0.3500"),
            debt_ratio: some("0.6500"),
            other_ratio: some("0.0000"),
            loan_to_cost: some("0.6500"),
            weighted_average_debt_rate: some("0.0450"),
            slices: vec![
                CapitalStackSlice {
                    name: s("Sponsor Equity"),
                    source_type: some("equity"),
                    category: s("equity"),
                    amount: s("13632500.00"),
                    share: some("0.3500"),
                    rate: None,
                    tranche_order: Some(0),
                    metadata: json!({ "currency": BASELINE_CURRENCY }),
                },
                CapitalStackSlice {
                    name: s("Senior Construction Loan"),
                    source_type: some("bank_loan"),
                    category: s("debt"),
                    amount: s("25317500.00"),
                    share: some("0.6500"),
                    rate: some("0.0450"),
                    tranche_order: Some(1),
                    metadata: json!({ "currency": BASELINE_CURRENCY }),
                },
            ],
        }),
        drawdown_schedule: Some(DrawdownSchedule {
            currency: some(BASELINE_CURRENCY),
            entries: vec![
                drawdown("M1", "6816250.00", "0.00", "6816250.00", "0.00", "0.00"),
                drawdown("M2", "6816250.00", "0.00", "13632500.00", "0.00", "0.00"),
                drawdown(
                    "M3",
                    "0.00",
                    "12658750.00",
                    "13632500.00",
                    "12658750.00",
                    "12658750.00",
                ),
                drawdown(
                    "M4",
                    "0.00",
                    "12658750.00",
                    "13632500.00",
                    "25317500.00",
                    "25317500.00",
                ),
            ],
            total_equity: some("13632500.00"),
            total_debt: some("25317500.00"),
            peak_debt_balance: some("25317500.00"),
            final_debt_balance: some("25317500.00"),
        }),
        asset_mix_summary: Some(AssetMixSummary {
            total_programme_gfa_sqm: some("12000.00"),
            total_estimated_revenue: some("5400000.00"),
            total_estimated_capex: some("38950000.00"),
            dominant_risk_profile: some("balanced"),
            notes: vec![s("Offline estimate; refresh when the service is reachable")],
        }),
        asset_breakdowns: vec![
            AssetBreakdown {
                asset_type: s("residential"),
                allocation_pct: some("0.60"),
                nia_sqm: some("7200.00"),
                rent_psm_month: some("45.00"),
                gross_revenue: some("3888000.00"),
                operating_cost: some("777600.00"),
                noi: some("3110400.00"),
                estimated_capex: some("23370000.00"),
                payback_years: some("7.51"),
                absorption_months: some("18"),
                risk_level: some("moderate"),
                notes: Vec::new(),
            },
            AssetBreakdown {
                asset_type: s("retail"),
                allocation_pct: some("0.40"),
                nia_sqm: some("2800.00"),
                rent_psm_month: some("45.00"),
                gross_revenue: some("1512000.00"),
                operating_cost: some("362880.00"),
                noi: some("1149120.00"),
                estimated_capex: some("15580000.00"),
                payback_years: some("13.56"),
                absorption_months: some("12"),
                risk_level: some("balanced"),
                notes: Vec::new(),
            },
        ],
        construction_loan: None,
        construction_loan_interest: Some(ConstructionLoanInterest {
            currency: some(BASELINE_CURRENCY),
            interest_rate: some("0.0450"),
            periods_per_year: Some(12),
            capitalised: true,
            total_interest: some("1139287.50"),
            upfront_fee_total: some("0.00"),
            exit_fee_total: some("0.00"),
            facilities: vec![FacilityInterest {
                name: s("Senior Construction Loan"),
                amount: some("25317500.00"),
                interest_rate: some("0.0450"),
                periods_per_year: Some(12),
                capitalised: true,
                total_interest: some("1139287.50"),
                upfront_fee: some("0.00"),
                exit_fee: some("0.00"),
            }],
            entries: vec![
                InterestEntry {
                    period: s("M3"),
                    opening_balance: some("0.00"),
                    closing_balance: some("12658750.00"),
                    average_balance: some("6329375.00"),
                    interest: some("284821.88"),
                },
                InterestEntry {
                    period: s("M4"),
                    opening_balance: some("12658750.00"),
                    closing_balance: some("25317500.00"),
                    average_balance: some("18988125.00"),
                    interest: some("854465.62"),
                },
            ],
        }),
        sensitivity_results: Vec::new(),
        sensitivity_jobs: Vec::new(),
        sensitivity_bands: Vec::new(),
        is_primary: false,
        is_private: false,
        updated_at: some("2025-01-01T00:00:00Z"),
    }
}

fn dscr(period: &str, noi: &str, debt_service: &str, ratio: &str) -> DscrEntry {
    DscrEntry {
        period: s(period),
        noi: some(noi),
        debt_service: some(debt_service),
        dscr: some(ratio),
        currency: some(BASELINE_CURRENCY),
    }
}

// Each baseline period draws from a single source.
fn drawdown(
    period: &str,
    equity: &str,
    debt: &str,
    cumulative_equity: &str,
    cumulative_debt: &str,
    outstanding: &str,
) -> DrawdownEntry {
    let total = if equity == "0.00" { debt } else { equity };
    DrawdownEntry {
        period: s(period),
        equity_draw: s(equity),
        debt_draw: s(debt),
        total_draw: s(total),
        cumulative_equity: s(cumulative_equity),
        cumulative_debt: s(cumulative_debt),
        outstanding_debt: s(outstanding),
    }
}
