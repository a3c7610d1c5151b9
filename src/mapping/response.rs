//! Wire payload → domain model.
//!
//! The service may omit any optional collection, and older deployments send
//! partial nested objects. Each sub-mapper here accepts whatever JSON it is
//! handed: missing arrays become empty vectors, missing scalars become `None`,
//! and a nested object of the wrong shape degrades to `None` instead of
//! failing the whole scenario.

use serde_json::{Map, Value};

use super::value::{
    array_of, boolean, decimal, decimal_or_zero, field, flag, id_value, integer, list_of,
    metadata, object, string, string_list,
};
use crate::models::{
    AssetBreakdown, AssetMixSummary, CapitalStackSlice, CapitalStackSummary,
    ConstructionLoanConfig, ConstructionLoanFacility, ConstructionLoanInterest,
    CostIndexProvenance, CostIndexSnapshot, DrawdownEntry, DrawdownSchedule, DscrEntry,
    FacilityInterest, FinanceJobStatus, FinanceResult, FinanceScenarioSummary,
    FinanceSensitivityOutcome, IdValue, InterestEntry, SensitivityBand,
};

/// Map one feasibility response object. Never fails: a non-object payload
/// yields a summary with every optional part empty.
pub fn from_payload(payload: &Value) -> FinanceScenarioSummary {
    let empty = Map::new();
    let obj = object(payload).unwrap_or(&empty);

    FinanceScenarioSummary {
        // Unsaved results come back without an id; 0 keeps them off the
        // mutation endpoints.
        scenario_id: integer(obj, "scenario_id").unwrap_or(0),
        project_id: field(obj, "project_id")
            .map(id_value)
            .unwrap_or_default(),
        fin_project_id: field(obj, "fin_project_id").map(id_value),
        scenario_name: string(obj, "scenario_name").unwrap_or_default(),
        description: string(obj, "description"),
        currency: string(obj, "currency").unwrap_or_default(),
        escalated_cost: decimal(obj, "escalated_cost"),
        cost_index: field(obj, "cost_index").and_then(map_cost_index),
        results: list_of(obj, "results", map_result),
        dscr_timeline: list_of(obj, "dscr_timeline", map_dscr_entry),
        capital_stack: field(obj, "capital_stack").and_then(map_capital_stack),
        drawdown_schedule: field(obj, "drawdown_schedule").and_then(map_drawdown_schedule),
        asset_mix_summary: field(obj, "asset_mix_summary").and_then(map_asset_mix_summary),
        asset_breakdowns: list_of(obj, "asset_breakdowns", map_asset_breakdown),
        construction_loan: field(obj, "construction_loan").and_then(map_construction_loan),
        construction_loan_interest: field(obj, "construction_loan_interest")
            .and_then(map_construction_loan_interest),
        sensitivity_results: field(obj, "sensitivity_results")
            .map(map_sensitivity_outcomes)
            .unwrap_or_default(),
        sensitivity_jobs: field(obj, "sensitivity_jobs")
            .map(map_job_statuses)
            .unwrap_or_default(),
        sensitivity_bands: field(obj, "sensitivity_bands")
            .map(map_sensitivity_bands)
            .unwrap_or_default(),
        is_primary: flag(obj, "is_primary"),
        is_private: flag(obj, "is_private"),
        updated_at: string(obj, "updated_at"),
    }
}

/// Map the scenario list endpoint's array. Anything else yields no scenarios.
pub fn from_list_payload(payload: &Value) -> Vec<FinanceScenarioSummary> {
    match payload {
        Value::Array(items) => items
            .iter()
            .filter(|v| v.is_object())
            .map(from_payload)
            .collect(),
        _ => Vec::new(),
    }
}

/// Normalize a wire project id. Never fails.
pub fn map_project_id(value: &Value) -> IdValue {
    id_value(value)
}

// ---------------------------------------------------------------------------
// Cost index
// ---------------------------------------------------------------------------

pub fn map_cost_index(value: &Value) -> Option<CostIndexProvenance> {
    let obj = object(value)?;
    Some(CostIndexProvenance {
        series_name: string(obj, "series_name"),
        jurisdiction: string(obj, "jurisdiction"),
        provider: string(obj, "provider"),
        base_period: string(obj, "base_period"),
        latest_period: string(obj, "latest_period"),
        scalar: decimal(obj, "scalar"),
        base_index: field(obj, "base_index").and_then(map_cost_index_snapshot),
        latest_index: field(obj, "latest_index").and_then(map_cost_index_snapshot),
    })
}

pub fn map_cost_index_snapshot(value: &Value) -> Option<CostIndexSnapshot> {
    let obj = object(value)?;
    Some(CostIndexSnapshot {
        period: string(obj, "period"),
        value: decimal(obj, "value"),
        unit: string(obj, "unit"),
        source: string(obj, "source"),
        provider: string(obj, "provider"),
        currency: string(obj, "currency"),
    })
}

// ---------------------------------------------------------------------------
// Results and DSCR
// ---------------------------------------------------------------------------

fn map_result(obj: &Map<String, Value>) -> Option<FinanceResult> {
    Some(FinanceResult {
        name: string(obj, "name")?,
        value: decimal(obj, "value"),
        unit: string(obj, "unit"),
        metadata: metadata(obj, "metadata"),
    })
}

fn map_dscr_entry(obj: &Map<String, Value>) -> Option<DscrEntry> {
    Some(DscrEntry {
        period: string(obj, "period").unwrap_or_default(),
        noi: decimal(obj, "noi"),
        debt_service: decimal(obj, "debt_service"),
        dscr: decimal(obj, "dscr"),
        currency: string(obj, "currency"),
    })
}

// ---------------------------------------------------------------------------
// Capital stack
// ---------------------------------------------------------------------------

pub fn map_capital_stack(value: &Value) -> Option<CapitalStackSummary> {
    let obj = object(value)?;
    Some(CapitalStackSummary {
        currency: string(obj, "currency"),
        total: decimal_or_zero(obj, "total"),
        equity_total: decimal_or_zero(obj, "equity_total"),
        debt_total: decimal_or_zero(obj, "debt_total"),
        other_total: decimal_or_zero(obj, "other_total"),
        equity_ratio: decimal(obj, "equity_ratio"),
        debt_ratio: decimal(obj, "debt_ratio"),
        other_ratio: decimal(obj, "other_ratio"),
        loan_to_cost: decimal(obj, "loan_to_cost"),
        weighted_average_debt_rate: decimal(obj, "weighted_average_debt_rate"),
        slices: list_of(obj, "slices", map_capital_stack_slice),
    })
}

/// A slice always survives mapping; absent names and categories come back
/// empty rather than dropping the tranche.
fn map_capital_stack_slice(obj: &Map<String, Value>) -> Option<CapitalStackSlice> {
    Some(CapitalStackSlice {
        name: string(obj, "name").unwrap_or_default(),
        source_type: string(obj, "source_type"),
        category: string(obj, "category").unwrap_or_default(),
        amount: decimal_or_zero(obj, "amount"),
        share: decimal(obj, "share"),
        rate: decimal(obj, "rate"),
        tranche_order: integer(obj, "tranche_order"),
        metadata: metadata(obj, "metadata"),
    })
}

// ---------------------------------------------------------------------------
// Drawdown
// ---------------------------------------------------------------------------

pub fn map_drawdown_schedule(value: &Value) -> Option<DrawdownSchedule> {
    let obj = object(value)?;
    Some(DrawdownSchedule {
        currency: string(obj, "currency"),
        entries: list_of(obj, "entries", map_drawdown_entry),
        total_equity: decimal(obj, "total_equity"),
        total_debt: decimal(obj, "total_debt"),
        peak_debt_balance: decimal(obj, "peak_debt_balance"),
        final_debt_balance: decimal(obj, "final_debt_balance"),
    })
}

fn map_drawdown_entry(obj: &Map<String, Value>) -> Option<DrawdownEntry> {
    Some(DrawdownEntry {
        period: string(obj, "period").unwrap_or_default(),
        equity_draw: decimal_or_zero(obj, "equity_draw"),
        debt_draw: decimal_or_zero(obj, "debt_draw"),
        total_draw: decimal_or_zero(obj, "total_draw"),
        cumulative_equity: decimal_or_zero(obj, "cumulative_equity"),
        cumulative_debt: decimal_or_zero(obj, "cumulative_debt"),
        outstanding_debt: decimal_or_zero(obj, "outstanding_debt"),
    })
}

// ---------------------------------------------------------------------------
// Asset mix
// ---------------------------------------------------------------------------

pub fn map_asset_mix_summary(value: &Value) -> Option<AssetMixSummary> {
    let obj = object(value)?;
    Some(AssetMixSummary {
        total_programme_gfa_sqm: decimal(obj, "total_programme_gfa_sqm"),
        total_estimated_revenue: decimal(obj, "total_estimated_revenue"),
        total_estimated_capex: decimal(obj, "total_estimated_capex"),
        dominant_risk_profile: string(obj, "dominant_risk_profile"),
        notes: string_list(obj, "notes"),
    })
}

fn map_asset_breakdown(obj: &Map<String, Value>) -> Option<AssetBreakdown> {
    Some(AssetBreakdown {
        asset_type: string(obj, "asset_type")?,
        allocation_pct: decimal(obj, "allocation_pct"),
        nia_sqm: decimal(obj, "nia_sqm"),
        rent_psm_month: decimal(obj, "rent_psm_month"),
        gross_revenue: decimal(obj, "gross_revenue"),
        operating_cost: decimal(obj, "operating_cost"),
        noi: decimal(obj, "noi"),
        estimated_capex: decimal(obj, "estimated_capex"),
        payback_years: decimal(obj, "payback_years"),
        absorption_months: decimal(obj, "absorption_months"),
        risk_level: string(obj, "risk_level"),
        notes: string_list(obj, "notes"),
    })
}

// ---------------------------------------------------------------------------
// Construction loan
// ---------------------------------------------------------------------------

pub fn map_construction_loan(value: &Value) -> Option<ConstructionLoanConfig> {
    let obj = object(value)?;
    Some(ConstructionLoanConfig {
        interest_rate: decimal_or_zero(obj, "interest_rate"),
        periods_per_year: integer(obj, "periods_per_year"),
        capitalise_interest: flag(obj, "capitalise_interest"),
        facilities: list_of(obj, "facilities", map_facility_config),
    })
}

fn map_facility_config(obj: &Map<String, Value>) -> Option<ConstructionLoanFacility> {
    Some(ConstructionLoanFacility {
        name: string(obj, "name").unwrap_or_default(),
        amount: decimal(obj, "amount"),
        interest_rate: decimal(obj, "interest_rate"),
        periods_per_year: integer(obj, "periods_per_year"),
        capitalise_interest: boolean(obj, "capitalise_interest"),
        upfront_fee_pct: decimal(obj, "upfront_fee_pct"),
        exit_fee_pct: decimal(obj, "exit_fee_pct"),
        reserve_months: integer(obj, "reserve_months"),
        amortisation_months: integer(obj, "amortisation_months"),
        metadata: field(obj, "metadata").filter(|v| v.is_object()).cloned(),
    })
}

pub fn map_construction_loan_interest(value: &Value) -> Option<ConstructionLoanInterest> {
    let obj = object(value)?;
    Some(ConstructionLoanInterest {
        currency: string(obj, "currency"),
        interest_rate: decimal(obj, "interest_rate"),
        periods_per_year: integer(obj, "periods_per_year"),
        capitalised: flag(obj, "capitalised"),
        total_interest: decimal(obj, "total_interest"),
        upfront_fee_total: decimal(obj, "upfront_fee_total"),
        exit_fee_total: decimal(obj, "exit_fee_total"),
        facilities: list_of(obj, "facilities", map_facility_interest),
        entries: list_of(obj, "entries", map_interest_entry),
    })
}

fn map_facility_interest(obj: &Map<String, Value>) -> Option<FacilityInterest> {
    Some(FacilityInterest {
        name: string(obj, "name").unwrap_or_default(),
        amount: decimal(obj, "amount"),
        interest_rate: decimal(obj, "interest_rate"),
        periods_per_year: integer(obj, "periods_per_year"),
        capitalised: flag(obj, "capitalised"),
        total_interest: decimal(obj, "total_interest"),
        upfront_fee: decimal(obj, "upfront_fee"),
        exit_fee: decimal(obj, "exit_fee"),
    })
}

fn map_interest_entry(obj: &Map<String, Value>) -> Option<InterestEntry> {
    Some(InterestEntry {
        period: string(obj, "period").unwrap_or_default(),
        opening_balance: decimal(obj, "opening_balance"),
        closing_balance: decimal(obj, "closing_balance"),
        average_balance: decimal(obj, "average_balance"),
        interest: decimal(obj, "interest"),
    })
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

pub fn map_sensitivity_outcomes(value: &Value) -> Vec<FinanceSensitivityOutcome> {
    array_of(value, |obj| {
        Some(FinanceSensitivityOutcome {
            parameter: string(obj, "parameter")?,
            scenario: string(obj, "scenario").unwrap_or_default(),
            delta_label: string(obj, "delta_label"),
            delta_value: decimal(obj, "delta_value"),
            npv: decimal(obj, "npv"),
            irr: decimal(obj, "irr"),
            escalated_cost: decimal(obj, "escalated_cost"),
            total_interest: decimal(obj, "total_interest"),
        })
    })
}

pub fn map_job_statuses(value: &Value) -> Vec<FinanceJobStatus> {
    array_of(value, |obj| {
        Some(FinanceJobStatus {
            scenario_id: integer(obj, "scenario_id"),
            task_id: string(obj, "task_id"),
            status: string(obj, "status").unwrap_or_else(|| "unknown".to_string()),
            backend: string(obj, "backend"),
            queued_at: string(obj, "queued_at"),
        })
    })
}

pub fn map_sensitivity_bands(value: &Value) -> Vec<SensitivityBand> {
    array_of(value, |obj| {
        Some(SensitivityBand {
            parameter: string(obj, "parameter")?,
            low: decimal(obj, "low"),
            base: decimal(obj, "base"),
            high: decimal(obj, "high"),
            notes: string(obj, "notes"),
        })
    })
}
