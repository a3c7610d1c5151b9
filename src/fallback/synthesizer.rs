//! Offline scenario synthesis.
//!
//! Every path clones the shared baseline first and only mutates the clone.
//! Money-bearing fields are scaled with exact decimal arithmetic and rounded
//! to cents, so the capital stack and drawdown schedule of a scaled scenario
//! still agree with each other, and period interest still sums to the
//! construction-loan total.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use super::baseline::baseline;
use crate::mapping::request::parse_project_id;
use crate::models::{
    ConstructionLoanInterest, FeasibilityRequest, FinanceScenarioSummary, IdValue,
    ProjectIdInput, ScenarioListParams,
};

/// One entry of the offline scenario list.
#[derive(Debug, Clone, Copy)]
struct ListVariant {
    scenario_id: i64,
    name: &'static str,
    multiplier: Decimal,
    npv: &'static str,
    irr: &'static str,
}

fn list_variants() -> [ListVariant; 3] {
    [
        ListVariant {
            scenario_id: 0,
            name: "Base Case (offline)",
            multiplier: dec!(1.0),
            npv: "2450000.00",
            irr: "0.1125",
        },
        ListVariant {
            scenario_id: -1,
            name: "Upside Case (offline)",
            multiplier: dec!(1.045),
            npv: "2860000.00",
            irr: "0.1240",
        },
        ListVariant {
            scenario_id: -2,
            name: "Downside Case (offline)",
            multiplier: dec!(0.955),
            npv: "2040000.00",
            irr: "0.1010",
        },
    ]
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Offline stand-in for a single feasibility run.
///
/// The scenario id is the negated current Unix time in milliseconds, so it
/// never collides with a persisted (positive) id.
pub fn synthesize(request: &FeasibilityRequest) -> FinanceScenarioSummary {
    synthesize_at(request, chrono::Utc::now().timestamp_millis())
}

/// [`synthesize`] with an explicit clock reading.
pub fn synthesize_at(request: &FeasibilityRequest, now_ms: i64) -> FinanceScenarioSummary {
    let mut summary = baseline().clone();
    summary.scenario_id = -now_ms.saturating_abs().max(1);
    summary.project_id = project_id_value(&request.project_id);
    summary.fin_project_id = request.fin_project_id.map(IdValue::Number);

    let scenario = &request.scenario;
    if let Some(name) = non_blank(&scenario.name) {
        summary.scenario_name = name;
    }
    if let Some(description) = scenario.description.as_deref().and_then(non_blank) {
        summary.description = Some(description);
    }
    summary.is_primary = scenario.is_primary.unwrap_or(false);
    if let Some(currency) = non_blank(&scenario.currency) {
        apply_currency(&mut summary, &currency);
    }
    summary
}

/// Offline stand-in for the scenario list: three scenarios with ids
/// `0`, `-1` and `-2`, scaled by `1.0`, `1.045` and `0.955`.
pub fn synthesize_list(params: &ScenarioListParams) -> Vec<FinanceScenarioSummary> {
    let project_id = params
        .project_id
        .as_ref()
        .map(project_id_value)
        .unwrap_or_else(|| baseline().project_id.clone());
    let currency = params.currency.as_deref().and_then(non_blank);

    list_variants()
        .iter()
        .map(|variant| {
            let mut summary = baseline().clone();
            summary.scenario_id = variant.scenario_id;
            summary.project_id = project_id.clone();
            summary.fin_project_id = params.fin_project_id.map(IdValue::Number);
            summary.scenario_name = match params.scenario_name.as_deref().and_then(non_blank) {
                Some(prefix) => format!("{} - {}", prefix, variant.name),
                None => variant.name.to_string(),
            };
            summary.is_primary = variant.scenario_id == 0;

            scale_money(&mut summary, variant.multiplier);
            set_result(&mut summary, "npv", variant.npv);
            set_result(&mut summary, "irr", variant.irr);
            if let Some(currency) = &currency {
                apply_currency(&mut summary, currency);
            }
            summary
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Personalization
// ---------------------------------------------------------------------------

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Offline data must never fail, so an unparseable id is kept verbatim.
fn project_id_value(input: &ProjectIdInput) -> IdValue {
    match parse_project_id(input) {
        Ok(number) => match number.as_i64() {
            Some(id) => IdValue::Number(id),
            None => IdValue::Raw(Value::Number(number)),
        },
        Err(_) => match input {
            ProjectIdInput::Text(text) => IdValue::Raw(Value::String(text.clone())),
            ProjectIdInput::Number(_) => IdValue::Raw(Value::Null),
        },
    }
}

fn set_result(summary: &mut FinanceScenarioSummary, name: &str, value: &str) {
    if let Some(result) = summary.results.iter_mut().find(|r| r.name == name) {
        result.value = Some(value.to_string());
    }
}

/// Replace the currency everywhere it appears in the graph.
pub fn apply_currency(summary: &mut FinanceScenarioSummary, currency: &str) {
    let previous = std::mem::replace(&mut summary.currency, currency.to_string());
    let code = Some(currency.to_string());

    if let Some(index) = summary.cost_index.as_mut() {
        for snapshot in [index.base_index.as_mut(), index.latest_index.as_mut()]
            .into_iter()
            .flatten()
        {
            snapshot.currency = code.clone();
        }
    }
    for result in &mut summary.results {
        if result.unit.as_deref() == Some(previous.as_str()) {
            result.unit = code.clone();
        }
        set_metadata_currency(&mut result.metadata, currency);
    }
    for entry in &mut summary.dscr_timeline {
        entry.currency = code.clone();
    }
    if let Some(stack) = summary.capital_stack.as_mut() {
        stack.currency = code.clone();
        for slice in &mut stack.slices {
            set_metadata_currency(&mut slice.metadata, currency);
        }
    }
    if let Some(schedule) = summary.drawdown_schedule.as_mut() {
        schedule.currency = code.clone();
    }
    if let Some(interest) = summary.construction_loan_interest.as_mut() {
        interest.currency = code;
    }
}

fn set_metadata_currency(metadata: &mut Value, currency: &str) {
    if let Some(map) = metadata.as_object_mut() {
        if map.contains_key("currency") {
            map.insert("currency".into(), Value::String(currency.to_string()));
        }
    }
}

// ---------------------------------------------------------------------------
// Scaling
// ---------------------------------------------------------------------------

/// Multiply every money-bearing field by `factor`. Ratios, shares, rates and
/// index values are left alone.
pub fn scale_money(summary: &mut FinanceScenarioSummary, factor: Decimal) {
    scale_opt(&mut summary.escalated_cost, factor);
    for result in &mut summary.results {
        if result.metadata.get("currency").is_some() {
            scale_opt(&mut result.value, factor);
        }
    }
    for entry in &mut summary.dscr_timeline {
        scale_opt(&mut entry.noi, factor);
        scale_opt(&mut entry.debt_service, factor);
    }
    if let Some(stack) = summary.capital_stack.as_mut() {
        scale(&mut stack.total, factor);
        scale(&mut stack.equity_total, factor);
        scale(&mut stack.debt_total, factor);
        scale(&mut stack.other_total, factor);
        for slice in &mut stack.slices {
            scale(&mut slice.amount, factor);
        }
    }
    if let Some(schedule) = summary.drawdown_schedule.as_mut() {
        for entry in &mut schedule.entries {
            scale(&mut entry.equity_draw, factor);
            scale(&mut entry.debt_draw, factor);
            scale(&mut entry.total_draw, factor);
            scale(&mut entry.cumulative_equity, factor);
            scale(&mut entry.cumulative_debt, factor);
            scale(&mut entry.outstanding_debt, factor);
        }
        scale_opt(&mut schedule.total_equity, factor);
        scale_opt(&mut schedule.total_debt, factor);
        scale_opt(&mut schedule.peak_debt_balance, factor);
        scale_opt(&mut schedule.final_debt_balance, factor);
    }
    if let Some(mix) = summary.asset_mix_summary.as_mut() {
        scale_opt(&mut mix.total_estimated_revenue, factor);
        scale_opt(&mut mix.total_estimated_capex, factor);
    }
    for asset in &mut summary.asset_breakdowns {
        scale_opt(&mut asset.gross_revenue, factor);
        scale_opt(&mut asset.operating_cost, factor);
        scale_opt(&mut asset.noi, factor);
        scale_opt(&mut asset.estimated_capex, factor);
    }
    if let Some(interest) = summary.construction_loan_interest.as_mut() {
        scale_opt(&mut interest.total_interest, factor);
        scale_opt(&mut interest.upfront_fee_total, factor);
        scale_opt(&mut interest.exit_fee_total, factor);
        for facility in &mut interest.facilities {
            scale_opt(&mut facility.amount, factor);
            scale_opt(&mut facility.total_interest, factor);
            scale_opt(&mut facility.upfront_fee, factor);
            scale_opt(&mut facility.exit_fee, factor);
        }
        for entry in &mut interest.entries {
            scale_opt(&mut entry.opening_balance, factor);
            scale_opt(&mut entry.closing_balance, factor);
            scale_opt(&mut entry.average_balance, factor);
            scale_opt(&mut entry.interest, factor);
        }
        reconcile_interest(interest);
    }
}

/// Per-entry rounding can leave the period interest a cent off the scaled
/// total; the last period absorbs the difference.
fn reconcile_interest(interest: &mut ConstructionLoanInterest) {
    let Some(total) = interest.total_interest.as_deref().and_then(parse_amount) else {
        return;
    };
    let Some((last, earlier)) = interest.entries.split_last_mut() else {
        return;
    };
    let earlier: Option<Decimal> = earlier
        .iter()
        .map(|entry| entry.interest.as_deref().and_then(parse_amount))
        .sum();
    if let (Some(earlier), Some(_)) = (earlier, last.interest.as_deref().and_then(parse_amount)) {
        let mut remainder = total - earlier;
        remainder.rescale(2);
        last.interest = Some(remainder.to_string());
    }
}

fn parse_amount(amount: &str) -> Option<Decimal> {
    Decimal::from_str(amount.trim()).ok()
}

/// Unparseable amounts are left as they are.
fn scale(amount: &mut String, factor: Decimal) {
    if let Some(value) = parse_amount(amount) {
        let mut scaled = (value * factor).round_dp(2);
        scaled.rescale(2);
        *amount = scaled.to_string();
    }
}

fn scale_opt(amount: &mut Option<String>, factor: Decimal) {
    if let Some(amount) = amount.as_mut() {
        scale(amount, factor);
    }
}
