//! Domain request → wire payload.
//!
//! Field names move from the domain's camelCase shape to the service's
//! snake_case one. Optional collections are dropped entirely when empty: the
//! service distinguishes an absent `capital_stack` from an empty one.

use serde_json::{json, Map, Number, Value};

use crate::error::{FeasibilityError, Result};
use crate::models::{
    AssetMixInput, CapitalStackInput, ConstructionLoanConfig, ConstructionLoanFacility,
    DrawdownPeriodInput, DscrInput, FeasibilityRequest, ProjectIdInput, ScenarioInput,
    ScenarioUpdate, SensitivityBand,
};

/// Build the body for `POST /api/v1/finance/feasibility`.
///
/// Fails with [`FeasibilityError::Validation`] when the project id is not a
/// finite number. No other client-side validation happens here.
pub fn to_payload(request: &FeasibilityRequest) -> Result<Value> {
    let mut body = Map::new();
    body.insert(
        "project_id".into(),
        Value::Number(parse_project_id(&request.project_id)?),
    );
    insert_opt(&mut body, "project_name", request.project_name.as_deref());
    if let Some(fin_project_id) = request.fin_project_id {
        body.insert("fin_project_id".into(), json!(fin_project_id));
    }
    body.insert("scenario".into(), scenario_payload(&request.scenario));
    Ok(Value::Object(body))
}

/// Parse a project id given as a number or a numeric string.
pub fn parse_project_id(input: &ProjectIdInput) -> Result<Number> {
    let parsed = match input {
        ProjectIdInput::Number(n) => *n,
        ProjectIdInput::Text(s) => s.trim().parse::<f64>().map_err(|_| {
            FeasibilityError::Validation(format!("project id '{}' is not numeric", s))
        })?,
    };
    if !parsed.is_finite() {
        return Err(FeasibilityError::Validation(format!(
            "project id {} is not a finite number",
            parsed
        )));
    }
    if parsed.fract() == 0.0 && parsed.abs() < i64::MAX as f64 {
        Ok(Number::from(parsed as i64))
    } else {
        Number::from_f64(parsed).ok_or_else(|| {
            FeasibilityError::Validation(format!("project id {} is not representable", parsed))
        })
    }
}

fn scenario_payload(scenario: &ScenarioInput) -> Value {
    let mut out = Map::new();
    out.insert("name".into(), json!(scenario.name));
    insert_opt(&mut out, "description", scenario.description.as_deref());
    out.insert("currency".into(), json!(scenario.currency));
    if let Some(is_primary) = scenario.is_primary {
        out.insert("is_primary".into(), json!(is_primary));
    }

    let escalation = &scenario.cost_escalation;
    let mut cost = Map::new();
    cost.insert("amount".into(), json!(escalation.amount));
    cost.insert("base_period".into(), json!(escalation.base_period));
    cost.insert("series_name".into(), json!(escalation.series_name));
    cost.insert("jurisdiction".into(), json!(escalation.jurisdiction));
    insert_opt(&mut cost, "provider", escalation.provider.as_deref());
    out.insert("cost_escalation".into(), Value::Object(cost));

    out.insert(
        "cash_flow".into(),
        json!({
            "discount_rate": scenario.cash_flow.discount_rate,
            "cash_flows": scenario.cash_flow.cash_flows,
        }),
    );

    if let Some(dscr) = scenario.dscr.as_ref().filter(|d| !d.is_empty()) {
        out.insert("dscr".into(), dscr_payload(dscr));
    }
    insert_list(&mut out, "capital_stack", &scenario.capital_stack, capital_stack_payload);
    insert_list(&mut out, "drawdown_schedule", &scenario.drawdown_schedule, drawdown_payload);
    insert_list(&mut out, "asset_mix", &scenario.asset_mix, asset_mix_payload);
    if let Some(loan) = &scenario.construction_loan {
        out.insert("construction_loan".into(), construction_loan_value(loan));
    }
    insert_list(&mut out, "sensitivity_bands", &scenario.sensitivity_bands, band_payload);

    Value::Object(out)
}

fn dscr_payload(dscr: &DscrInput) -> Value {
    let mut out = Map::new();
    out.insert("net_operating_incomes".into(), json!(dscr.net_operating_incomes));
    out.insert("debt_services".into(), json!(dscr.debt_services));
    if !dscr.period_labels.is_empty() {
        out.insert("period_labels".into(), json!(dscr.period_labels));
    }
    Value::Object(out)
}

fn capital_stack_payload(slice: &CapitalStackInput) -> Value {
    let mut out = Map::new();
    out.insert("name".into(), json!(slice.name));
    out.insert("source_type".into(), json!(slice.source_type));
    out.insert("amount".into(), json!(slice.amount));
    insert_opt(&mut out, "rate", slice.rate.as_deref());
    if let Some(order) = slice.tranche_order {
        out.insert("tranche_order".into(), json!(order));
    }
    if let Some(metadata) = &slice.metadata {
        out.insert("metadata".into(), metadata.clone());
    }
    Value::Object(out)
}

fn drawdown_payload(period: &DrawdownPeriodInput) -> Value {
    json!({
        "period": period.period,
        "equity_draw": period.equity_draw,
        "debt_draw": period.debt_draw,
    })
}

fn asset_mix_payload(asset: &AssetMixInput) -> Value {
    let mut out = Map::new();
    out.insert("asset_type".into(), json!(asset.asset_type));
    out.insert("allocation_pct".into(), json!(asset.allocation_pct));
    insert_opt(&mut out, "nia_sqm", asset.nia_sqm.as_deref());
    insert_opt(&mut out, "rent_psm_month", asset.rent_psm_month.as_deref());
    insert_opt(
        &mut out,
        "stabilised_vacancy_pct",
        asset.stabilised_vacancy_pct.as_deref(),
    );
    insert_opt(&mut out, "opex_pct_of_rent", asset.opex_pct_of_rent.as_deref());
    insert_opt(&mut out, "estimated_revenue", asset.estimated_revenue.as_deref());
    insert_opt(&mut out, "estimated_capex", asset.estimated_capex.as_deref());
    insert_opt(&mut out, "absorption_months", asset.absorption_months.as_deref());
    insert_opt(&mut out, "risk_level", asset.risk_level.as_deref());
    if !asset.notes.is_empty() {
        out.insert("notes".into(), json!(asset.notes));
    }
    Value::Object(out)
}

fn band_payload(band: &SensitivityBand) -> Value {
    let mut out = Map::new();
    out.insert("parameter".into(), json!(band.parameter));
    insert_opt(&mut out, "low", band.low.as_deref());
    insert_opt(&mut out, "base", band.base.as_deref());
    insert_opt(&mut out, "high", band.high.as_deref());
    insert_opt(&mut out, "notes", band.notes.as_deref());
    Value::Object(out)
}

fn facility_payload(facility: &ConstructionLoanFacility) -> Value {
    let mut out = Map::new();
    out.insert("name".into(), json!(facility.name));
    insert_opt(&mut out, "amount", facility.amount.as_deref());
    insert_opt(&mut out, "interest_rate", facility.interest_rate.as_deref());
    if let Some(periods) = facility.periods_per_year {
        out.insert("periods_per_year".into(), json!(periods));
    }
    if let Some(capitalise) = facility.capitalise_interest {
        out.insert("capitalise_interest".into(), json!(capitalise));
    }
    insert_opt(&mut out, "upfront_fee_pct", facility.upfront_fee_pct.as_deref());
    insert_opt(&mut out, "exit_fee_pct", facility.exit_fee_pct.as_deref());
    if let Some(months) = facility.reserve_months {
        out.insert("reserve_months".into(), json!(months));
    }
    if let Some(months) = facility.amortisation_months {
        out.insert("amortisation_months".into(), json!(months));
    }
    if let Some(metadata) = &facility.metadata {
        out.insert("metadata".into(), metadata.clone());
    }
    Value::Object(out)
}

fn construction_loan_value(loan: &ConstructionLoanConfig) -> Value {
    let mut out = Map::new();
    out.insert("interest_rate".into(), json!(loan.interest_rate));
    if let Some(periods) = loan.periods_per_year {
        out.insert("periods_per_year".into(), json!(periods));
    }
    out.insert("capitalise_interest".into(), json!(loan.capitalise_interest));
    insert_list(&mut out, "facilities", &loan.facilities, facility_payload);
    Value::Object(out)
}

/// Body for `PATCH /scenarios/{id}/construction-loan`.
pub fn construction_loan_payload(loan: &ConstructionLoanConfig) -> Value {
    json!({ "construction_loan": construction_loan_value(loan) })
}

/// Body for `POST /scenarios/{id}/sensitivity`. An empty band list is rejected.
pub fn sensitivity_payload(bands: &[SensitivityBand]) -> Result<Value> {
    if bands.is_empty() {
        return Err(FeasibilityError::Validation(
            "at least one sensitivity band is required".into(),
        ));
    }
    let bands: Vec<Value> = bands.iter().map(band_payload).collect();
    Ok(json!({ "sensitivity_bands": bands }))
}

/// Body for `PATCH /scenarios/{id}`. Only the fields being changed are sent.
pub fn scenario_update_payload(update: &ScenarioUpdate) -> Result<Value> {
    let mut out = Map::new();
    insert_opt(&mut out, "scenario_name", update.scenario_name.as_deref());
    insert_opt(&mut out, "description", update.description.as_deref());
    if let Some(is_primary) = update.is_primary {
        out.insert("is_primary".into(), json!(is_primary));
    }
    if out.is_empty() {
        return Err(FeasibilityError::Validation(
            "scenario update has no fields to change".into(),
        ));
    }
    Ok(Value::Object(out))
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        map.insert(key.to_string(), Value::String(v.to_string()));
    }
}

fn insert_list<T>(map: &mut Map<String, Value>, key: &str, items: &[T], f: fn(&T) -> Value) {
    if !items.is_empty() {
        map.insert(key.to_string(), Value::Array(items.iter().map(f).collect()));
    }
}
