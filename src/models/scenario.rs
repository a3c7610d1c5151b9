use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::request::{ConstructionLoanConfig, SensitivityBand};

// ---------------------------------------------------------------------------
// IdValue — Project identifier as reported by the service
// ---------------------------------------------------------------------------

/// A project identifier. Numeric ids (or numeric strings) are normalized to
/// `Number`; anything else is kept exactly as the service sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Number(i64),
    Raw(Value),
}

impl IdValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            IdValue::Number(n) => Some(*n),
            IdValue::Raw(_) => None,
        }
    }
}

impl Default for IdValue {
    fn default() -> Self {
        IdValue::Raw(Value::Null)
    }
}

impl From<i64> for IdValue {
    fn from(value: i64) -> Self {
        IdValue::Number(value)
    }
}

// ---------------------------------------------------------------------------
// CostIndexProvenance — Which escalation index produced the escalated cost
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostIndexSnapshot {
    pub period: Option<String>,
    pub value: Option<String>,
    pub unit: Option<String>,
    pub source: Option<String>,
    pub provider: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostIndexProvenance {
    pub series_name: Option<String>,
    pub jurisdiction: Option<String>,
    pub provider: Option<String>,
    pub base_period: Option<String>,
    pub latest_period: Option<String>,
    pub scalar: Option<String>,
    pub base_index: Option<CostIndexSnapshot>,
    pub latest_index: Option<CostIndexSnapshot>,
}

// ---------------------------------------------------------------------------
// FinanceResult / DscrEntry
// ---------------------------------------------------------------------------

/// A named metric such as `npv` or `irr`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceResult {
    pub name: String,
    pub value: Option<String>,
    pub unit: Option<String>,
    pub metadata: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DscrEntry {
    pub period: String,
    pub noi: Option<String>,
    pub debt_service: Option<String>,
    pub dscr: Option<String>,
    pub currency: Option<String>,
}

// ---------------------------------------------------------------------------
// CapitalStackSummary
// ---------------------------------------------------------------------------

/// One tranche of the capital stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalStackSlice {
    pub name: String,
    pub source_type: Option<String>,
    pub category: String,
    pub amount: String,
    pub share: Option<String>,
    pub rate: Option<String>,
    pub tranche_order: Option<i64>,
    pub metadata: Value,
}

/// Funding composition. `equity_total + debt_total + other_total` matches
/// `total` as reported by the service; the client does not re-check it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalStackSummary {
    pub currency: Option<String>,
    pub total: String,
    pub equity_total: String,
    pub debt_total: String,
    pub other_total: String,
    pub equity_ratio: Option<String>,
    pub debt_ratio: Option<String>,
    pub other_ratio: Option<String>,
    pub loan_to_cost: Option<String>,
    pub weighted_average_debt_rate: Option<String>,
    pub slices: Vec<CapitalStackSlice>,
}

// ---------------------------------------------------------------------------
// DrawdownSchedule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownEntry {
    pub period: String,
    pub equity_draw: String,
    pub debt_draw: String,
    pub total_draw: String,
    pub cumulative_equity: String,
    pub cumulative_debt: String,
    pub outstanding_debt: String,
}

/// Period-by-period disbursement. Entries are kept in service order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownSchedule {
    pub currency: Option<String>,
    pub entries: Vec<DrawdownEntry>,
    pub total_equity: Option<String>,
    pub total_debt: Option<String>,
    pub peak_debt_balance: Option<String>,
    pub final_debt_balance: Option<String>,
}

// ---------------------------------------------------------------------------
// Asset mix
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMixSummary {
    pub total_programme_gfa_sqm: Option<String>,
    pub total_estimated_revenue: Option<String>,
    pub total_estimated_capex: Option<String>,
    pub dominant_risk_profile: Option<String>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBreakdown {
    pub asset_type: String,
    pub allocation_pct: Option<String>,
    pub nia_sqm: Option<String>,
    pub rent_psm_month: Option<String>,
    pub gross_revenue: Option<String>,
    pub operating_cost: Option<String>,
    pub noi: Option<String>,
    pub estimated_capex: Option<String>,
    pub payback_years: Option<String>,
    pub absorption_months: Option<String>,
    pub risk_level: Option<String>,
    pub notes: Vec<String>,
}

// ---------------------------------------------------------------------------
// ConstructionLoanInterest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityInterest {
    pub name: String,
    pub amount: Option<String>,
    pub interest_rate: Option<String>,
    pub periods_per_year: Option<i64>,
    pub capitalised: bool,
    pub total_interest: Option<String>,
    pub upfront_fee: Option<String>,
    pub exit_fee: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestEntry {
    pub period: String,
    pub opening_balance: Option<String>,
    pub closing_balance: Option<String>,
    pub average_balance: Option<String>,
    pub interest: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionLoanInterest {
    pub currency: Option<String>,
    pub interest_rate: Option<String>,
    pub periods_per_year: Option<i64>,
    pub capitalised: bool,
    pub total_interest: Option<String>,
    pub upfront_fee_total: Option<String>,
    pub exit_fee_total: Option<String>,
    pub facilities: Vec<FacilityInterest>,
    pub entries: Vec<InterestEntry>,
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

/// One (`parameter`, `scenario`) row of a sensitivity analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSensitivityOutcome {
    pub parameter: String,
    pub scenario: String,
    pub delta_label: Option<String>,
    pub delta_value: Option<String>,
    pub npv: Option<String>,
    pub irr: Option<String>,
    pub escalated_cost: Option<String>,
    pub total_interest: Option<String>,
}

/// Tracking record for an asynchronous sensitivity job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceJobStatus {
    pub scenario_id: Option<i64>,
    pub task_id: Option<String>,
    pub status: String,
    pub backend: Option<String>,
    pub queued_at: Option<String>,
}

// ---------------------------------------------------------------------------
// FinanceScenarioSummary — The full scenario graph handed to callers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceScenarioSummary {
    pub scenario_id: i64,
    pub project_id: IdValue,
    pub fin_project_id: Option<IdValue>,
    pub scenario_name: String,
    pub description: Option<String>,
    pub currency: String,
    pub escalated_cost: Option<String>,
    pub cost_index: Option<CostIndexProvenance>,
    pub results: Vec<FinanceResult>,
    pub dscr_timeline: Vec<DscrEntry>,
    pub capital_stack: Option<CapitalStackSummary>,
    pub drawdown_schedule: Option<DrawdownSchedule>,
    pub asset_mix_summary: Option<AssetMixSummary>,
    pub asset_breakdowns: Vec<AssetBreakdown>,
    pub construction_loan: Option<ConstructionLoanConfig>,
    pub construction_loan_interest: Option<ConstructionLoanInterest>,
    pub sensitivity_results: Vec<FinanceSensitivityOutcome>,
    pub sensitivity_jobs: Vec<FinanceJobStatus>,
    pub sensitivity_bands: Vec<SensitivityBand>,
    pub is_primary: bool,
    pub is_private: bool,
    pub updated_at: Option<String>,
}

impl FinanceScenarioSummary {
    /// Offline scenarios carry non-positive ids and must not be sent to
    /// mutation endpoints. A service response without a `scenario_id` maps to
    /// `0`, the same id as the offline base case, so it also counts as not
    /// persisted; use this rather than comparing ids to tell them apart.
    pub fn is_persisted(&self) -> bool {
        self.scenario_id > 0
    }

    /// Look up a named result metric, case-insensitively.
    pub fn result(&self, name: &str) -> Option<&FinanceResult> {
        self.results
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }
}
