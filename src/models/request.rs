use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// ProjectIdInput — Accepts `42` or `"42"`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectIdInput {
    Number(f64),
    Text(String),
}

impl From<i64> for ProjectIdInput {
    fn from(value: i64) -> Self {
        ProjectIdInput::Number(value as f64)
    }
}

impl From<&str> for ProjectIdInput {
    fn from(value: &str) -> Self {
        ProjectIdInput::Text(value.to_string())
    }
}

impl Default for ProjectIdInput {
    fn default() -> Self {
        ProjectIdInput::Number(0.0)
    }
}

// ---------------------------------------------------------------------------
// Scenario inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEscalationInput {
    pub amount: String,
    pub base_period: String,
    pub series_name: String,
    pub jurisdiction: String,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowInput {
    pub discount_rate: String,
    pub cash_flows: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DscrInput {
    pub net_operating_incomes: Vec<String>,
    pub debt_services: Vec<String>,
    #[serde(default)]
    pub period_labels: Vec<String>,
}

impl DscrInput {
    pub fn is_empty(&self) -> bool {
        self.net_operating_incomes.is_empty() && self.debt_services.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalStackInput {
    pub name: String,
    pub source_type: String,
    pub amount: String,
    pub rate: Option<String>,
    pub tranche_order: Option<i64>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownPeriodInput {
    pub period: String,
    pub equity_draw: String,
    pub debt_draw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMixInput {
    pub asset_type: String,
    pub allocation_pct: String,
    pub nia_sqm: Option<String>,
    pub rent_psm_month: Option<String>,
    pub stabilised_vacancy_pct: Option<String>,
    pub opex_pct_of_rent: Option<String>,
    pub estimated_revenue: Option<String>,
    pub estimated_capex: Option<String>,
    pub absorption_months: Option<String>,
    pub risk_level: Option<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// A perturbation range for one input parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityBand {
    pub parameter: String,
    pub low: Option<String>,
    pub base: Option<String>,
    pub high: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionLoanFacility {
    pub name: String,
    pub amount: Option<String>,
    pub interest_rate: Option<String>,
    pub periods_per_year: Option<i64>,
    pub capitalise_interest: Option<bool>,
    pub upfront_fee_pct: Option<String>,
    pub exit_fee_pct: Option<String>,
    pub reserve_months: Option<i64>,
    pub amortisation_months: Option<i64>,
    pub metadata: Option<Value>,
}

/// Construction financing terms. Sent as input and echoed back by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionLoanConfig {
    pub interest_rate: String,
    pub periods_per_year: Option<i64>,
    pub capitalise_interest: bool,
    #[serde(default)]
    pub facilities: Vec<ConstructionLoanFacility>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInput {
    pub name: String,
    pub description: Option<String>,
    pub currency: String,
    pub is_primary: Option<bool>,
    pub cost_escalation: CostEscalationInput,
    pub cash_flow: CashFlowInput,
    pub dscr: Option<DscrInput>,
    #[serde(default)]
    pub capital_stack: Vec<CapitalStackInput>,
    #[serde(default)]
    pub drawdown_schedule: Vec<DrawdownPeriodInput>,
    #[serde(default)]
    pub asset_mix: Vec<AssetMixInput>,
    pub construction_loan: Option<ConstructionLoanConfig>,
    #[serde(default)]
    pub sensitivity_bands: Vec<SensitivityBand>,
}

// ---------------------------------------------------------------------------
// FeasibilityRequest — Input to `run_feasibility`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityRequest {
    pub project_id: ProjectIdInput,
    pub project_name: Option<String>,
    pub fin_project_id: Option<i64>,
    pub scenario: ScenarioInput,
}

// ---------------------------------------------------------------------------
// ScenarioListParams / ScenarioUpdate
// ---------------------------------------------------------------------------

/// Query for `list_scenarios`. `currency` and `scenario_name` only shape the
/// offline fallback; they are not sent to the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioListParams {
    pub project_id: Option<ProjectIdInput>,
    pub fin_project_id: Option<i64>,
    pub currency: Option<String>,
    pub scenario_name: Option<String>,
}

impl ScenarioListParams {
    pub fn for_project(project_id: i64) -> Self {
        Self {
            project_id: Some(ProjectIdInput::from(project_id)),
            ..Self::default()
        }
    }
}

/// Partial update for `PATCH /scenarios/{id}`. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioUpdate {
    pub scenario_name: Option<String>,
    pub description: Option<String>,
    pub is_primary: Option<bool>,
}
