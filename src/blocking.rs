//! Blocking wrapper around [`FeasibilityClient`] for callers without an async
//! runtime.
//!
//! Each call is driven to completion on a private current-thread Tokio
//! runtime owned by the wrapper. Do not use it from inside an async context.
//!
//! # Example
//!
//! ```no_run
//! use finance_feasibility_sdk::{BlockingFeasibilityClient, FeasibilityClient, ScenarioListParams};
//!
//! let client = FeasibilityClient::builder().build().unwrap();
//! let blocking = BlockingFeasibilityClient::new(client).unwrap();
//! let scenarios = blocking
//!     .list_scenarios(&ScenarioListParams::for_project(777), None)
//!     .unwrap();
//! ```

use std::path::{Path, PathBuf};

use crate::cancel::CancelSignal;
use crate::client::FeasibilityClient;
use crate::error::Result;
use crate::models::{
    ConstructionLoanConfig, FeasibilityRequest, FinanceScenarioSummary, ScenarioListParams,
    ScenarioUpdate, SensitivityBand,
};

/// Synchronous facade over [`FeasibilityClient`].
pub struct BlockingFeasibilityClient {
    inner: FeasibilityClient,
    runtime: tokio::runtime::Runtime,
}

impl BlockingFeasibilityClient {
    pub fn new(inner: FeasibilityClient) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { inner, runtime })
    }

    /// The wrapped async client.
    pub fn client(&self) -> &FeasibilityClient {
        &self.inner
    }

    pub fn run_feasibility(
        &self,
        request: &FeasibilityRequest,
        signal: Option<CancelSignal>,
    ) -> Result<FinanceScenarioSummary> {
        self.runtime
            .block_on(self.inner.run_feasibility(request, signal))
    }

    pub fn list_scenarios(
        &self,
        params: &ScenarioListParams,
        signal: Option<CancelSignal>,
    ) -> Result<Vec<FinanceScenarioSummary>> {
        self.runtime.block_on(self.inner.list_scenarios(params, signal))
    }

    pub fn update_construction_loan(
        &self,
        scenario_id: i64,
        loan: &ConstructionLoanConfig,
        signal: Option<CancelSignal>,
    ) -> Result<FinanceScenarioSummary> {
        self.runtime
            .block_on(self.inner.update_construction_loan(scenario_id, loan, signal))
    }

    pub fn update_scenario(
        &self,
        scenario_id: i64,
        update: &ScenarioUpdate,
        signal: Option<CancelSignal>,
    ) -> Result<FinanceScenarioSummary> {
        self.runtime
            .block_on(self.inner.update_scenario(scenario_id, update, signal))
    }

    pub fn delete_scenario(&self, scenario_id: i64, signal: Option<CancelSignal>) -> Result<()> {
        self.runtime
            .block_on(self.inner.delete_scenario(scenario_id, signal))
    }

    pub fn rerun_sensitivity(
        &self,
        scenario_id: i64,
        bands: &[SensitivityBand],
        signal: Option<CancelSignal>,
    ) -> Result<FinanceScenarioSummary> {
        self.runtime
            .block_on(self.inner.rerun_sensitivity(scenario_id, bands, signal))
    }

    pub fn export_scenario_to<P: AsRef<Path>>(
        &self,
        scenario_id: i64,
        dest: P,
        signal: Option<CancelSignal>,
    ) -> Result<PathBuf> {
        self.runtime
            .block_on(self.inner.export_scenario_to(scenario_id, dest, signal))
    }
}
