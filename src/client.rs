//! The feasibility client: request mapping, transport, and the fallback policy.
//!
//! Every call walks `Idle → Building → InFlight` and ends in one of
//! `Mapped` (live response), `Fallback` (offline scenario) or `Failed`
//! (error returned to the caller). Read paths may end in `Fallback`; write
//! paths never do.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::try_join_all;

use crate::cancel::{compose, CancelSignal};
use crate::config::{self, Capabilities, ClientConfig};
use crate::error::{AbortCause, FeasibilityError, Result};
use crate::fallback;
use crate::mapping::{self, request as request_mapper};
use crate::models::{
    ConstructionLoanConfig, FeasibilityRequest, FinanceScenarioSummary, ScenarioListParams,
    ScenarioUpdate, SensitivityBand,
};
use crate::transport::{Method, Transport, TransportRequest, TransportResponse};

/// Lifecycle of a single client call, reported through `tracing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Building,
    InFlight,
    Mapped,
    Fallback,
    Failed,
}

/// Read endpoints differ in which failures they answer with offline data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadEndpoint {
    Feasibility,
    ScenarioList,
}

fn transition(operation: &'static str, state: CallState) {
    tracing::debug!(operation, state = ?state, "feasibility call transition");
}

/// Async client for the finance feasibility service.
///
/// Created via [`FeasibilityClient::builder()`](crate::FeasibilityClient::builder)
/// or [`FeasibilityClient::new`] with an explicit transport. Cheap to clone;
/// clones share the transport.
#[derive(Clone)]
pub struct FeasibilityClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for FeasibilityClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeasibilityClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .field("capabilities", &self.config.capabilities)
            .finish()
    }
}

impl FeasibilityClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.config.capabilities
    }

    // -- Read paths ---------------------------------------------------------

    /// Run a feasibility analysis for one scenario.
    ///
    /// Network failures and authorization rejections yield an offline
    /// scenario with a negative id. A timeout is returned as
    /// [`FeasibilityError::Aborted`] unless the fallback policy opts in;
    /// caller cancellation is always returned.
    pub async fn run_feasibility(
        &self,
        request: &FeasibilityRequest,
        signal: Option<CancelSignal>,
    ) -> Result<FinanceScenarioSummary> {
        const OP: &str = "run_feasibility";
        transition(OP, CallState::Building);
        let payload = match request_mapper::to_payload(request) {
            Ok(payload) => payload,
            Err(err) => {
                transition(OP, CallState::Failed);
                return Err(err);
            }
        };

        transition(OP, CallState::InFlight);
        let outgoing = TransportRequest::new(Method::Post, config::FEASIBILITY_PATH).json(payload);
        match self.exchange(outgoing, signal).await {
            Ok(resp) => {
                let value = resp.json().inspect_err(|_| transition(OP, CallState::Failed))?;
                transition(OP, CallState::Mapped);
                Ok(mapping::from_payload(&value))
            }
            Err(err) if self.should_fall_back(ReadEndpoint::Feasibility, &err) => {
                tracing::warn!(operation = OP, error = %err, "serving offline feasibility scenario");
                transition(OP, CallState::Fallback);
                Ok(fallback::synthesize(request))
            }
            Err(err) => {
                transition(OP, CallState::Failed);
                Err(err)
            }
        }
    }

    /// List persisted scenarios for a project.
    ///
    /// Besides network and authorization failures, a 5xx status and a
    /// timeout also yield the three offline scenarios (ids `0`, `-1`, `-2`).
    pub async fn list_scenarios(
        &self,
        params: &ScenarioListParams,
        signal: Option<CancelSignal>,
    ) -> Result<Vec<FinanceScenarioSummary>> {
        const OP: &str = "list_scenarios";
        transition(OP, CallState::Building);
        let mut outgoing = TransportRequest::new(Method::Get, config::SCENARIOS_PATH);
        if let Some(project_id) = &params.project_id {
            match request_mapper::parse_project_id(project_id) {
                Ok(id) => outgoing = outgoing.query("project_id", id),
                Err(err) => {
                    transition(OP, CallState::Failed);
                    return Err(err);
                }
            }
        }
        if let Some(fin_project_id) = params.fin_project_id {
            outgoing = outgoing.query("fin_project_id", fin_project_id);
        }

        transition(OP, CallState::InFlight);
        match self.exchange(outgoing, signal).await {
            Ok(resp) => {
                let value = resp.json().inspect_err(|_| transition(OP, CallState::Failed))?;
                transition(OP, CallState::Mapped);
                Ok(mapping::from_list_payload(&value))
            }
            Err(err) if self.should_fall_back(ReadEndpoint::ScenarioList, &err) => {
                tracing::warn!(operation = OP, error = %err, "serving offline scenario list");
                transition(OP, CallState::Fallback);
                Ok(fallback::synthesize_list(params))
            }
            Err(err) => {
                transition(OP, CallState::Failed);
                Err(err)
            }
        }
    }

    /// Run several feasibility analyses concurrently, e.g. for a comparison
    /// view. Each request follows [`run_feasibility`](Self::run_feasibility);
    /// the first failure that is not answered with offline data fails the
    /// whole batch.
    pub async fn run_feasibility_batch(
        &self,
        requests: &[FeasibilityRequest],
        signal: Option<CancelSignal>,
    ) -> Result<Vec<FinanceScenarioSummary>> {
        try_join_all(
            requests
                .iter()
                .map(|request| self.run_feasibility(request, signal.clone())),
        )
        .await
    }

    // -- Write paths --------------------------------------------------------

    /// Replace the construction-loan terms of a persisted scenario.
    pub async fn update_construction_loan(
        &self,
        scenario_id: i64,
        loan: &ConstructionLoanConfig,
        signal: Option<CancelSignal>,
    ) -> Result<FinanceScenarioSummary> {
        if !self.config.capabilities.endpoints.construction_loan {
            return Err(FeasibilityError::Unsupported("construction-loan"));
        }
        ensure_persisted(scenario_id)?;
        let outgoing = TransportRequest::new(
            Method::Patch,
            config::construction_loan_path(scenario_id),
        )
        .json(request_mapper::construction_loan_payload(loan));
        self.write("update_construction_loan", outgoing, signal).await
    }

    /// Rename a scenario, edit its description, or mark it primary.
    pub async fn update_scenario(
        &self,
        scenario_id: i64,
        update: &ScenarioUpdate,
        signal: Option<CancelSignal>,
    ) -> Result<FinanceScenarioSummary> {
        ensure_persisted(scenario_id)?;
        let body = request_mapper::scenario_update_payload(update)?;
        let outgoing = TransportRequest::new(Method::Patch, config::scenario_path(scenario_id))
            .json(body);
        self.write("update_scenario", outgoing, signal).await
    }

    pub async fn delete_scenario(&self, scenario_id: i64, signal: Option<CancelSignal>) -> Result<()> {
        const OP: &str = "delete_scenario";
        ensure_persisted(scenario_id)?;
        transition(OP, CallState::InFlight);
        let outgoing = TransportRequest::new(Method::Delete, config::scenario_path(scenario_id));
        match self.exchange(outgoing, signal).await {
            Ok(_) => {
                transition(OP, CallState::Mapped);
                Ok(())
            }
            Err(err) => {
                transition(OP, CallState::Failed);
                Err(err)
            }
        }
    }

    /// Re-run the sensitivity analysis of a persisted scenario with new bands.
    pub async fn rerun_sensitivity(
        &self,
        scenario_id: i64,
        bands: &[SensitivityBand],
        signal: Option<CancelSignal>,
    ) -> Result<FinanceScenarioSummary> {
        if !self.config.capabilities.endpoints.sensitivity {
            return Err(FeasibilityError::Unsupported("sensitivity"));
        }
        ensure_persisted(scenario_id)?;
        let body = request_mapper::sensitivity_payload(bands)?;
        let outgoing =
            TransportRequest::new(Method::Post, config::sensitivity_path(scenario_id)).json(body);
        self.write("rerun_sensitivity", outgoing, signal).await
    }

    // -- Export -------------------------------------------------------------

    /// Download the service's export of a scenario as raw bytes.
    pub async fn export_scenario(
        &self,
        scenario_id: i64,
        signal: Option<CancelSignal>,
    ) -> Result<Vec<u8>> {
        const OP: &str = "export_scenario";
        if !self.config.capabilities.endpoints.export {
            return Err(FeasibilityError::Unsupported("export"));
        }
        ensure_persisted(scenario_id)?;
        transition(OP, CallState::InFlight);
        let outgoing =
            TransportRequest::new(Method::Get, config::EXPORT_PATH).query("scenario_id", scenario_id);
        match self.exchange(outgoing, signal).await {
            Ok(resp) => {
                transition(OP, CallState::Mapped);
                Ok(resp.body)
            }
            Err(err) => {
                transition(OP, CallState::Failed);
                Err(err)
            }
        }
    }

    /// Download an export and write it to `dest`.
    ///
    /// Writes to a temp file in the destination directory first and renames
    /// on success, so an interrupted download never leaves a partial file
    /// behind.
    pub async fn export_scenario_to<P: AsRef<Path>>(
        &self,
        scenario_id: i64,
        dest: P,
        signal: Option<CancelSignal>,
    ) -> Result<PathBuf> {
        let bytes = self.export_scenario(scenario_id, signal).await?;
        let dest = dest.as_ref().to_path_buf();
        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(&dest).map_err(|e| e.error)?;
        tracing::debug!(path = %dest.display(), bytes = bytes.len(), "scenario export written");
        Ok(dest)
    }

    // -- Internals ----------------------------------------------------------

    /// Send one request under the composed caller/deadline signal and turn
    /// non-2xx statuses into [`FeasibilityError::Http`].
    async fn exchange(
        &self,
        request: TransportRequest,
        signal: Option<CancelSignal>,
    ) -> Result<TransportResponse> {
        let composed = compose(signal, self.config.timeout);
        let method = request.method.as_str();
        let path = request.path.clone();

        let resp = match composed.guard(self.transport.send(request)).await {
            Ok(sent) => sent?,
            Err(cause) => {
                tracing::debug!(
                    method,
                    path = %path,
                    timeout = composed.was_timeout(),
                    "request aborted"
                );
                return Err(FeasibilityError::Aborted(cause));
            }
        };

        if resp.is_success() {
            Ok(resp)
        } else {
            Err(http_error(&resp))
        }
    }

    async fn write(
        &self,
        operation: &'static str,
        request: TransportRequest,
        signal: Option<CancelSignal>,
    ) -> Result<FinanceScenarioSummary> {
        transition(operation, CallState::InFlight);
        let outcome = match self.exchange(request, signal).await {
            Ok(resp) => resp.json().map(|value| mapping::from_payload(&value)),
            Err(err) => Err(err),
        };
        match &outcome {
            Ok(_) => transition(operation, CallState::Mapped),
            Err(_) => transition(operation, CallState::Failed),
        }
        outcome
    }

    fn should_fall_back(&self, endpoint: ReadEndpoint, err: &FeasibilityError) -> bool {
        let policy = self.config.capabilities.fallback_policy;
        if !policy.enabled {
            return false;
        }
        match err {
            FeasibilityError::Aborted(AbortCause::Caller) => false,
            FeasibilityError::Aborted(AbortCause::Timeout { .. }) => match endpoint {
                ReadEndpoint::ScenarioList => true,
                ReadEndpoint::Feasibility => policy.fallback_on_feasibility_timeout,
            },
            FeasibilityError::Network(_) => true,
            FeasibilityError::Http { .. } if err.is_auth_failure() => true,
            FeasibilityError::Http { .. } if err.is_server_error() => {
                endpoint == ReadEndpoint::ScenarioList
            }
            _ => false,
        }
    }
}

fn http_error(resp: &TransportResponse) -> FeasibilityError {
    let text = resp.text();
    let message = if text.trim().is_empty() {
        format!("request failed with status {}", resp.status)
    } else {
        text.trim().to_string()
    };
    FeasibilityError::Http {
        status: resp.status,
        message,
    }
}

/// Offline scenarios carry non-positive ids; they must never reach a
/// mutation endpoint.
fn ensure_persisted(scenario_id: i64) -> Result<()> {
    if scenario_id <= 0 {
        return Err(FeasibilityError::Validation(format!(
            "scenario {} is not a persisted scenario",
            scenario_id
        )));
    }
    Ok(())
}
