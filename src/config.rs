use std::collections::BTreeMap;
use std::time::Duration;

pub const FEASIBILITY_PATH: &str = "/api/v1/finance/feasibility";
pub const SCENARIOS_PATH: &str = "/api/v1/finance/scenarios";
pub const EXPORT_PATH: &str = "/api/v1/finance/export";

/// Default deadline applied to every call when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2500);

pub fn scenario_path(scenario_id: i64) -> String {
    format!("{}/{}", SCENARIOS_PATH, scenario_id)
}

pub fn construction_loan_path(scenario_id: i64) -> String {
    format!("{}/{}/construction-loan", SCENARIOS_PATH, scenario_id)
}

pub fn sensitivity_path(scenario_id: i64) -> String {
    format!("{}/{}/sensitivity", SCENARIOS_PATH, scenario_id)
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// When read paths may substitute an offline scenario for a live response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPolicy {
    /// Master switch. When off, every failure propagates.
    pub enabled: bool,
    /// Treat a timeout on the single feasibility endpoint like a network
    /// failure. The list endpoint always falls back on timeout.
    pub fallback_on_feasibility_timeout: bool,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            fallback_on_feasibility_timeout: false,
        }
    }
}

impl FallbackPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            fallback_on_feasibility_timeout: false,
        }
    }
}

/// Optional endpoint groups. Feasibility runs, listing, renaming and
/// deletion are always available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointSet {
    pub construction_loan: bool,
    pub sensitivity: bool,
    pub export: bool,
}

impl Default for EndpointSet {
    fn default() -> Self {
        Self {
            construction_loan: true,
            sensitivity: true,
            export: true,
        }
    }
}

/// Capability set selected once when the client is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub fallback_policy: FallbackPolicy,
    pub endpoints: EndpointSet,
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Everything the client needs to reach the service. Identity headers are
/// opaque: they are produced elsewhere and attached verbatim.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub identity_headers: BTreeMap<String, String>,
    pub capabilities: Capabilities,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: DEFAULT_TIMEOUT,
            identity_headers: BTreeMap::new(),
            capabilities: Capabilities::default(),
        }
    }
}
