//! Finance feasibility SDK for Rust.
//!
//! Provides an async client for the finance feasibility service. Scenario
//! requests are mapped to the service's wire format, responses are mapped
//! back into [`FinanceScenarioSummary`] graphs, and read operations degrade
//! to deterministic offline scenarios when the service cannot be reached.
//!
//! # Quick start
//!
//! ```no_run
//! use finance_feasibility_sdk::{FeasibilityClient, ScenarioListParams};
//!
//! # async fn example() -> finance_feasibility_sdk::Result<()> {
//! let client = FeasibilityClient::builder()
//!     .base_url("https://finance.example.com")
//!     .identity_header("X-Role", "developer")
//!     .build()?;
//!
//! // Never fails on network trouble: offline scenarios come back instead.
//! let scenarios = client
//!     .list_scenarios(&ScenarioListParams::for_project(777), None)
//!     .await?;
//! for scenario in &scenarios {
//!     println!("{} persisted={}", scenario.scenario_name, scenario.is_persisted());
//! }
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "blocking")]
pub mod blocking;
pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod mapping;
pub mod models;
pub mod transport;

#[cfg(feature = "blocking")]
pub use blocking::BlockingFeasibilityClient;
pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use client::{CallState, FeasibilityClient};
pub use config::{Capabilities, ClientConfig, EndpointSet, FallbackPolicy};
pub use error::{AbortCause, FeasibilityError, Result};
pub use models::*;
pub use transport::{HttpTransport, Transport};

use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// FeasibilityClientBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`FeasibilityClient`].
///
/// Use [`FeasibilityClient::builder()`] to obtain a builder, chain
/// configuration methods, and call [`build()`](FeasibilityClientBuilder::build).
#[derive(Default)]
pub struct FeasibilityClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl FeasibilityClientBuilder {
    /// Set the service root, e.g. `https://finance.example.com`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the per-call deadline.
    ///
    /// Defaults to 2500 milliseconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Attach an identity header to every request.
    ///
    /// The SDK does not construct these; they come from whatever owns the
    /// user's session.
    pub fn identity_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .identity_headers
            .insert(name.into(), value.into());
        self
    }

    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.config.capabilities = capabilities;
        self
    }

    pub fn fallback_policy(mut self, policy: FallbackPolicy) -> Self {
        self.config.capabilities.fallback_policy = policy;
        self
    }

    pub fn endpoints(mut self, endpoints: EndpointSet) -> Self {
        self.config.capabilities.endpoints = endpoints;
        self
    }

    /// Use a custom transport instead of the default `reqwest` one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client. Fails only if the HTTP transport cannot be created
    /// (for instance, an identity header that is not a valid header value).
    pub fn build(self) -> Result<FeasibilityClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.config)?),
        };
        Ok(FeasibilityClient::new(self.config, transport))
    }
}

impl FeasibilityClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> FeasibilityClientBuilder {
        FeasibilityClientBuilder::default()
    }
}
