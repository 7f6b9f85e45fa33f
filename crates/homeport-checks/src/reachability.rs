// homeport-checks/src/reachability.rs
// ============================================================================
// Module: Reachability Check
// Description: Advisory HTTP reachability probe for deployed endpoints.
// Purpose: Probe a derived URL for an expected status with strict limits.
// Dependencies: homeport-core, reqwest, url
// ============================================================================

//! ## Overview
//! The reachability check issues one bounded GET request and compares the
//! response status against the expectation. It is always advisory: missing
//! DNS or hosts configuration is expected in test environments and is not a
//! deployment defect, so reachability never reports critical severity. The
//! probe enforces scheme restrictions, redirects disabled, and a request
//! timeout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use homeport_core::CheckId;
use homeport_core::CheckOutcome;
use homeport_core::CheckResult;
use homeport_core::CheckRunner;
use homeport_core::CheckSeverity;
use homeport_core::Clock;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for reachability probes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReachabilityConfig {
    /// Allow cleartext HTTP (enabled by default for in-lab endpoints).
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self {
            allow_http: true,
            timeout_ms: 5_000,
            user_agent: "homeport/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reachability check construction errors.
#[derive(Debug, Error)]
pub enum ReachabilityError {
    /// Probe URL failed to parse or uses a disallowed scheme.
    #[error("invalid probe url: {0}")]
    InvalidUrl(String),
    /// HTTP client construction failed.
    #[error("http client build failed: {0}")]
    ClientBuild(String),
}

// ============================================================================
// SECTION: Reachability Check
// ============================================================================

/// Advisory health check probing an endpoint for an expected status.
pub struct ReachabilityCheck {
    /// Check identifier.
    check_id: CheckId,
    /// Probe URL.
    url: Url,
    /// Expected response status code.
    expected_status: u16,
    /// HTTP client used for the probe.
    client: Client,
}

impl ReachabilityCheck {
    /// Creates a reachability check for the given URL.
    ///
    /// # Errors
    ///
    /// Returns [`ReachabilityError`] when the URL is invalid or the HTTP
    /// client cannot be created.
    pub fn new(
        check_id: CheckId,
        url: &str,
        expected_status: u16,
        config: &ReachabilityConfig,
    ) -> Result<Self, ReachabilityError> {
        let url =
            Url::parse(url).map_err(|err| ReachabilityError::InvalidUrl(err.to_string()))?;
        match url.scheme() {
            "https" => {}
            "http" if config.allow_http => {}
            scheme => {
                return Err(ReachabilityError::InvalidUrl(format!(
                    "unsupported scheme: {scheme}"
                )));
            }
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| ReachabilityError::ClientBuild(err.to_string()))?;
        Ok(Self {
            check_id,
            url,
            expected_status,
            client,
        })
    }
}

impl CheckRunner for ReachabilityCheck {
    fn check_id(&self) -> CheckId {
        self.check_id.clone()
    }

    fn severity(&self) -> CheckSeverity {
        // Advisory by design choice: absent DNS/hosts configuration in a
        // test environment is expected, not a deployment defect.
        CheckSeverity::Warn
    }

    fn run(&self, clock: &dyn Clock) -> CheckResult {
        let (outcome, message) = match self.client.get(self.url.clone()).send() {
            Ok(response) => {
                let status = response.status().as_u16();
                if status == self.expected_status {
                    (CheckOutcome::Pass, format!("{} returned {status}", self.url))
                } else {
                    (
                        CheckOutcome::Fail,
                        format!(
                            "{} returned {status}, expected {}",
                            self.url, self.expected_status
                        ),
                    )
                }
            }
            Err(err) => {
                (CheckOutcome::Fail, format!("{} is unreachable: {err}", self.url))
            }
        };

        CheckResult {
            check_name: self.check_id.clone(),
            severity: CheckSeverity::Warn,
            outcome,
            message,
            observed_at: clock.now(),
        }
    }
}
