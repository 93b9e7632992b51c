#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::ServiceCheckSpec;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost";
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The two services every deployment of the stack must bring up.
pub fn default_checks() -> Vec<ServiceCheckSpec> {
    vec![
        ServiceCheckSpec::new("traefik_traefik", 8080, "/api/rawdata"),
        ServiceCheckSpec::new("portainer_portainer", 9000, "/"),
    ]
}

/// Everything a `StackTester` needs, resolved from defaults and the optional TOML file.
#[derive(Debug, Clone, PartialEq)]
pub struct TesterConfig {
    /// Scheme and host the health probes target; the check's port and path are appended.
    pub base_url: String,
    pub readiness_timeout: Duration,
    pub poll_interval: Duration,
    /// Extra wait between readiness and the health probe.
    pub grace_period: Duration,
    pub request_timeout: Duration,
    /// Explicit Docker host; falls back to `DOCKER_HOST` when unset.
    pub docker_host: Option<String>,
    pub checks: Vec<ServiceCheckSpec>,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            readiness_timeout: DEFAULT_READINESS_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            grace_period: DEFAULT_GRACE_PERIOD,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            docker_host: None,
            checks: default_checks(),
        }
    }
}

impl TesterConfig {
    pub fn health_url(&self, port: u16, path: &str) -> String {
        format!("{}:{}{}", self.base_url.trim_end_matches('/'), port, path)
    }
}

impl Validate for TesterConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("target.base_url", &self.base_url)?;
        validation::validate_non_zero_duration("timing.poll_interval_seconds", self.poll_interval)?;
        validation::validate_non_zero_duration(
            "timing.request_timeout_seconds",
            self.request_timeout,
        )?;

        for check in &self.checks {
            validation::validate_non_empty_string("checks.service", &check.service_name)?;
            validation::validate_positive_number("checks.port", u64::from(check.port), 1)?;
            validation::validate_url_path("checks.path", &check.path)?;
            validation::validate_range("checks.expected_status", check.expected_status, 100, 599)?;
        }
        validation::validate_unique(
            "checks.service",
            self.checks.iter().map(|check| check.service_name.as_str()),
        )?;

        Ok(())
    }
}
