use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PATH: &str = "/";
pub const DEFAULT_EXPECTED_STATUS: u16 = 200;
pub const DEFAULT_EXPECTED_REPLICAS: u32 = 1;

fn default_path() -> String {
    DEFAULT_PATH.to_string()
}

fn default_expected_status() -> u16 {
    DEFAULT_EXPECTED_STATUS
}

fn default_expected_replicas() -> u32 {
    DEFAULT_EXPECTED_REPLICAS
}

/// One service to verify: readiness in the orchestrator, then an HTTP probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCheckSpec {
    #[serde(rename = "service")]
    pub service_name: String,
    pub port: u16,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    #[serde(default = "default_expected_replicas")]
    pub expected_replicas: u32,
}

impl ServiceCheckSpec {
    pub fn new(service_name: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            port,
            path: path.into(),
            expected_status: DEFAULT_EXPECTED_STATUS,
            expected_replicas: DEFAULT_EXPECTED_REPLICAS,
        }
    }

    pub fn with_expected_status(mut self, expected_status: u16) -> Self {
        self.expected_status = expected_status;
        self
    }

    pub fn with_expected_replicas(mut self, expected_replicas: u32) -> Self {
        self.expected_replicas = expected_replicas;
        self
    }
}

/// A single orchestrator task as seen by the tester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: String,
    /// Lower-cased task state, e.g. `running`, `preparing`, `shutdown`.
    pub state: String,
}

impl TaskSummary {
    pub fn new(id: impl Into<String>, state: impl AsRef<str>) -> Self {
        Self {
            id: id.into(),
            state: state.as_ref().to_ascii_lowercase(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == "running"
    }
}

pub fn count_running(tasks: &[TaskSummary]) -> usize {
    tasks.iter().filter(|task| task.is_running()).count()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Readiness {
    Ready { attempts: u32, waited_ms: u64 },
    TimedOut { attempts: u32, waited_ms: u64 },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HealthOutcome {
    Healthy {
        status: u16,
    },
    Unhealthy {
        /// `None` when no response was received at all.
        observed_status: Option<u16>,
        reason: String,
    },
    /// Readiness timed out, so no probe was sent.
    Skipped,
}

impl HealthOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthOutcome::Healthy { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub spec: ServiceCheckSpec,
    pub readiness: Readiness,
    pub health: HealthOutcome,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.readiness.is_ready() && self.health.is_healthy()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestRunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub checks: Vec<CheckReport>,
}

impl TestRunSummary {
    /// True when every check passed; vacuously true for an empty run.
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(CheckReport::passed)
    }

    pub fn failed_services(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|check| !check.passed())
            .map(|check| check.spec.service_name.as_str())
            .collect()
    }
}
