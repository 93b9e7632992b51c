pub mod tester;

pub use crate::domain::model::{
    count_running, CheckReport, HealthOutcome, Readiness, ServiceCheckSpec, TaskSummary,
    TestRunSummary,
};
pub use crate::domain::ports::Orchestrator;
pub use crate::utils::error::Result;
