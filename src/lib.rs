pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliArgs;

pub use crate::adapters::{DockerCliOrchestrator, EngineApiOrchestrator};
pub use crate::config::{toml_config::TomlConfig, TesterConfig};
pub use crate::core::tester::StackTester;
pub use crate::domain::model::{
    CheckReport, HealthOutcome, Readiness, ServiceCheckSpec, TaskSummary, TestRunSummary,
};
pub use crate::domain::ports::Orchestrator;
pub use crate::utils::error::{Result, StackTestError};
