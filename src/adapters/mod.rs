// Adapters layer: concrete orchestrator clients behind the domain port.

pub mod docker_cli;
pub mod engine_api;

pub use docker_cli::DockerCliOrchestrator;
pub use engine_api::EngineApiOrchestrator;

use crate::domain::ports::Orchestrator;
use crate::utils::error::Result;

pub const DOCKER_HOST_ENV: &str = "DOCKER_HOST";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorTarget {
    /// Docker Engine HTTP API at this `http(s)://` endpoint.
    EngineApi(String),
    /// Docker CLI, optionally with an explicit `--host`.
    Cli(Option<String>),
}

/// Decides how to reach the daemon the way the Docker client libraries do.
pub fn resolve_target(docker_host: Option<&str>) -> OrchestratorTarget {
    let host = docker_host
        .map(str::to_string)
        .or_else(|| std::env::var(DOCKER_HOST_ENV).ok())
        .filter(|host| !host.trim().is_empty());

    match host {
        Some(host) if host.starts_with("tcp://") => {
            OrchestratorTarget::EngineApi(format!("http://{}", &host["tcp://".len()..]))
        }
        Some(host) if host.starts_with("http://") || host.starts_with("https://") => {
            OrchestratorTarget::EngineApi(host)
        }
        other => OrchestratorTarget::Cli(other),
    }
}

pub fn connect(docker_host: Option<&str>) -> Result<Box<dyn Orchestrator>> {
    match resolve_target(docker_host) {
        OrchestratorTarget::EngineApi(endpoint) => {
            tracing::info!("Using Docker Engine API at {}", endpoint);
            Ok(Box::new(EngineApiOrchestrator::new(endpoint)?))
        }
        OrchestratorTarget::Cli(host) => {
            tracing::info!(
                "Using Docker CLI ({})",
                host.as_deref().unwrap_or("default context")
            );
            Ok(Box::new(DockerCliOrchestrator::new(host)))
        }
    }
}
