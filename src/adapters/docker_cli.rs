use crate::domain::model::TaskSummary;
use crate::domain::ports::Orchestrator;
use crate::utils::error::{Result, StackTestError};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

const DEFAULT_DOCKER_BINARY: &str = "docker";

/// One line of `docker service ps --format '{{json .}}'`.
#[derive(Debug, Deserialize)]
struct ServicePsLine {
    #[serde(rename = "ID", default)]
    id: String,
    /// e.g. "Running 3 minutes ago", "Preparing 2 seconds ago".
    #[serde(rename = "CurrentState", default)]
    current_state: String,
}

/// Shells out to the Docker CLI, which talks to the local daemon socket.
#[derive(Debug, Clone)]
pub struct DockerCliOrchestrator {
    binary: String,
    host: Option<String>,
}

impl DockerCliOrchestrator {
    pub fn new(host: Option<String>) -> Self {
        Self {
            binary: DEFAULT_DOCKER_BINARY.to_string(),
            host,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn service_ps_args(&self, service_name: &str) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(host) = &self.host {
            args.push("--host".to_string());
            args.push(host.clone());
        }
        args.extend(
            [
                "service",
                "ps",
                service_name,
                "--no-trunc",
                "--format",
                "{{json .}}",
            ]
            .into_iter()
            .map(str::to_string),
        );
        args
    }
}

pub(crate) fn parse_service_ps(output: &str) -> Result<Vec<TaskSummary>> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| -> Result<TaskSummary> {
            let parsed: ServicePsLine = serde_json::from_str(line)?;
            let state = parsed
                .current_state
                .split_whitespace()
                .next()
                .unwrap_or_default();
            Ok(TaskSummary::new(parsed.id, state))
        })
        .collect()
}

pub(crate) fn classify_failure(service_name: &str, stderr: &str) -> StackTestError {
    let message = stderr.trim();
    if message.to_ascii_lowercase().contains("no such service") {
        StackTestError::ServiceNotFound {
            service: service_name.to_string(),
        }
    } else {
        StackTestError::OrchestratorError {
            service: service_name.to_string(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Orchestrator for DockerCliOrchestrator {
    async fn service_tasks(&self, service_name: &str) -> Result<Vec<TaskSummary>> {
        let args = self.service_ps_args(service_name);
        tracing::debug!("Running {} {}", self.binary, args.join(" "));

        // Reaped if the caller stops waiting for the output.
        let output = Command::new(&self.binary)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(service_name, &stderr));
        }

        parse_service_ps(&String::from_utf8_lossy(&output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::count_running;

    #[test]
    fn test_parse_service_ps_output() {
        let output = r#"{"CurrentState":"Running 2 minutes ago","DesiredState":"Running","Error":"","ID":"k2x9","Image":"traefik:v2.10","Name":"traefik_traefik.1","Node":"manager-1","Ports":""}
{"CurrentState":"Shutdown 5 minutes ago","DesiredState":"Shutdown","Error":"","ID":"a8f1","Image":"traefik:v2.10","Name":"traefik_traefik.1","Node":"manager-1","Ports":""}

{"CurrentState":"Preparing 3 seconds ago","DesiredState":"Running","Error":"","ID":"q7w2","Image":"traefik:v2.10","Name":"traefik_traefik.2","Node":"worker-1","Ports":""}
"#;

        let tasks = parse_service_ps(output).unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0], TaskSummary::new("k2x9", "running"));
        assert_eq!(tasks[1].state, "shutdown");
        assert_eq!(tasks[2].state, "preparing");
        assert_eq!(count_running(&tasks), 1);
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_service_ps("").unwrap().is_empty());
        assert!(parse_service_ps("not json").is_err());
    }

    #[test]
    fn test_classify_failure() {
        let err = classify_failure(
            "portainer_portainer",
            "no such service: portainer_portainer\n",
        );
        assert!(matches!(err, StackTestError::ServiceNotFound { .. }));

        let err = classify_failure(
            "portainer_portainer",
            "Cannot connect to the Docker daemon at unix:///var/run/docker.sock.\n",
        );
        match err {
            StackTestError::OrchestratorError { message, .. } => {
                assert!(message.starts_with("Cannot connect"));
                assert!(!message.ends_with('\n'));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_host_is_passed_before_subcommand() {
        let orchestrator = DockerCliOrchestrator::new(Some("ssh://ops@manager".to_string()));
        let args = orchestrator.service_ps_args("traefik_traefik");
        assert_eq!(&args[..4], ["--host", "ssh://ops@manager", "service", "ps"]);
        assert_eq!(args.last().map(String::as_str), Some("{{json .}}"));

        let args = DockerCliOrchestrator::new(None).service_ps_args("traefik_traefik");
        assert_eq!(args[0], "service");
    }

    #[tokio::test]
    async fn test_missing_binary_is_transport_error() {
        let orchestrator =
            DockerCliOrchestrator::new(None).with_binary("stack-smoke-no-such-docker-binary");
        let err = orchestrator.service_tasks("traefik_traefik").await.unwrap_err();
        assert!(matches!(err, StackTestError::IoError(_)));
    }
}
