use crate::domain::model::TaskSummary;
use crate::domain::ports::Orchestrator;
use crate::utils::error::{Result, StackTestError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ServiceResponse {
    #[serde(rename = "ID")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct TaskResponse {
    #[serde(rename = "ID", default)]
    id: String,
    #[serde(rename = "Status", default)]
    status: TaskStatusResponse,
}

#[derive(Debug, Default, Deserialize)]
struct TaskStatusResponse {
    #[serde(rename = "State", default)]
    state: String,
}

/// Queries the Docker Engine HTTP API of a swarm manager.
pub struct EngineApiOrchestrator {
    endpoint: String,
    client: Client,
}

impl EngineApiOrchestrator {
    /// `endpoint` is an `http(s)://host:port` URL of the Docker daemon.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(API_REQUEST_TIMEOUT).build()?;
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn resolve_service_id(&self, service_name: &str) -> Result<String> {
        let url = format!("{}/services/{}", self.endpoint, service_name);
        tracing::debug!("Inspecting service via {}", url);

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(StackTestError::ServiceNotFound {
                service: service_name.to_string(),
            }),
            status if status.is_success() => {
                let service: ServiceResponse = response.json().await?;
                Ok(service.id)
            }
            status => Err(StackTestError::OrchestratorError {
                service: service_name.to_string(),
                message: format!("service inspect returned {}", status),
            }),
        }
    }
}

#[async_trait]
impl Orchestrator for EngineApiOrchestrator {
    async fn service_tasks(&self, service_name: &str) -> Result<Vec<TaskSummary>> {
        let service_id = self.resolve_service_id(service_name).await?;
        let filters = serde_json::json!({ "service": [service_id] }).to_string();

        let response = self
            .client
            .get(format!("{}/tasks", self.endpoint))
            .query(&[("filters", filters.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StackTestError::OrchestratorError {
                service: service_name.to_string(),
                message: format!("task list returned {}", status),
            });
        }

        let tasks: Vec<TaskResponse> = response.json().await?;
        tracing::debug!("Service {} has {} tasks", service_name, tasks.len());

        Ok(tasks
            .into_iter()
            .map(|task| TaskSummary::new(task.id, task.status.state))
            .collect())
    }
}
