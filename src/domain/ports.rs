use crate::domain::model::TaskSummary;
use crate::utils::error::Result;
use async_trait::async_trait;

/// The slice of an orchestrator the tester needs: the tasks behind a service.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Fails with `ServiceNotFound` when the service has not been created yet.
    async fn service_tasks(&self, service_name: &str) -> Result<Vec<TaskSummary>>;
}

#[async_trait]
impl<T: Orchestrator + ?Sized> Orchestrator for Box<T> {
    async fn service_tasks(&self, service_name: &str) -> Result<Vec<TaskSummary>> {
        (**self).service_tasks(service_name).await
    }
}
