use async_trait::async_trait;
use httpmock::prelude::*;
use stack_smoke::{
    HealthOutcome, Orchestrator, Result, ServiceCheckSpec, StackTestError, StackTester,
    TaskSummary, TesterConfig,
};
use std::collections::HashMap;
use std::time::Duration;

/// Reports a fixed number of running tasks for each known service.
struct StaticOrchestrator {
    running: HashMap<String, usize>,
}

impl StaticOrchestrator {
    fn new(services: &[(&str, usize)]) -> Self {
        Self {
            running: services
                .iter()
                .map(|(name, running)| (name.to_string(), *running))
                .collect(),
        }
    }
}

#[async_trait]
impl Orchestrator for StaticOrchestrator {
    async fn service_tasks(&self, service_name: &str) -> Result<Vec<TaskSummary>> {
        match self.running.get(service_name) {
            Some(&running) => Ok((0..running)
                .map(|i| TaskSummary::new(format!("{}.{}", service_name, i + 1), "running"))
                .collect()),
            None => Err(StackTestError::ServiceNotFound {
                service: service_name.to_string(),
            }),
        }
    }
}

fn fast_config(checks: Vec<ServiceCheckSpec>) -> TesterConfig {
    TesterConfig {
        base_url: "http://127.0.0.1".to_string(),
        readiness_timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(20),
        grace_period: Duration::from_millis(10),
        request_timeout: Duration::from_secs(2),
        docker_host: None,
        checks,
    }
}

#[tokio::test]
async fn test_end_to_end_healthy_stack() {
    let traefik = MockServer::start();
    let portainer = MockServer::start();

    let traefik_mock = traefik.mock(|when, then| {
        when.method(GET).path("/api/rawdata");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"routers": {}, "services": {}}));
    });
    let portainer_mock = portainer.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body("<html>Portainer</html>");
    });

    let checks = vec![
        ServiceCheckSpec::new("traefik_traefik", traefik.port(), "/api/rawdata"),
        ServiceCheckSpec::new("portainer_portainer", portainer.port(), "/"),
    ];
    let orchestrator =
        StaticOrchestrator::new(&[("traefik_traefik", 1), ("portainer_portainer", 1)]);
    let tester = StackTester::new(orchestrator, fast_config(checks)).unwrap();

    let summary = tester.run_checks().await;

    assert!(summary.all_passed());
    assert!(summary.failed_services().is_empty());
    assert_eq!(summary.checks.len(), 2);
    assert_eq!(summary.checks[0].health, HealthOutcome::Healthy { status: 200 });
    assert!(summary.finished_at >= summary.started_at);
    traefik_mock.assert();
    portainer_mock.assert();
}

#[tokio::test]
async fn test_repeated_runs_are_idempotent() {
    let server = MockServer::start();
    let health_mock = server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200);
    });

    let checks = vec![ServiceCheckSpec::new("portainer_portainer", server.port(), "/")];
    let orchestrator = StaticOrchestrator::new(&[("portainer_portainer", 1)]);
    let tester = StackTester::new(orchestrator, fast_config(checks)).unwrap();

    assert!(tester.run_basic_tests().await);
    assert!(tester.run_basic_tests().await);
    health_mock.assert_hits(2);
}

#[tokio::test]
async fn test_unready_service_fails_run_and_continues() {
    let traefik = MockServer::start();
    let portainer = MockServer::start();

    let traefik_mock = traefik.mock(|when, then| {
        when.method(GET).path("/api/rawdata");
        then.status(200);
    });
    let portainer_mock = portainer.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200);
    });

    let checks = vec![
        ServiceCheckSpec::new("traefik_traefik", traefik.port(), "/api/rawdata"),
        ServiceCheckSpec::new("portainer_portainer", portainer.port(), "/"),
    ];
    // traefik never gets a running task; portainer is fine.
    let orchestrator =
        StaticOrchestrator::new(&[("traefik_traefik", 0), ("portainer_portainer", 1)]);
    let tester = StackTester::new(orchestrator, fast_config(checks)).unwrap();

    let summary = tester.run_checks().await;

    assert!(!summary.all_passed());
    assert_eq!(summary.failed_services(), vec!["traefik_traefik"]);
    assert_eq!(summary.checks[0].health, HealthOutcome::Skipped);
    assert!(summary.checks[1].passed());
    traefik_mock.assert_hits(0);
    portainer_mock.assert_hits(1);
}

#[tokio::test]
async fn test_unhealthy_service_fails_run() {
    let server = MockServer::start();
    let health_mock = server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(503);
    });

    let checks = vec![ServiceCheckSpec::new("portainer_portainer", server.port(), "/")];
    let orchestrator = StaticOrchestrator::new(&[("portainer_portainer", 1)]);
    let tester = StackTester::new(orchestrator, fast_config(checks)).unwrap();

    assert!(tester.wait_for_service("portainer_portainer", 1).await);
    assert!(
        !tester
            .test_service_health("portainer_portainer", server.port(), "/", 200)
            .await
    );
    assert!(!tester.run_basic_tests().await);
    health_mock.assert_hits(2);
}

#[tokio::test]
async fn test_empty_check_list_passes() {
    let tester = StackTester::new(StaticOrchestrator::new(&[]), fast_config(vec![])).unwrap();
    assert!(tester.run_basic_tests().await);
}

#[tokio::test]
async fn test_report_serializes_run() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(500);
    });

    let checks = vec![
        ServiceCheckSpec::new("portainer_portainer", server.port(), "/"),
        ServiceCheckSpec::new("whoami_whoami", server.port(), "/"),
    ];
    let orchestrator = StaticOrchestrator::new(&[("portainer_portainer", 1)]);
    let tester = StackTester::new(orchestrator, fast_config(checks)).unwrap();

    let summary = tester.run_checks().await;
    let report = serde_json::to_value(&summary).unwrap();

    assert_eq!(report["checks"][0]["spec"]["service"], "portainer_portainer");
    assert_eq!(report["checks"][0]["readiness"]["outcome"], "ready");
    assert_eq!(report["checks"][0]["health"]["outcome"], "unhealthy");
    assert_eq!(report["checks"][0]["health"]["observed_status"], 500);
    assert_eq!(report["checks"][1]["readiness"]["outcome"], "timed_out");
    assert_eq!(report["checks"][1]["health"]["outcome"], "skipped");
}
