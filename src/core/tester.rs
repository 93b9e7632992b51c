use crate::config::TesterConfig;
use crate::core::{
    count_running, CheckReport, HealthOutcome, Orchestrator, Readiness, Result, TestRunSummary,
};
use chrono::Utc;
use reqwest::Client;
use tokio::time::{sleep, timeout, Instant};

/// Waits for stack services to come up in the orchestrator and probes their HTTP endpoints.
///
/// Checks run strictly one after another; nothing is shared between runs, so the
/// same tester can be run repeatedly against a live stack.
pub struct StackTester<O: Orchestrator> {
    orchestrator: O,
    config: TesterConfig,
    client: Client,
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

impl<O: Orchestrator> StackTester<O> {
    pub fn new(orchestrator: O, config: TesterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            orchestrator,
            config,
            client,
        })
    }

    pub fn config(&self) -> &TesterConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &O {
        &self.orchestrator
    }

    /// Returns true once `service_name` has at least `expected_replicas` running tasks,
    /// false if the readiness timeout expires first.
    pub async fn wait_for_service(&self, service_name: &str, expected_replicas: u32) -> bool {
        self.await_readiness(service_name, expected_replicas)
            .await
            .is_ready()
    }

    /// Polls the orchestrator every `poll_interval` until enough tasks are running.
    ///
    /// Query errors count as "not ready yet"; only the timeout ends the wait, and a
    /// query still pending when it expires is abandoned.
    pub async fn await_readiness(&self, service_name: &str, expected_replicas: u32) -> Readiness {
        println!("Waiting for service {} to be ready...", service_name);

        let start = Instant::now();
        let mut attempts = 0u32;

        if expected_replicas == 0 {
            println!("✅ Service {} is ready", service_name);
            return Readiness::Ready {
                attempts,
                waited_ms: 0,
            };
        }

        while start.elapsed() < self.config.readiness_timeout {
            attempts += 1;

            // A single query may not outlive the remaining budget.
            let remaining = self
                .config
                .readiness_timeout
                .saturating_sub(start.elapsed());
            let query = timeout(remaining, self.orchestrator.service_tasks(service_name)).await;

            let Ok(query) = query else {
                println!(
                    "Error checking service {}: query did not answer within {:?}",
                    service_name, remaining
                );
                continue;
            };

            match query {
                Ok(tasks) => {
                    let running = count_running(&tasks);
                    if running >= expected_replicas as usize {
                        println!("✅ Service {} is ready", service_name);
                        tracing::debug!(
                            attempts,
                            "Service {} ready with {} running tasks",
                            service_name,
                            running
                        );
                        return Readiness::Ready {
                            attempts,
                            waited_ms: elapsed_ms(start),
                        };
                    }

                    println!(
                        "Service {}: {}/{} replicas ready",
                        service_name, running, expected_replicas
                    );
                }
                Err(e) => {
                    tracing::debug!(
                        category = ?e.category(),
                        attempts,
                        "Orchestrator query for {} failed, retrying",
                        service_name
                    );
                    println!("Error checking service {}: {}", service_name, e);
                }
            }

            sleep(self.config.poll_interval).await;
        }

        println!("❌ Timeout waiting for service {}", service_name);
        tracing::warn!(
            attempts,
            "Gave up on {} after {:?}",
            service_name,
            self.config.readiness_timeout
        );
        Readiness::TimedOut {
            attempts,
            waited_ms: elapsed_ms(start),
        }
    }

    /// One GET against `{base_url}:{port}{path}`; true iff the status matches.
    pub async fn test_service_health(
        &self,
        service_name: &str,
        port: u16,
        path: &str,
        expected_status: u16,
    ) -> bool {
        self.probe_health(service_name, port, path, expected_status)
            .await
            .is_healthy()
    }

    pub async fn probe_health(
        &self,
        service_name: &str,
        port: u16,
        path: &str,
        expected_status: u16,
    ) -> HealthOutcome {
        let url = self.config.health_url(port, path);
        tracing::debug!("Probing {} at {}", service_name, url);

        match self.client.get(&url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                if status == expected_status {
                    println!("✅ Service {} health check passed", service_name);
                    HealthOutcome::Healthy { status }
                } else {
                    println!("❌ Service {} returned status {}", service_name, status);
                    HealthOutcome::Unhealthy {
                        observed_status: Some(status),
                        reason: format!("expected status {}", expected_status),
                    }
                }
            }
            Err(e) => {
                println!("❌ Service {} health check failed: {}", service_name, e);
                HealthOutcome::Unhealthy {
                    observed_status: None,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Runs every configured check in order and collects the outcomes.
    pub async fn run_checks(&self) -> TestRunSummary {
        let started_at = Utc::now();
        let mut checks = Vec::with_capacity(self.config.checks.len());

        for spec in &self.config.checks {
            let readiness = self
                .await_readiness(&spec.service_name, spec.expected_replicas)
                .await;

            let health = if readiness.is_ready() {
                if !self.config.grace_period.is_zero() {
                    tracing::debug!(
                        "Giving {} {:?} to finish starting",
                        spec.service_name,
                        self.config.grace_period
                    );
                    sleep(self.config.grace_period).await;
                }
                self.probe_health(
                    &spec.service_name,
                    spec.port,
                    &spec.path,
                    spec.expected_status,
                )
                .await
            } else {
                HealthOutcome::Skipped
            };

            checks.push(CheckReport {
                spec: spec.clone(),
                readiness,
                health,
            });
        }

        TestRunSummary {
            started_at,
            finished_at: Utc::now(),
            checks,
        }
    }

    pub async fn run_basic_tests(&self) -> bool {
        self.run_checks().await.all_passed()
    }
}
