use anyhow::Context;
use clap::Parser;
use stack_smoke::utils::{logger, validation::Validate};
use stack_smoke::{
    adapters, CliArgs, StackTestError, StackTester, TestRunSummary, TesterConfig, TomlConfig,
};
use std::path::Path;

fn load_config(args: &CliArgs) -> stack_smoke::Result<TesterConfig> {
    let config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            TomlConfig::from_file(path)?.into_tester_config()
        }
        None => TesterConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn display_plan(config: &TesterConfig) {
    println!("📋 Checks against {}:", config.base_url);
    for check in &config.checks {
        println!(
            "  - {} (replicas >= {}) -> {} expecting {}",
            check.service_name,
            check.expected_replicas,
            config.health_url(check.port, &check.path),
            check.expected_status
        );
    }
    println!(
        "⏱️  readiness timeout {:?}, poll every {:?}, grace {:?}, request timeout {:?}",
        config.readiness_timeout, config.poll_interval, config.grace_period, config.request_timeout
    );
}

fn write_report(path: &Path, summary: &TestRunSummary) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize run report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    tracing::info!("📝 Report written to {}", path.display());
    Ok(())
}

fn exit_on_setup_error(e: StackTestError) -> ! {
    tracing::error!(
        "❌ Setup failed: {} (Category: {:?})",
        e,
        e.category()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Logging
    logger::init_from_env(args.verbose);
    tracing::debug!("CLI args: {:?}", args);

    // Configuration
    let config = load_config(&args).unwrap_or_else(|e| exit_on_setup_error(e));

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the stack will not be contacted");
        display_plan(&config);
        return Ok(());
    }

    // Orchestrator and tester
    let orchestrator =
        adapters::connect(config.docker_host.as_deref()).unwrap_or_else(|e| exit_on_setup_error(e));
    let tester =
        StackTester::new(orchestrator, config).unwrap_or_else(|e| exit_on_setup_error(e));

    println!("🧪 Starting Docker Stack E2E Tests...");

    let summary = tester.run_checks().await;

    // Optional JSON report
    if let Some(report_path) = &args.report {
        if let Err(e) = write_report(report_path, &summary) {
            tracing::error!("{:#}", e);
        }
    }

    if summary.all_passed() {
        println!("🎉 All E2E tests passed!");
        Ok(())
    } else {
        tracing::warn!("Failed services: {}", summary.failed_services().join(", "));
        println!("❌ Some E2E tests failed!");
        std::process::exit(1);
    }
}
