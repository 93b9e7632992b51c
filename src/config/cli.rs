use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "stack-smoke")]
#[command(about = "Smoke-test a Docker Swarm stack: wait for services, then probe their HTTP endpoints")]
pub struct CliArgs {
    /// Path to a TOML configuration file; built-in checks are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Write a JSON report of the run to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Print the resolved checks without contacting the stack
    #[arg(long)]
    pub dry_run: bool,
}
