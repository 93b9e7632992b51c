use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable that switches the log output to JSON lines.
pub const LOG_FORMAT_ENV: &str = "STACK_SMOKE_LOG_FORMAT";

fn env_filter(verbose: bool) -> EnvFilter {
    let default_directive = if verbose {
        "stack_smoke=debug,info"
    } else {
        "stack_smoke=info"
    };

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Picks the compact or JSON subscriber based on [`LOG_FORMAT_ENV`].
pub fn init_from_env(verbose: bool) {
    match std::env::var(LOG_FORMAT_ENV) {
        Ok(format) if format.eq_ignore_ascii_case("json") => init_json_logger(verbose),
        _ => init_cli_logger(verbose),
    }
}

// Logs go to stderr; stdout carries the progress lines.
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}
