//! perf-gate binary
//!
//! Loads `audit.toml` from the working directory (defaults apply when it is
//! absent), runs one audit, and exits 0 on pass, 1 when the paint budget is
//! exceeded, and 1 on any error.

use std::path::Path;
use std::process;

use tracing_subscriber::EnvFilter;

use perf_gate::{AuditRunner, RunnerConfig};

const CONFIG_FILE: &str = "audit.toml";

fn load_config() -> anyhow::Result<RunnerConfig> {
    if Path::new(CONFIG_FILE).exists() {
        RunnerConfig::from_file(CONFIG_FILE)
    } else {
        Ok(RunnerConfig::default())
    }
}

#[tokio::main]
async fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    // RUST_LOG wins; otherwise the configured log level decides.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.flags.log_level.as_directive()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match AuditRunner::new(config).run().await {
        Ok(outcome) => {
            let code = outcome.exit_code();
            if code != 0 {
                process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}
