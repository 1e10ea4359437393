//! Build-gating performance audits for locally served pages
//!
//! This crate runs a single end-to-end audit: it serves a document root over
//! HTTP, launches a disposable headless Chrome instance, loads
//! `/index.html`, records paint and navigation timings, writes an HTML
//! report, and fails the build when first meaningful paint exceeds a
//! configured budget.
//!
//! # Phases
//!
//! - **Server**: a static file server bound to a fixed local port
//! - **Launch**: a fresh browser process with its remote-debugging port
//!   merged into the run's audit flags
//! - **Audit**: navigation plus paint-timing collection over the Chrome
//!   DevTools Protocol, with optional device/CPU/network emulation
//! - **Resolution**: report persistence and the threshold check that decides
//!   the process exit code
//!
//! The server is stopped exactly once per run and the browser is killed
//! before the audit phase resolves, on the success and failure paths alike.
//!
//! # Example
//!
//! ```no_run
//! use perf_gate::{AuditRunner, RunnerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = RunnerConfig::from_file("audit.toml")?;
//! let runner = AuditRunner::new(config);
//! let outcome = runner.run().await?;
//! std::process::exit(outcome.exit_code());
//! # }
//! ```
//!
//! # Configuration
//!
//! Runs are configured with a TOML file; every section is optional and
//! defaults to the baked-in values (port 8865, `./public` root, 3000 ms
//! budget):
//!
//! ```toml
//! [server]
//! root = "./public"
//! port = 8865
//!
//! [flags]
//! save_assets = true
//! disable_device_emulation = true
//! disable_cpu_throttling = true
//! disable_network_throttling = true
//! log_level = "info"
//!
//! [flags.output]
//! format = "html"
//! path = "report.html"
//!
//! [audit]
//! only_audits = ["first-contentful-paint", "first-meaningful-paint"]
//!
//! [threshold]
//! first_meaningful_paint_max_ms = 3000.0
//! ```

pub mod browser;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod reporter;
pub mod runner;
pub mod server;
pub mod throttling;

// Re-export main types for convenience
pub use config::{AuditConfig, AuditFlags, LogLevel, RunnerConfig};
pub use engine::{AuditBackend, AuditResults, ChromeAuditBackend};
pub use reporter::{ReportFormat, ReportWriter};
pub use runner::{AuditRunner, RunOutcome};
pub use server::StaticServer;
