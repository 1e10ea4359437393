//! Run orchestration
//!
//! [`AuditRunner::run`] drives one full audit: start the static server,
//! audit the served page through the backend, write the report, and check
//! the paint budget. The server handle never escapes [`AuditRunner::run`];
//! it is stopped exactly once after the audit-and-report scope resolves,
//! success or failure. The outcome is a value, so exit-code policy stays
//! with the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::config::RunnerConfig;
use crate::engine::{AuditBackend, AuditResults, ChromeAuditBackend, FIRST_MEANINGFUL_PAINT};
use crate::reporter::{json::JsonReporter, ReportWriter};
use crate::server::StaticServer;

/// Outcome of a completed audit run
///
/// Both variants carry the full results; a report file exists on disk in
/// either case. Failures to produce results at all surface as `Err` from
/// [`AuditRunner::run`] instead.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// First meaningful paint landed within budget
    Passed(AuditResults),
    /// First meaningful paint exceeded the configured budget
    ThresholdExceeded {
        /// Full results of the run
        results: AuditResults,
        /// Human-readable paint time, e.g. `"4.5s"`
        display_value: String,
    },
}

impl RunOutcome {
    /// Process exit code this outcome maps to
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Passed(_) => 0,
            RunOutcome::ThresholdExceeded { .. } => 1,
        }
    }

    /// The audit results, regardless of pass or fail
    pub fn results(&self) -> &AuditResults {
        match self {
            RunOutcome::Passed(results) => results,
            RunOutcome::ThresholdExceeded { results, .. } => results,
        }
    }
}

/// Orchestrates one audit run end to end
pub struct AuditRunner<B> {
    config: RunnerConfig,
    backend: B,
}

impl AuditRunner<ChromeAuditBackend> {
    /// Create a runner backed by a disposable headless Chrome
    pub fn new(config: RunnerConfig) -> Self {
        Self::with_backend(config, ChromeAuditBackend::new())
    }
}

impl<B: AuditBackend> AuditRunner<B> {
    /// Create a runner with a custom audit backend
    pub fn with_backend(config: RunnerConfig, backend: B) -> Self {
        Self { config, backend }
    }

    /// Run the audit and resolve its outcome
    ///
    /// # Errors
    ///
    /// Returns an error when the server cannot start, the audit fails, or
    /// the report cannot be written. The server is released before any of
    /// those errors propagate.
    pub async fn run(&self) -> Result<RunOutcome> {
        let server = StaticServer::start(&self.config.server.root, self.config.server.port)
            .await
            .context("Failed to start static server")?;

        // Everything that needs the server lives in this scope; stop() runs
        // on every path before the outcome leaves run().
        let outcome = self.audit_and_resolve(server.addr().port()).await;
        server.stop().await;

        if let Err(ref e) = outcome {
            error!("Audit run failed: {:#}", e);
        }
        outcome
    }

    async fn audit_and_resolve(&self, port: u16) -> Result<RunOutcome> {
        let url = format!("http://localhost:{port}/index.html");
        let results = self
            .backend
            .audit(&url, &self.config.flags, &self.config.audit)
            .await?;

        let report_path = &self.config.flags.output.path;
        ReportWriter::new(self.config.flags.output.format).write_to_file(&results, report_path)?;
        if self.config.flags.save_assets {
            self.write_assets(&results, report_path)?;
        }

        let fmp = results
            .audits
            .get(FIRST_MEANINGFUL_PAINT)
            .context("Audit results missing first-meaningful-paint")?;

        let budget = self.config.threshold.first_meaningful_paint_max_ms;
        if fmp.raw_value > budget {
            warn!(
                "First meaningful paint {} is over the {:.0}ms budget",
                fmp.display_value, budget
            );
            let display_value = fmp.display_value.clone();
            return Ok(RunOutcome::ThresholdExceeded {
                results,
                display_value,
            });
        }

        info!(
            "First meaningful paint {} is within the {:.0}ms budget",
            fmp.display_value, budget
        );
        Ok(RunOutcome::Passed(results))
    }

    /// Persist the raw results and page snapshot next to the report
    fn write_assets(&self, results: &AuditResults, report_path: &Path) -> Result<()> {
        let (json_path, snapshot_path) = asset_paths(report_path);

        let raw = JsonReporter::format(results, true)?;
        std::fs::write(&json_path, raw)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        info!("Raw results written to {}", json_path.display());

        if let Some(snapshot) = &results.page_snapshot {
            std::fs::write(&snapshot_path, snapshot)
                .with_context(|| format!("Failed to write {}", snapshot_path.display()))?;
            info!("Page snapshot written to {}", snapshot_path.display());
        }
        Ok(())
    }
}

/// Derive asset paths from the report path:
/// `report.html -> (report.json, report-page.html)`
fn asset_paths(report_path: &Path) -> (PathBuf, PathBuf) {
    let stem = report_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let json = report_path.with_file_name(format!("{stem}.json"));
    let snapshot = report_path.with_file_name(format!("{stem}-page.html"));
    (json, snapshot)
}
