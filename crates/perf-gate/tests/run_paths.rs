//! End-to-end run paths with stub audit backends
//!
//! These tests exercise the orchestration guarantees without a browser:
//! report persistence, threshold resolution, and server release on success
//! and failure alike.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use pretty_assertions::assert_eq;

use perf_gate::engine::{AuditRecord, FIRST_MEANINGFUL_PAINT};
use perf_gate::{
    AuditBackend, AuditConfig, AuditFlags, AuditResults, AuditRunner, RunOutcome, RunnerConfig,
    StaticServer,
};

#[path = "common/mod.rs"]
mod common;

/// Backend returning a fixed first-meaningful-paint measurement
struct FixedBackend {
    fmp_ms: f64,
    display: &'static str,
}

impl AuditBackend for FixedBackend {
    async fn audit(
        &self,
        url: &str,
        _flags: &AuditFlags,
        _config: &AuditConfig,
    ) -> Result<AuditResults> {
        let mut audits = BTreeMap::new();
        audits.insert(
            FIRST_MEANINGFUL_PAINT.to_string(),
            AuditRecord {
                title: "First Meaningful Paint".to_string(),
                raw_value: self.fmp_ms,
                display_value: self.display.to_string(),
            },
        );
        Ok(AuditResults {
            requested_url: url.to_string(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
            audits,
            page_snapshot: Some("<html><body>snapshot</body></html>".to_string()),
        })
    }
}

/// Backend that always fails, standing in for a missing browser
struct FailingBackend;

impl AuditBackend for FailingBackend {
    async fn audit(
        &self,
        _url: &str,
        _flags: &AuditFlags,
        _config: &AuditConfig,
    ) -> Result<AuditResults> {
        Err(anyhow!("no chrome found"))
    }
}

fn config_for(root: std::path::PathBuf, port: u16, report_dir: &std::path::Path) -> RunnerConfig {
    let mut config = RunnerConfig::default();
    config.server.root = root;
    config.server.port = port;
    config.flags.output.path = report_dir.join("report.html");
    config
}

#[tokio::test]
async fn test_passing_run_writes_report_and_exits_zero() {
    let report_dir = common::temp_dir("pass-report");
    let config = config_for(common::temp_site("pass"), 0, &report_dir);
    let report_path = config.flags.output.path.clone();

    let runner = AuditRunner::with_backend(
        config,
        FixedBackend {
            fmp_ms: 1200.0,
            display: "1.2s",
        },
    );
    let outcome = runner.run().await.unwrap();

    assert_eq!(outcome.exit_code(), 0);
    assert!(matches!(outcome, RunOutcome::Passed(_)));
    assert_eq!(
        outcome.results().first_meaningful_paint().unwrap().raw_value,
        1200.0
    );
    let report = std::fs::read_to_string(&report_path).unwrap();
    assert!(report.contains("First Meaningful Paint"));
}

#[tokio::test]
async fn test_slow_paint_trips_threshold_but_still_reports() {
    let report_dir = common::temp_dir("slow-report");
    let config = config_for(common::temp_site("slow"), 0, &report_dir);
    let report_path = config.flags.output.path.clone();

    let runner = AuditRunner::with_backend(
        config,
        FixedBackend {
            fmp_ms: 4500.0,
            display: "4.5s",
        },
    );
    let outcome = runner.run().await.unwrap();

    assert_eq!(outcome.exit_code(), 1);
    match &outcome {
        RunOutcome::ThresholdExceeded { display_value, .. } => {
            assert_eq!(display_value, "4.5s");
        }
        other => panic!("expected threshold failure, got {other:?}"),
    }
    // The report is written before the threshold is checked.
    assert!(report_path.exists());
}

#[tokio::test]
async fn test_failed_audit_releases_server_and_writes_no_report() {
    let report_dir = common::temp_dir("fail-report");
    let config = config_for(common::temp_site("fail"), 18871, &report_dir);
    let report_path = config.flags.output.path.clone();

    let runner = AuditRunner::with_backend(config, FailingBackend);
    let err = runner.run().await.unwrap_err();

    assert!(format!("{err:#}").contains("no chrome found"));
    assert!(!report_path.exists());

    // The port must be free again even though the audit failed.
    let server = StaticServer::start(&common::temp_site("fail-rebind"), 18871)
        .await
        .unwrap();
    server.stop().await;
}

#[tokio::test]
async fn test_consecutive_runs_reuse_the_fixed_port() {
    let report_dir = common::temp_dir("repeat-report");
    let config = config_for(common::temp_site("repeat"), 18872, &report_dir);

    let runner = AuditRunner::with_backend(
        config,
        FixedBackend {
            fmp_ms: 900.0,
            display: "0.9s",
        },
    );

    runner.run().await.unwrap();
    runner.run().await.unwrap();
}

#[tokio::test]
async fn test_save_assets_writes_raw_results_and_snapshot() {
    let report_dir = common::temp_dir("assets-report");
    let config = config_for(common::temp_site("assets"), 0, &report_dir);

    let runner = AuditRunner::with_backend(
        config,
        FixedBackend {
            fmp_ms: 800.0,
            display: "0.8s",
        },
    );
    runner.run().await.unwrap();

    let raw = std::fs::read_to_string(report_dir.join("report.json")).unwrap();
    let parsed: AuditResults = serde_json::from_str(&raw).unwrap();
    assert!(parsed.first_meaningful_paint().is_some());

    let snapshot = std::fs::read_to_string(report_dir.join("report-page.html")).unwrap();
    assert!(snapshot.contains("snapshot"));
}

#[tokio::test]
async fn test_disabling_save_assets_skips_artifacts() {
    let report_dir = common::temp_dir("no-assets-report");
    let mut config = config_for(common::temp_site("no-assets"), 0, &report_dir);
    config.flags.save_assets = false;

    let runner = AuditRunner::with_backend(
        config,
        FixedBackend {
            fmp_ms: 800.0,
            display: "0.8s",
        },
    );
    runner.run().await.unwrap();

    assert!(report_dir.join("report.html").exists());
    assert!(!report_dir.join("report.json").exists());
    assert!(!report_dir.join("report-page.html").exists());
}
