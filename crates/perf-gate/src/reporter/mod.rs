//! Report generation
//!
//! Audit results are rendered to a self-contained HTML page by default, or
//! to JSON when the output format asks for it. The writer is the single
//! place reports hit the filesystem.

pub mod html;
pub mod json;

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::AuditResults;

/// Supported report output formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Self-contained HTML page with the results embedded as JSON
    #[default]
    Html,
    /// Pretty-printed JSON
    Json,
}

/// Renders audit results and writes them to disk
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportWriter {
    format: ReportFormat,
}

impl ReportWriter {
    /// Create a writer for the given format
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Render results to a string in the configured format
    pub fn format_results(&self, results: &AuditResults) -> Result<String> {
        match self.format {
            ReportFormat::Html => html::HtmlReporter::format(results),
            ReportFormat::Json => json::JsonReporter::format(results, true),
        }
    }

    /// Render results and write the report file
    pub fn write_to_file(&self, results: &AuditResults, path: &Path) -> Result<()> {
        let rendered = self.format_results(results)?;
        std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::engine::{AuditRecord, FIRST_MEANINGFUL_PAINT};

    fn sample_results() -> AuditResults {
        let mut audits = BTreeMap::new();
        audits.insert(
            FIRST_MEANINGFUL_PAINT.to_string(),
            AuditRecord {
                title: "First Meaningful Paint".to_string(),
                raw_value: 1200.0,
                display_value: "1.2s".to_string(),
            },
        );
        AuditResults {
            requested_url: "http://localhost:8865/index.html".to_string(),
            fetched_at: "2026-08-28T00:00:00+00:00".to_string(),
            audits,
            page_snapshot: None,
        }
    }

    #[test]
    fn test_html_writer_produces_document() {
        let writer = ReportWriter::new(ReportFormat::Html);
        let rendered = writer.format_results(&sample_results()).unwrap();
        assert!(rendered.starts_with("<!DOCTYPE html>"));
        assert!(rendered.contains("First Meaningful Paint"));
    }

    #[test]
    fn test_json_writer_round_trips() {
        let writer = ReportWriter::new(ReportFormat::Json);
        let rendered = writer.format_results(&sample_results()).unwrap();
        let parsed: AuditResults = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed.requested_url, "http://localhost:8865/index.html");
        assert!(parsed.first_meaningful_paint().is_some());
    }

    #[test]
    fn test_write_to_file() {
        let dir = std::env::temp_dir().join(format!("perf-gate-report-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("report.html");

        let writer = ReportWriter::new(ReportFormat::Html);
        writer.write_to_file(&sample_results(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("First Meaningful Paint"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_format_deserializes_lowercase() {
        assert_eq!(
            serde_json::from_str::<ReportFormat>("\"html\"").unwrap(),
            ReportFormat::Html
        );
        assert_eq!(
            serde_json::from_str::<ReportFormat>("\"json\"").unwrap(),
            ReportFormat::Json
        );
    }
}
