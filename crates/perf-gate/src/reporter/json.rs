//! JSON report

use anyhow::{Context, Result};

use crate::engine::AuditResults;

/// Renders audit results as JSON
pub struct JsonReporter;

impl JsonReporter {
    /// Serialize the results, pretty-printed when `pretty` is set
    pub fn format(results: &AuditResults, pretty: bool) -> Result<String> {
        let rendered = if pretty {
            serde_json::to_string_pretty(results)
        } else {
            serde_json::to_string(results)
        };
        rendered.context("Failed to serialize audit results")
    }
}
