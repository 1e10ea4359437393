//! Self-contained HTML report

use anyhow::{Context, Result};

use crate::engine::AuditResults;

/// Renders audit results as a standalone HTML document
pub struct HtmlReporter;

impl HtmlReporter {
    /// Render a full HTML page with the results embedded as JSON
    pub fn format(results: &AuditResults) -> Result<String> {
        let json = serde_json::to_string(results)
            .context("Failed to serialize audit results")?
            // Keep the embedded JSON from terminating the script element early.
            .replace("</", "<\\/");

        let mut rows = String::new();
        for (name, audit) in &results.audits {
            rows.push_str(&format!(
                "      <tr><td>{}</td><td>{}</td><td>{:.0} ms</td></tr>\n",
                escape_html(&audit.title),
                escape_html(&audit.display_value),
                audit.raw_value,
            ));
        }

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Audit Report</title>
  <style>
    body {{ font-family: sans-serif; margin: 2rem auto; max-width: 48rem; }}
    table {{ border-collapse: collapse; width: 100%; }}
    th, td {{ border: 1px solid #ccc; padding: 0.4rem 0.8rem; text-align: left; }}
    .meta {{ color: #666; font-size: 0.9rem; }}
  </style>
</head>
<body>
  <h1>Audit Report</h1>
  <p class="meta">{url} &mdash; {fetched}</p>
  <table>
    <thead>
      <tr><th>Audit</th><th>Value</th><th>Raw</th></tr>
    </thead>
    <tbody>
{rows}    </tbody>
  </table>
  <script id="audit-results" type="application/json">{json}</script>
</body>
</html>
"#,
            url = escape_html(&results.requested_url),
            fetched = escape_html(&results.fetched_at),
            rows = rows,
            json = json,
        ))
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
