//! Audit execution
//!
//! The [`AuditBackend`] trait is the seam between orchestration and the
//! browser: the production [`ChromeAuditBackend`] launches a disposable
//! Chrome, loads the target URL under the configured emulation, and turns
//! the collected timings into [`AuditResults`]. The browser is killed before
//! the audit resolves, whether it succeeded or failed.

use std::collections::BTreeMap;
use std::future::Future;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::browser::BrowserHandle;
use crate::config::{AuditConfig, AuditFlags};
use crate::metrics::paint::METRIC_SETTLE;
use crate::metrics::{CollectedPaints, PaintMetricsCollector};
use crate::throttling::{CpuThrottler, DeviceEmulator, NetworkProfile, NetworkThrottler};

/// Check name carrying the gated metric
pub const FIRST_MEANINGFUL_PAINT: &str = "first-meaningful-paint";
/// Check name for first contentful paint
pub const FIRST_CONTENTFUL_PAINT: &str = "first-contentful-paint";
/// Check name for DOMContentLoaded completion
pub const DOM_CONTENT_LOADED: &str = "dom-content-loaded";
/// Check name for load event completion
pub const LOAD: &str = "load";

// Emulation defaults applied unless the corresponding flag disables them.
const DEFAULT_CPU_SLOWDOWN: f64 = 4.0;
const DEFAULT_NETWORK_PROFILE: NetworkProfile = NetworkProfile::Fast3G;

/// A single recorded check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Human-readable check title
    pub title: String,
    /// Measured value in milliseconds
    pub raw_value: f64,
    /// Human-readable rendering of the value, e.g. `"1.2s"`
    pub display_value: String,
}

/// Structured output of one audit run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResults {
    /// URL the audit was requested for
    pub requested_url: String,
    /// RFC 3339 timestamp of the run
    pub fetched_at: String,
    /// Recorded checks keyed by check name. A successful audit always
    /// contains the `first-meaningful-paint` entry.
    pub audits: BTreeMap<String, AuditRecord>,
    /// Post-load page HTML, captured when `save_assets` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_snapshot: Option<String>,
}

impl AuditResults {
    /// The gated first-meaningful-paint record, if present
    pub fn first_meaningful_paint(&self) -> Option<&AuditRecord> {
        self.audits.get(FIRST_MEANINGFUL_PAINT)
    }
}

/// The audit engine seam
///
/// Implementations load the target URL and produce [`AuditResults`]. The
/// runner stays agnostic of how the page is driven, which keeps the
/// failure-path guarantees testable without a browser install.
pub trait AuditBackend {
    /// Audit `url` with the given flags and passthrough configuration
    fn audit(
        &self,
        url: &str,
        flags: &AuditFlags,
        config: &AuditConfig,
    ) -> impl Future<Output = Result<AuditResults>> + Send;
}

/// Production backend driving a disposable headless Chrome
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeAuditBackend;

impl ChromeAuditBackend {
    /// Create a new Chrome-backed audit engine
    pub fn new() -> Self {
        Self
    }
}

impl AuditBackend for ChromeAuditBackend {
    async fn audit(
        &self,
        url: &str,
        flags: &AuditFlags,
        config: &AuditConfig,
    ) -> Result<AuditResults> {
        let browser = BrowserHandle::launch().await?;
        let flags = flags.clone().with_port(browser.debug_port());
        debug!(port = flags.port, "Debugging port merged into audit flags");

        let audited = run_page_audit(&browser, url, &flags, config).await;
        let killed = browser.kill().await;

        match (audited, killed) {
            (Ok(results), Ok(())) => Ok(results),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(kill_err)) => {
                warn!("Browser kill also failed: {:#}", kill_err);
                Err(e)
            }
        }
    }
}

/// Load the page and collect its timings
async fn run_page_audit(
    browser: &BrowserHandle,
    url: &str,
    flags: &AuditFlags,
    config: &AuditConfig,
) -> Result<AuditResults> {
    let page = browser.new_page("about:blank").await?;

    if !flags.disable_device_emulation {
        DeviceEmulator::apply(&page).await?;
    }
    if !flags.disable_network_throttling {
        NetworkThrottler::apply(&page, DEFAULT_NETWORK_PROFILE).await?;
    }
    if !flags.disable_cpu_throttling {
        CpuThrottler::apply(&page, DEFAULT_CPU_SLOWDOWN).await?;
    }

    let collector = PaintMetricsCollector::new();
    collector.inject_into_page(&page).await?;
    let handle = collector.start_collecting(&page).await?;

    info!("Auditing {}", url);
    page.goto(url).await.context("Navigation failed")?;
    page.wait_for_navigation()
        .await
        .context("Wait for navigation failed")?;
    tokio::time::sleep(METRIC_SETTLE).await;

    let paints = handle.collect().await;

    let page_snapshot = if flags.save_assets {
        match page.content().await {
            Ok(html) => Some(html),
            Err(e) => {
                warn!("Failed to capture page snapshot: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    let _ = page.close().await;

    build_results(url, &paints, config, page_snapshot)
}

/// Turn collected timings into the audits map
fn build_results(
    url: &str,
    paints: &CollectedPaints,
    config: &AuditConfig,
    page_snapshot: Option<String>,
) -> Result<AuditResults> {
    // Meaningful paint is approximated by the largest content paint observed
    // during load, falling back to first contentful paint.
    let fmp = paints
        .largest_paint
        .or(paints.first_contentful_paint)
        .context("Audit produced no first-meaningful-paint measurement")?;

    let mut audits = BTreeMap::new();
    audits.insert(
        FIRST_MEANINGFUL_PAINT.to_string(),
        record("First Meaningful Paint", fmp),
    );

    let optional = [
        (FIRST_CONTENTFUL_PAINT, "First Contentful Paint", paints.first_contentful_paint),
        (DOM_CONTENT_LOADED, "DOM Content Loaded", paints.dom_content_loaded),
        (LOAD, "Load", paints.load),
    ];
    for (name, title, value) in optional {
        if let Some(ms) = value {
            if config.wants(name) {
                audits.insert(name.to_string(), record(title, ms));
            }
        }
    }

    Ok(AuditResults {
        requested_url: url.to_string(),
        fetched_at: chrono::Utc::now().to_rfc3339(),
        audits,
        page_snapshot,
    })
}

fn record(title: &str, raw_value: f64) -> AuditRecord {
    AuditRecord {
        title: title.to_string(),
        raw_value,
        display_value: display_ms(raw_value),
    }
}

/// Render a millisecond value for humans, e.g. `4500.0 -> "4.5s"`
fn display_ms(ms: f64) -> String {
    format!("{:.1}s", ms / 1000.0)
}
