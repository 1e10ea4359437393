//! Paint timing collection via chromiumoxide
//!
//! Measurements are logged by the injected script as
//! `__AUDIT_METRIC__:{json}` lines and parsed out of
//! `Runtime.consoleAPICalled` events.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

const METRIC_PREFIX: &str = "__AUDIT_METRIC__:";

/// A single timing measurement reported by the injected script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintMetric {
    /// Measurement name, e.g. `first-contentful-paint`
    pub name: String,
    /// Time in milliseconds since navigation start
    pub value: f64,
    /// Unix timestamp in milliseconds when the measurement was reported
    pub timestamp: u64,
}

/// Timings accumulated from one page load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedPaints {
    /// First contentful paint in milliseconds
    pub first_contentful_paint: Option<f64>,
    /// Render time of the largest content paint observed during load
    pub largest_paint: Option<f64>,
    /// DOMContentLoaded completion in milliseconds
    pub dom_content_loaded: Option<f64>,
    /// Load event completion in milliseconds
    pub load: Option<f64>,
}

impl CollectedPaints {
    fn record(&mut self, metric: &PaintMetric) {
        match metric.name.as_str() {
            "first-contentful-paint" => self.first_contentful_paint = Some(metric.value),
            // Later candidates supersede earlier ones.
            "largest-paint" => self.largest_paint = Some(metric.value),
            "dom-content-loaded" => self.dom_content_loaded = Some(metric.value),
            "load" => self.load = Some(metric.value),
            other => trace!("Ignoring unknown metric {}", other),
        }
    }
}

/// Handle to a running metrics collection task
pub struct MetricsHandle {
    collected: Arc<Mutex<CollectedPaints>>,
    task: tokio::task::JoinHandle<()>,
}

impl MetricsHandle {
    /// Stop listening and return the timings captured so far
    pub async fn collect(self) -> CollectedPaints {
        self.task.abort();
        self.collected.lock().await.clone()
    }
}

/// Paint timing collector
#[derive(Debug, Clone, Default)]
pub struct PaintMetricsCollector {
    _private: (),
}

impl PaintMetricsCollector {
    /// Create a new collector
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Inject the timing script into a page
    ///
    /// Must be called before navigating; the script is registered with
    /// `addScriptToEvaluateOnNewDocument` so it runs ahead of any page
    /// scripts.
    pub async fn inject_into_page(&self, page: &Page) -> Result<()> {
        debug!("Injecting paint timing script");
        let params = AddScriptToEvaluateOnNewDocumentParams::new(Self::timing_script());
        page.execute(params)
            .await
            .context("Failed to inject timing script")?;
        Ok(())
    }

    /// Start accumulating metrics in the background
    ///
    /// Call this before navigating so measurements logged during page load
    /// are not missed.
    pub async fn start_collecting(&self, page: &Page) -> Result<MetricsHandle> {
        let collected = Arc::new(Mutex::new(CollectedPaints::default()));
        let sink = collected.clone();

        let mut events = page
            .event_listener::<EventConsoleApiCalled>()
            .await
            .context("Failed to subscribe to console events")?;

        let task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Some(metric) = metric_from_event(&event) {
                    debug!("Captured {}: {:.1}ms", metric.name, metric.value);
                    sink.lock().await.record(&metric);
                }
            }
        });

        Ok(MetricsHandle { collected, task })
    }

    /// The JavaScript injected into every audited page
    fn timing_script() -> String {
        r#"
(function() {
    'use strict';

    const PREFIX = '__AUDIT_METRIC__:';

    function report(name, value) {
        console.log(PREFIX + JSON.stringify({
            name: name,
            value: value,
            timestamp: Date.now()
        }));
    }

    try {
        new PerformanceObserver((list) => {
            for (const entry of list.getEntries()) {
                if (entry.name === 'first-contentful-paint') {
                    report('first-contentful-paint', entry.startTime);
                }
            }
        }).observe({ type: 'paint', buffered: true });
    } catch (e) {
        console.warn('paint observer not supported:', e);
    }

    try {
        new PerformanceObserver((list) => {
            const entries = list.getEntries();
            const last = entries[entries.length - 1];
            report('largest-paint', last.renderTime || last.loadTime);
        }).observe({ type: 'largest-contentful-paint', buffered: true });
    } catch (e) {
        console.warn('largest-contentful-paint observer not supported:', e);
    }

    addEventListener('load', () => {
        const nav = performance.getEntriesByType('navigation')[0];
        if (nav) {
            report('dom-content-loaded', nav.domContentLoadedEventEnd);
            report('load', nav.loadEventEnd || performance.now());
        }
    });
})();
"#
        .to_string()
    }
}

/// Pull a metric out of a console event, if the event carries one
fn metric_from_event(event: &EventConsoleApiCalled) -> Option<PaintMetric> {
    let first_arg = event.args.first()?;
    let message = first_arg.value.as_ref()?.as_str()?;
    parse_metric_line(message)
}

/// Parse a `__AUDIT_METRIC__:{json}` console line
fn parse_metric_line(message: &str) -> Option<PaintMetric> {
    let json = message.strip_prefix(METRIC_PREFIX)?;
    match serde_json::from_str(json) {
        Ok(metric) => Some(metric),
        Err(e) => {
            warn!("Failed to parse metric line {:?}: {}", json, e);
            None
        }
    }
}

/// Give late observers a chance to flush after the load event
pub const METRIC_SETTLE: Duration = Duration::from_millis(1500);
