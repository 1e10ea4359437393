//! Paint and navigation timing collection
//!
//! The collector injects a small script that observes paint events and
//! navigation timing, and reports each measurement through `console.log`
//! with a recognizable prefix. The Rust side subscribes to
//! `Runtime.consoleAPICalled` events and accumulates the values.
//!
//! # Example
//!
//! ```no_run
//! use perf_gate::metrics::PaintMetricsCollector;
//! # use chromiumoxide::Page;
//!
//! # async fn example(page: &Page) -> anyhow::Result<()> {
//! let collector = PaintMetricsCollector::new();
//! collector.inject_into_page(page).await?;
//! let handle = collector.start_collecting(page).await?;
//!
//! // Navigate and let the page settle...
//!
//! let paints = handle.collect().await;
//! println!("FCP: {:?}ms", paints.first_contentful_paint);
//! # Ok(())
//! # }
//! ```

pub mod paint;

// Re-export commonly used types
pub use paint::{CollectedPaints, MetricsHandle, PaintMetric, PaintMetricsCollector};
