//! Browser availability gating for integration tests
//!
//! Tests that need a real Chrome are skipped when `SKIP_BROWSER_TESTS` is
//! set or when no Chrome install can be found.

use perf_gate::browser::BrowserHandle;

/// Whether browser tests are disabled through the environment
pub fn should_skip() -> bool {
    std::env::var("SKIP_BROWSER_TESTS").is_ok()
}

/// Probe for a usable Chrome install
///
/// Returns `false` when no Chrome can be found (the test should skip) and
/// panics on any other launch failure, so real breakage stays visible.
pub async fn require_chrome() -> bool {
    match BrowserHandle::launch().await {
        Ok(browser) => {
            browser.kill().await.expect("failed to close probe browser");
            true
        }
        Err(e) => {
            let rendered = format!("{e:#}");
            if rendered.contains("auto detect") {
                eprintln!("Skipping: no Chrome install found ({rendered})");
                false
            } else {
                panic!("Browser launch failed: {rendered}");
            }
        }
    }
}

/// Skip the current test when browser tests are disabled or Chrome is absent
#[macro_export]
macro_rules! skip_if_no_chrome {
    () => {
        if browser::should_skip() {
            eprintln!("Skipping: SKIP_BROWSER_TESTS is set");
            return;
        }
        if !browser::require_chrome().await {
            return;
        }
    };
}
