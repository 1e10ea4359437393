//! Disposable browser process management
//!
//! Launches a headless Chrome instance for one audit run and tears it down
//! afterwards. The handle is consumed by [`BrowserHandle::kill`], so a
//! browser cannot outlive the audit that launched it.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tracing::{debug, info, warn};

static BROWSER_ID: AtomicU64 = AtomicU64::new(0);

/// A running disposable browser process
pub struct BrowserHandle {
    browser: Browser,
    handler: tokio::task::JoinHandle<()>,
    debug_port: u16,
}

impl BrowserHandle {
    /// Launch a headless browser with an ephemeral debugging port
    ///
    /// Prefers a Chrome for Testing install from the Puppeteer cache when one
    /// exists, and isolates the process with a unique user data directory.
    pub async fn launch() -> Result<Self> {
        let mut builder = BrowserConfig::builder();

        if let Some(chrome) = find_chrome_for_testing() {
            debug!("Using Chrome for Testing: {}", chrome.display());
            builder = builder.chrome_executable(chrome);
        }

        let config = builder
            .user_data_dir(unique_user_data_dir())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        info!("Launching browser");
        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;

        // Drive CDP events until the browser goes away.
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let debug_port = match parse_debug_port(browser.websocket_address()) {
            Some(port) => port,
            None => {
                warn!(
                    "Could not determine debugging port from {}",
                    browser.websocket_address()
                );
                0
            }
        };

        info!(port = debug_port, "Browser launched");
        Ok(Self {
            browser,
            handler: handle,
            debug_port,
        })
    }

    /// The remote-debugging port assigned to this browser process
    pub fn debug_port(&self) -> u16 {
        self.debug_port
    }

    /// Open a new page in this browser
    pub async fn new_page(&self, url: &str) -> Result<Page> {
        self.browser
            .new_page(url)
            .await
            .context("Failed to create page")
    }

    /// Kill the browser process and stop its event handler
    pub async fn kill(mut self) -> Result<()> {
        debug!("Closing browser");
        let closed = self
            .browser
            .close()
            .await
            .context("Failed to close browser");
        self.handler.abort();
        closed?;
        Ok(())
    }
}

/// Extract the port from a DevTools websocket address such as
/// `ws://127.0.0.1:35871/devtools/browser/<id>`
fn parse_debug_port(ws_address: &str) -> Option<u16> {
    let rest = ws_address.strip_prefix("ws://")?;
    let authority = rest.split('/').next()?;
    authority.rsplit(':').next()?.parse().ok()
}

/// Find Chrome for Testing installed by Puppeteer
fn find_chrome_for_testing() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    let cache = std::path::Path::new(&home).join(".cache/puppeteer/chrome");

    let entries = std::fs::read_dir(&cache).ok()?;
    let mut versions: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .collect();
    versions.sort_by_key(|v| std::cmp::Reverse(v.path()));

    for version_dir in versions {
        for candidate in [
            "chrome-linux64/chrome",
            "chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
            "chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
        ] {
            let path = version_dir.path().join(candidate);
            if path.exists() {
                return Some(path);
            }
        }
    }
    None
}

/// A user data directory no concurrent or stale browser can collide with
fn unique_user_data_dir() -> PathBuf {
    let id = BROWSER_ID.fetch_add(1, Ordering::SeqCst);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "perf-gate-{}-{}-{}",
        std::process::id(),
        id,
        timestamp
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_debug_port() {
        assert_eq!(
            parse_debug_port("ws://127.0.0.1:35871/devtools/browser/abc-123"),
            Some(35871)
        );
        assert_eq!(parse_debug_port("ws://localhost:9222/devtools/browser/x"), Some(9222));
    }

    #[test]
    fn test_parse_debug_port_rejects_garbage() {
        assert_eq!(parse_debug_port("http://127.0.0.1:9222/"), None);
        assert_eq!(parse_debug_port("ws://127.0.0.1/devtools"), None);
        assert_eq!(parse_debug_port(""), None);
    }

    #[test]
    fn test_user_data_dirs_are_unique() {
        let a = unique_user_data_dir();
        let b = unique_user_data_dir();
        assert_ne!(a, b);
    }
}
