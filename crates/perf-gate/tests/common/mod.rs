//! Shared helpers for integration tests

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static DIR_ID: AtomicU64 = AtomicU64::new(0);

/// A unique temp directory for one test
pub fn temp_dir(tag: &str) -> PathBuf {
    let id = DIR_ID.fetch_add(1, Ordering::SeqCst);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "perf-gate-test-{}-{}-{}-{}",
        tag,
        std::process::id(),
        id,
        timestamp
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// A document root with a minimal index.html
pub fn temp_site(tag: &str) -> PathBuf {
    let dir = temp_dir(tag);
    fs::write(
        dir.join("index.html"),
        "<!DOCTYPE html><html><head><title>Site under audit</title></head>\
         <body><h1>Hello</h1><p>Static content for the audit run.</p></body></html>",
    )
    .unwrap();
    dir
}
