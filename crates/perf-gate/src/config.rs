//! Run configuration
//!
//! This module provides TOML-based configuration for audit runs: the static
//! server's document root and port, the audit flags, the opaque audit config
//! passed through to the engine, and the build-gating threshold.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::reporter::ReportFormat;

/// Main configuration structure loaded from TOML files
///
/// Every section is optional; an empty file yields the baked-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Static server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Audit flags
    #[serde(default)]
    pub flags: AuditFlags,
    /// Opaque audit configuration, passed through to the engine unmodified
    #[serde(default)]
    pub audit: AuditConfig,
    /// Pass/fail threshold settings
    #[serde(default)]
    pub threshold: ThresholdConfig,
}

impl RunnerConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }
}

/// Static file server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Document root served as static content
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Local port to bind (0 picks an ephemeral port)
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            port: default_port(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("./public")
}

fn default_port() -> u16 {
    8865
}

/// Flags controlling a single audit run
///
/// This is an immutable value type: the browser's assigned debugging port is
/// merged in with [`AuditFlags::with_port`], which returns a fresh value
/// instead of mutating shared state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditFlags {
    /// Persist intermediate artifacts (raw results JSON, page snapshot)
    /// next to the report
    #[serde(default = "default_true")]
    pub save_assets: bool,
    /// Remote-debugging port of the launched browser. Assigned per run,
    /// not read from configuration.
    #[serde(default)]
    pub port: u16,
    /// Skip mobile device metrics emulation during the audit
    #[serde(default = "default_true")]
    pub disable_device_emulation: bool,
    /// Skip the simulated CPU slowdown during the audit
    #[serde(default = "default_true")]
    pub disable_cpu_throttling: bool,
    /// Skip the simulated network conditions during the audit
    #[serde(default = "default_true")]
    pub disable_network_throttling: bool,
    /// Log verbosity for the run
    #[serde(default)]
    pub log_level: LogLevel,
    /// Report format and destination
    #[serde(default)]
    pub output: OutputConfig,
}

impl AuditFlags {
    /// Return a copy of these flags carrying the browser's debugging port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

impl Default for AuditFlags {
    fn default() -> Self {
        Self {
            save_assets: true,
            port: 0,
            disable_device_emulation: true,
            disable_cpu_throttling: true,
            disable_network_throttling: true,
            log_level: LogLevel::default(),
            output: OutputConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Log verbosity levels recognized by the `log_level` flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No log output
    Silent,
    /// Errors only
    Error,
    /// Informational output
    #[default]
    Info,
    /// Debug-level detail
    Verbose,
}

impl LogLevel {
    /// The default tracing filter directive for this level
    pub fn as_directive(&self) -> &'static str {
        match self {
            Self::Silent => "off",
            Self::Error => "error",
            Self::Info => "info",
            Self::Verbose => "debug",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Silent => "silent",
            Self::Error => "error",
            Self::Info => "info",
            Self::Verbose => "verbose",
        })
    }
}

/// Report format and destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Report format written on success
    #[serde(default)]
    pub format: ReportFormat,
    /// Report path, overwritten on every run
    #[serde(default = "default_report_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            path: default_report_path(),
        }
    }
}

fn default_report_path() -> PathBuf {
    PathBuf::from("report.html")
}

/// Opaque audit configuration, e.g. restricting which checks are recorded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// When set, only the named audits are recorded. The
    /// `first-meaningful-paint` audit is always recorded regardless, since
    /// the threshold check depends on it.
    pub only_audits: Option<Vec<String>>,
}

impl AuditConfig {
    /// Whether an audit with the given name should be recorded
    pub fn wants(&self, name: &str) -> bool {
        match &self.only_audits {
            None => true,
            Some(names) => names.iter().any(|n| n == name),
        }
    }
}

/// Pass/fail threshold settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Budget for first meaningful paint in milliseconds
    #[serde(default = "default_fmp_budget")]
    pub first_meaningful_paint_max_ms: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            first_meaningful_paint_max_ms: default_fmp_budget(),
        }
    }
}

fn default_fmp_budget() -> f64 {
    3000.0
}
