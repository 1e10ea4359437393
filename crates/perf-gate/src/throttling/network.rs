//! Network throttling via the Network.emulateNetworkConditions CDP command

#![allow(deprecated)] // EmulateNetworkConditionsParams is deprecated but still functional

use anyhow::Result;
use chromiumoxide::cdp::browser_protocol::network::{
    ConnectionType, EmulateNetworkConditionsParams,
};
use chromiumoxide::Page;
use tracing::debug;

/// Predefined network throttling profiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NetworkProfile {
    /// Fast 3G network (1.6 Mbps down, 750 Kbps up, 562ms RTT)
    Fast3G,
    /// Slow 4G network (4 Mbps down, 3 Mbps up, 20ms RTT)
    Slow4G,
    /// No throttling
    #[default]
    None,
}

impl NetworkProfile {
    /// Download speed in bytes per second
    pub fn download_bps(&self) -> Option<u64> {
        match self {
            NetworkProfile::Fast3G => Some(1_600_000 / 8),
            NetworkProfile::Slow4G => Some(4_000_000 / 8),
            NetworkProfile::None => None,
        }
    }

    /// Upload speed in bytes per second
    pub fn upload_bps(&self) -> Option<u64> {
        match self {
            NetworkProfile::Fast3G => Some(750_000 / 8),
            NetworkProfile::Slow4G => Some(3_000_000 / 8),
            NetworkProfile::None => None,
        }
    }

    /// Round-trip time in milliseconds
    pub fn rtt_ms(&self) -> Option<u64> {
        match self {
            NetworkProfile::Fast3G => Some(562),
            NetworkProfile::Slow4G => Some(20),
            NetworkProfile::None => None,
        }
    }

    /// Download throughput for CDP (-1 means no throttling)
    pub fn download_throughput(&self) -> f64 {
        self.download_bps().map_or(-1.0, |bps| bps as f64)
    }

    /// Upload throughput for CDP (-1 means no throttling)
    pub fn upload_throughput(&self) -> f64 {
        self.upload_bps().map_or(-1.0, |bps| bps as f64)
    }

    /// Network latency in milliseconds
    pub fn latency(&self) -> f64 {
        self.rtt_ms().map_or(0.0, |rtt| rtt as f64)
    }
}

/// Network throttling controller
pub struct NetworkThrottler;

impl NetworkThrottler {
    /// Apply a network profile to a page
    pub async fn apply(page: &Page, profile: NetworkProfile) -> Result<()> {
        debug!(
            "Applying network throttling: latency={}ms, down={:.2} KB/s, up={:.2} KB/s",
            profile.latency(),
            profile.download_throughput() / 1024.0,
            profile.upload_throughput() / 1024.0
        );

        let params = EmulateNetworkConditionsParams::builder()
            .offline(false)
            .latency(profile.latency())
            .download_throughput(profile.download_throughput())
            .upload_throughput(profile.upload_throughput())
            .connection_type(ConnectionType::Cellular4g)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build network params: {}", e))?;

        page.execute(params).await?;
        Ok(())
    }

    /// Remove network throttling from a page
    pub async fn clear(page: &Page) -> Result<()> {
        debug!("Clearing network throttling");

        let params = EmulateNetworkConditionsParams::builder()
            .offline(false)
            .latency(0.0)
            .download_throughput(-1.0)
            .upload_throughput(-1.0)
            .connection_type(ConnectionType::None)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build network params: {}", e))?;

        page.execute(params).await?;
        Ok(())
    }
}
