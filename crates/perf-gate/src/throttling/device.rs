//! Mobile device emulation via Emulation.setDeviceMetricsOverride

use anyhow::Result;
use chromiumoxide::cdp::browser_protocol::emulation::{
    ClearDeviceMetricsOverrideParams, SetDeviceMetricsOverrideParams,
    SetTouchEmulationEnabledParams,
};
use chromiumoxide::Page;
use tracing::debug;

// A typical mid-range phone viewport.
const VIEWPORT_WIDTH: i64 = 360;
const VIEWPORT_HEIGHT: i64 = 640;
const DEVICE_SCALE_FACTOR: f64 = 2.0;

/// Device metrics emulation controller
pub struct DeviceEmulator;

impl DeviceEmulator {
    /// Emulate a mobile device viewport with touch input on a page
    pub async fn apply(page: &Page) -> Result<()> {
        debug!(
            "Emulating mobile device ({}x{} @{}x)",
            VIEWPORT_WIDTH, VIEWPORT_HEIGHT, DEVICE_SCALE_FACTOR
        );

        let metrics = SetDeviceMetricsOverrideParams::builder()
            .width(VIEWPORT_WIDTH)
            .height(VIEWPORT_HEIGHT)
            .device_scale_factor(DEVICE_SCALE_FACTOR)
            .mobile(true)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build device params: {}", e))?;
        page.execute(metrics).await?;

        let touch = SetTouchEmulationEnabledParams::builder()
            .enabled(true)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build touch params: {}", e))?;
        page.execute(touch).await?;

        Ok(())
    }

    /// Remove the device metrics override from a page
    pub async fn clear(page: &Page) -> Result<()> {
        debug!("Clearing device emulation");

        page.execute(ClearDeviceMetricsOverrideParams::default())
            .await?;

        let touch = SetTouchEmulationEnabledParams::builder()
            .enabled(false)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build touch params: {}", e))?;
        page.execute(touch).await?;

        Ok(())
    }
}
