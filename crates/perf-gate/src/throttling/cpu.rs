//! CPU throttling via the Emulation.setCPUThrottlingRate CDP command

use anyhow::Result;
use chromiumoxide::cdp::browser_protocol::emulation::SetCpuThrottlingRateParams;
use chromiumoxide::Page;
use tracing::debug;

/// CPU throttling controller
pub struct CpuThrottler;

impl CpuThrottler {
    /// Apply a CPU slowdown to a page
    ///
    /// The rate is a multiplier: 1.0 is full speed, 4.0 emulates a mid-tier
    /// mobile device.
    pub async fn apply(page: &Page, rate: f64) -> Result<()> {
        validate_rate(rate)?;

        debug!("Applying {}x CPU slowdown", rate);

        let params = SetCpuThrottlingRateParams::builder()
            .rate(rate)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build CPU params: {}", e))?;

        page.execute(params).await?;
        Ok(())
    }

    /// Remove CPU throttling by resetting the rate to 1.0
    pub async fn clear(page: &Page) -> Result<()> {
        debug!("Clearing CPU throttling");

        let params = SetCpuThrottlingRateParams::builder()
            .rate(1.0)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build CPU params: {}", e))?;

        page.execute(params).await?;
        Ok(())
    }
}

/// Slowdown rates below 1.0 would speed the page up; reject them
fn validate_rate(rate: f64) -> Result<()> {
    if rate < 1.0 {
        anyhow::bail!("CPU throttling rate must be >= 1.0 (got {})", rate);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rate_rejects_speedups() {
        let err = validate_rate(0.5).unwrap_err();
        assert!(err.to_string().contains(">= 1.0"));
        assert!(err.to_string().contains("0.5"));

        assert!(validate_rate(0.0).is_err());
    }

    #[test]
    fn test_validate_rate_accepts_slowdowns() {
        for rate in [1.0, 2.0, 4.0, 6.0] {
            assert!(validate_rate(rate).is_ok());
        }
    }
}
