//! Simulated constraints via the Chrome DevTools Protocol
//!
//! The audit runs under emulated mobile conditions by default: device
//! metrics, a CPU slowdown, and throttled network. Each constraint can be
//! switched off individually through the `disable_*` audit flags.

pub mod cpu;
pub mod device;
pub mod network;

pub use cpu::CpuThrottler;
pub use device::DeviceEmulator;
pub use network::{NetworkProfile, NetworkThrottler};
