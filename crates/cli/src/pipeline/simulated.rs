//! Simulated camera bus built from a rig configuration.
//!
//! Every serial of the rig becomes one free-running mock camera, enumerated
//! in serial order so the bus order generally differs from the canonical
//! order.

use camera_factory::{MockCameraConfig, MockCameraDriver};
use contracts::RigConfig;
use tracing::debug;

/// Simulated camera timing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Frame rate of each camera (Hz)
    pub fps: f64,
    /// Random extra delay per frame (ms)
    pub jitter_ms: f64,
}

impl SimulationConfig {
    /// `fps` falls back to `target_fps` when not given
    pub fn new(fps: Option<f64>, jitter_ms: f64, target_fps: u32) -> Self {
        Self {
            fps: fps.filter(|f| *f > 0.0).unwrap_or(f64::from(target_fps)),
            jitter_ms: jitter_ms.max(0.0),
        }
    }
}

/// One mock camera per configured serial
pub fn simulated_driver(rig: &RigConfig, sim: SimulationConfig) -> MockCameraDriver {
    let mut driver = MockCameraDriver::new();
    for (seed, (serial, profile_name)) in rig.serials.iter().enumerate() {
        let color_mode = rig
            .profiles
            .get(profile_name)
            .map(|profile| profile.color_mode)
            .unwrap_or_default();
        debug!(serial = %serial, profile = %profile_name, ?color_mode, "simulated camera");
        driver = driver.with_camera(
            serial.clone(),
            MockCameraConfig {
                frequency_hz: sim.fps,
                jitter_ms: sim.jitter_ms,
                color_mode,
                seed: seed as u64,
                ..MockCameraConfig::default()
            },
        );
    }
    driver
}
