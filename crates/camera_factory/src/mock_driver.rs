//! Mock camera driver
//!
//! Simulated bus with a fixed set of devices; supports injected failures
//! and scripted reads for unit tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use contracts::{CameraDevice, DiscoveredDevice, Serial};
use tracing::{debug, instrument};

use crate::driver::CameraDriver;
use crate::error::{CameraFactoryError, Result};
use crate::mock_camera::{MockCamera, MockCameraConfig, MockCameraProbe, ScriptStep};

/// Mock driver
#[derive(Default)]
pub struct MockCameraDriver {
    /// Devices in enumeration order
    devices: Vec<(Serial, MockCameraConfig)>,
    /// Scripted read sequences by serial
    scripts: HashMap<Serial, Vec<ScriptStep>>,
    /// Call logs of every device handed out
    probes: Mutex<HashMap<Serial, MockCameraProbe>>,
    /// Whether scan should fail
    fail_scan: bool,
}

impl MockCameraDriver {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a free-running device; enumeration index follows call order
    pub fn with_camera(mut self, serial: impl Into<Serial>, config: MockCameraConfig) -> Self {
        self.devices.push((serial.into(), config));
        self
    }

    /// Attach a device whose reads follow `steps`
    pub fn with_scripted_camera(
        mut self,
        serial: impl Into<Serial>,
        config: MockCameraConfig,
        steps: Vec<ScriptStep>,
    ) -> Self {
        let serial = serial.into();
        self.scripts.insert(serial.clone(), steps);
        self.devices.push((serial, config));
        self
    }

    /// Make `scan` fail
    pub fn failing_scan(mut self) -> Self {
        self.fail_scan = true;
        self
    }

    /// Call log of the device created for `serial`, if any
    pub fn probe(&self, serial: &str) -> Option<MockCameraProbe> {
        self.probes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(serial)
            .cloned()
    }
}

impl CameraDriver for MockCameraDriver {
    #[instrument(name = "mock_driver_scan", skip(self))]
    fn scan(&self) -> Result<Vec<DiscoveredDevice>> {
        if self.fail_scan {
            return Err(CameraFactoryError::scan("simulated bus failure"));
        }
        let devices: Vec<DiscoveredDevice> = self
            .devices
            .iter()
            .enumerate()
            .map(|(index, (serial, _))| DiscoveredDevice {
                index: index as u32,
                serial: serial.clone(),
            })
            .collect();
        debug!(count = devices.len(), "mock scan complete");
        Ok(devices)
    }

    fn create_device(&self, device: &DiscoveredDevice) -> Option<Box<dyn CameraDevice>> {
        let (serial, config) = self.devices.get(device.index as usize)?;
        if *serial != device.serial {
            return None;
        }

        let camera = match self.scripts.get(serial) {
            Some(steps) => MockCamera::scripted(serial.clone(), config.clone(), steps.clone()),
            None => MockCamera::new(serial.clone(), config.clone()),
        };
        self.probes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(serial.clone(), camera.probe());

        Some(Box::new(camera))
    }
}
