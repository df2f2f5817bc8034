//! CameraFactory core implementation
//!
//! Opens bound cameras, brings them to streaming state and owns them as a
//! `CameraRig` until teardown.

use std::time::Duration;

use contracts::{CameraBinding, DiscoveredDevice};
use tracing::{error, info, instrument, warn};

use crate::driver::CameraDriver;
use crate::error::{CameraFactoryError, Result};
use crate::handle::CameraHandle;

/// Bounded open retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total open attempts
    pub attempts: u32,
    /// Wait between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Camera Factory
///
/// Spawns handles for resolved bindings and provides rollback on failure.
pub struct CameraFactory<D: CameraDriver> {
    driver: D,
    retry: RetryPolicy,
    verbose: bool,
}

impl<D: CameraDriver> CameraFactory<D> {
    /// Create a new CameraFactory with the default retry policy
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            retry: RetryPolicy::default(),
            verbose: false,
        }
    }

    /// Override the open retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Dump device information after each open
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Underlying driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Enumerate connected devices
    ///
    /// # Errors
    /// Scan failure, or `NoDevices` on an empty bus
    #[instrument(name = "camera_factory_scan", skip(self))]
    pub fn scan(&self) -> Result<Vec<DiscoveredDevice>> {
        let devices = self.driver.scan()?;
        if devices.is_empty() {
            return Err(CameraFactoryError::NoDevices);
        }

        info!(count = devices.len(), "devices found");
        for device in &devices {
            info!(index = device.index, serial = %device.serial, "device");
        }
        Ok(devices)
    }

    /// Open, start and configure every binding, preserving the given order.
    ///
    /// # Atomicity
    /// If any camera fails, every camera opened so far is shut down before
    /// the error is returned.
    #[instrument(
        name = "camera_factory_open_rig",
        skip(self, bindings),
        fields(camera_count = bindings.len())
    )]
    pub fn open_rig(&self, bindings: &[CameraBinding]) -> Result<CameraRig> {
        let mut handles: Vec<CameraHandle> = Vec::with_capacity(bindings.len());

        for binding in bindings {
            match self.open_camera(binding) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    warn!(
                        error = %e,
                        serial = %binding.serial,
                        "camera bring-up failed, rolling back opened cameras"
                    );
                    let mut partial = CameraRig { handles };
                    partial.shutdown();
                    return Err(e);
                }
            }
        }

        info!(cameras = handles.len(), "camera rig ready");
        Ok(CameraRig { handles })
    }

    #[instrument(
        name = "camera_factory_open_camera",
        skip(self, binding),
        fields(serial = %binding.serial, index = binding.device_index)
    )]
    fn open_camera(&self, binding: &CameraBinding) -> Result<CameraHandle> {
        let descriptor = DiscoveredDevice {
            index: binding.device_index,
            serial: binding.serial.clone(),
        };
        let device = self.driver.create_device(&descriptor).ok_or_else(|| {
            CameraFactoryError::DeviceMissing {
                serial: binding.serial.clone(),
                index: binding.device_index,
            }
        })?;

        info!(path = %binding.config_path.display(), "opening camera");
        let mut handle = CameraHandle::open(binding.clone(), device, &self.retry)?;

        if self.verbose {
            let device_info = handle.device_info();
            info!(
                serial = %device_info.serial,
                model = %device_info.model,
                firmware = %device_info.firmware,
                usb_type = %device_info.usb_type,
                "device info"
            );
        }

        if let Err(source) = handle.start() {
            if let Err(e) = handle.close() {
                error!(error = %e, "failed to close camera after start failure");
            }
            return Err(CameraFactoryError::StartFailed {
                serial: binding.serial.clone(),
                source,
            });
        }

        handle.apply_controls();
        handle.flush();
        Ok(handle)
    }
}

/// Running cameras in canonical order
#[derive(Debug)]
pub struct CameraRig {
    handles: Vec<CameraHandle>,
}

impl CameraRig {
    /// Wrap already-opened handles (canonical order is the caller's)
    pub fn from_handles(handles: Vec<CameraHandle>) -> Self {
        Self { handles }
    }

    /// Number of cameras
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Handles in canonical order
    pub fn handles(&self) -> &[CameraHandle] {
        &self.handles
    }

    /// Mutable handles in canonical order
    pub fn handles_mut(&mut self) -> &mut [CameraHandle] {
        &mut self.handles
    }

    /// Stop and close every camera in canonical order.
    ///
    /// Failures are logged and do not stop the remaining cameras from being
    /// released. Returns the number of cameras that failed to shut down.
    #[instrument(name = "camera_rig_shutdown", skip(self), fields(camera_count = self.handles.len()))]
    pub fn shutdown(&mut self) -> usize {
        info!("starting teardown");
        let mut failures = 0;

        for handle in &mut self.handles {
            if let Err(e) = handle.shutdown() {
                failures += 1;
                error!(
                    serial = %handle.binding().serial,
                    error = %e,
                    "failed to release camera"
                );
            }
        }

        info!(failures, "teardown completed");
        failures
    }
}
