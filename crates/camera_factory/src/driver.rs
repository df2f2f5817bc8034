//! Camera driver abstraction
//!
//! Enumerates devices and hands out device objects; everything after that
//! goes through `CameraDevice`.

use std::sync::Arc;

use contracts::{CameraDevice, DiscoveredDevice};

use crate::error::Result;

/// Camera driver trait
///
/// Abstracts the vendor SDK's bus-level operations so a hardware adapter
/// and the simulated driver are interchangeable.
pub trait CameraDriver {
    /// Enumerate connected devices
    fn scan(&self) -> Result<Vec<DiscoveredDevice>>;

    /// Create the (unopened) device object for a discovered device
    ///
    /// # Returns
    /// None if the driver no longer knows the device
    fn create_device(&self, device: &DiscoveredDevice) -> Option<Box<dyn CameraDevice>>;
}

impl<D: CameraDriver + ?Sized> CameraDriver for Box<D> {
    fn scan(&self) -> Result<Vec<DiscoveredDevice>> {
        (**self).scan()
    }

    fn create_device(&self, device: &DiscoveredDevice) -> Option<Box<dyn CameraDevice>> {
        (**self).create_device(device)
    }
}

impl<D: CameraDriver + ?Sized> CameraDriver for Arc<D> {
    fn scan(&self) -> Result<Vec<DiscoveredDevice>> {
        (**self).scan()
    }

    fn create_device(&self, device: &DiscoveredDevice) -> Option<Box<dyn CameraDevice>> {
        (**self).create_device(device)
    }
}
