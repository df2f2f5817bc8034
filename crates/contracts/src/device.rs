//! CameraDevice trait - driver capability interface
//!
//! The sync loop never touches driver internals; it only sees this trait.
//! A driver-backed adapter (vendor SDK through FFI) and the simulated camera
//! implement it the same way.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ContractError, Frame, Serial};

/// Control register value
pub type ControlValue = i64;

/// A device found by a driver scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    /// Index assigned at enumeration time
    pub index: u32,
    /// Device serial
    pub serial: Serial,
}

/// Static device description, dumped at startup in verbose mode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub serial: Serial,
    pub model: String,
    pub firmware: String,
    pub usb_type: String,
}

/// Camera capability interface
///
/// Lifecycle order is `open` → `start` → (`read` | `flush`)* → `stop` → `close`.
/// Ownership is exclusive: one binding, one device, no sharing.
pub trait CameraDevice: Send {
    /// Open the device with its configuration file.
    ///
    /// Returns `false` on failure; the caller owns the retry policy.
    fn open(&mut self, config_path: &Path, index: u32) -> bool;

    /// Start streaming
    fn start(&mut self) -> Result<(), ContractError>;

    /// Stop streaming
    fn stop(&mut self) -> Result<(), ContractError>;

    /// Release the device
    fn close(&mut self) -> Result<(), ContractError>;

    /// Best-effort parameter write (exposure, gain, ...)
    fn set_control(&mut self, name: &str, value: ControlValue) -> Result<(), ContractError>;

    /// Discard every frame buffered at the driver
    fn flush(&mut self);

    /// Block up to `timeout` for the next frame.
    ///
    /// Returns `None` on timeout; never panics on a stalled device.
    fn read(&mut self, timeout: Duration) -> Option<Frame>;

    /// Static device description
    fn device_info(&self) -> DeviceInfo;
}
