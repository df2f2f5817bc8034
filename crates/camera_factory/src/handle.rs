//! Camera handle
//!
//! Exclusive owner of one device, enforcing the lifecycle order
//! open → start → (read | flush)* → stop → close.

use std::fmt;
use std::thread;
use std::time::Duration;

use contracts::{CameraBinding, CameraDevice, ContractError, ControlValue, DeviceInfo, Frame};
use tracing::{debug, instrument, trace, warn};

use crate::factory::RetryPolicy;

/// Handle lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Opened,
    Started,
    Stopped,
    Closed,
}

impl fmt::Display for HandleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Opened => "opened",
            Self::Started => "started",
            Self::Stopped => "stopped",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// One bound, opened camera
pub struct CameraHandle {
    binding: CameraBinding,
    device: Box<dyn CameraDevice>,
    state: HandleState,
}

impl CameraHandle {
    /// Open `device` for `binding`, retrying per `policy`.
    ///
    /// # Errors
    /// `ContractError::CameraOpen` once every attempt failed.
    #[instrument(
        name = "camera_handle_open",
        skip(binding, device, policy),
        fields(serial = %binding.serial, index = binding.device_index)
    )]
    pub fn open(
        binding: CameraBinding,
        mut device: Box<dyn CameraDevice>,
        policy: &RetryPolicy,
    ) -> Result<Self, ContractError> {
        let attempts = policy.attempts.max(1);

        for attempt in 1..=attempts {
            if device.open(&binding.config_path, binding.device_index) {
                debug!(attempt, "camera opened");
                return Ok(Self {
                    binding,
                    device,
                    state: HandleState::Opened,
                });
            }

            warn!(attempt, max = attempts, "camera open failed");
            if attempt < attempts {
                thread::sleep(policy.backoff);
            }
        }

        Err(ContractError::CameraOpen {
            serial: binding.serial.clone(),
            index: binding.device_index,
            attempts,
        })
    }

    /// Binding this handle was opened for
    pub fn binding(&self) -> &CameraBinding {
        &self.binding
    }

    /// Current lifecycle state
    pub fn state(&self) -> HandleState {
        self.state
    }

    /// Static device description
    pub fn device_info(&self) -> DeviceInfo {
        self.device.device_info()
    }

    /// Start streaming (Opened → Started)
    pub fn start(&mut self) -> Result<(), ContractError> {
        self.expect_state("start", &[HandleState::Opened])?;
        self.device.start()?;
        self.state = HandleState::Started;
        Ok(())
    }

    /// Stop streaming (Started → Stopped)
    pub fn stop(&mut self) -> Result<(), ContractError> {
        self.expect_state("stop", &[HandleState::Started])?;
        self.device.stop()?;
        self.state = HandleState::Stopped;
        Ok(())
    }

    /// Release the device (Opened | Stopped → Closed)
    pub fn close(&mut self) -> Result<(), ContractError> {
        self.expect_state("close", &[HandleState::Opened, HandleState::Stopped])?;
        self.device.close()?;
        self.state = HandleState::Closed;
        Ok(())
    }

    /// Stop if running, then close
    pub fn shutdown(&mut self) -> Result<(), ContractError> {
        if self.state == HandleState::Started {
            self.stop()?;
        }
        if self.state != HandleState::Closed {
            self.close()?;
        }
        Ok(())
    }

    /// Best-effort parameter write
    ///
    /// # Errors
    /// `ContractError::ControlWrite`; the device remains usable.
    pub fn set_control(&mut self, name: &str, value: ControlValue) -> Result<(), ContractError> {
        self.device
            .set_control(name, value)
            .map_err(|e| ContractError::ControlWrite {
                serial: self.binding.serial.clone(),
                name: name.to_string(),
                value,
                message: e.to_string(),
            })
    }

    /// Apply every control of the binding, logging failures.
    ///
    /// Returns the number of failed writes.
    pub fn apply_controls(&mut self) -> usize {
        let controls: Vec<(String, ControlValue)> = self
            .binding
            .controls
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect();

        let mut failures = 0;
        for (name, value) in controls {
            match self.set_control(&name, value) {
                Ok(()) => debug!(serial = %self.binding.serial, control = %name, value, "control written"),
                Err(e) => {
                    failures += 1;
                    warn!(error = %e, "control write failed, camera stays usable");
                }
            }
        }
        failures
    }

    /// Discard every frame buffered at the driver
    pub fn flush(&mut self) {
        if matches!(self.state, HandleState::Opened | HandleState::Started) {
            self.device.flush();
            trace!(serial = %self.binding.serial, "camera flushed");
        } else {
            warn!(serial = %self.binding.serial, state = %self.state, "flush ignored");
        }
    }

    /// Read one frame, waiting up to `timeout`.
    ///
    /// Returns None on timeout or when the camera is not streaming.
    pub fn read(&mut self, timeout: Duration) -> Option<Frame> {
        if self.state != HandleState::Started {
            return None;
        }
        self.device.read(timeout)
    }

    fn expect_state(
        &self,
        operation: &'static str,
        allowed: &[HandleState],
    ) -> Result<(), ContractError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ContractError::Lifecycle {
                serial: self.binding.serial.clone(),
                operation,
                state: self.state.to_string(),
            })
        }
    }
}

impl fmt::Debug for CameraHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraHandle")
            .field("serial", &self.binding.serial)
            .field("index", &self.binding.device_index)
            .field("state", &self.state)
            .finish()
    }
}
