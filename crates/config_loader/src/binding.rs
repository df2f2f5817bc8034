//! Device binding resolution
//!
//! Maps each discovered serial to its profile and fixes the canonical order.

use std::path::{Path, PathBuf};

use contracts::{CameraBinding, ContractError, DiscoveredDevice, RigConfig};
use tracing::{debug, info};

/// Resolves discovered devices against a loaded rig configuration
#[derive(Debug, Clone)]
pub struct BindingResolver<'a> {
    rig: &'a RigConfig,
    base_dir: PathBuf,
}

impl<'a> BindingResolver<'a> {
    /// `base_dir` is the directory relative profile files resolve against.
    pub fn new(rig: &'a RigConfig, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            rig,
            base_dir: base_dir.into(),
        }
    }

    /// Resolve a single device.
    ///
    /// # Errors
    /// `ContractError::UnboundDevice` if the serial has no profile.
    pub fn resolve(&self, device: &DiscoveredDevice) -> Result<CameraBinding, ContractError> {
        let profile = self
            .rig
            .serials
            .get(device.serial.as_str())
            .and_then(|name| self.rig.profiles.get(name))
            .ok_or_else(|| ContractError::UnboundDevice {
                serial: device.serial.clone(),
            })?;

        let config_path = resolve_path(&self.base_dir, &profile.file);
        debug!(
            serial = %device.serial,
            index = device.index,
            order = profile.order,
            path = %config_path.display(),
            "device bound"
        );

        Ok(CameraBinding {
            serial: device.serial.clone(),
            device_index: device.index,
            order_key: profile.order,
            config_path,
            color_mode: profile.color_mode,
            controls: profile.controls.clone(),
        })
    }

    /// Resolve every device and sort into canonical order.
    ///
    /// Fails on the first unbound serial; no partial rig is returned.
    pub fn resolve_all(
        &self,
        devices: &[DiscoveredDevice],
    ) -> Result<Vec<CameraBinding>, ContractError> {
        let mut bindings = devices
            .iter()
            .map(|device| self.resolve(device))
            .collect::<Result<Vec<_>, _>>()?;

        CameraBinding::sort_canonical(&mut bindings);

        info!(
            order = ?bindings.iter().map(|b| b.serial.as_str()).collect::<Vec<_>>(),
            "canonical camera order fixed"
        );
        Ok(bindings)
    }
}

fn resolve_path(base_dir: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        base_dir.join(file)
    }
}
