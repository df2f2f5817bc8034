//! RigConfig - Config Loader output
//!
//! Describes which physical camera (by serial) uses which device profile and
//! where it sits in the canonical per-tick order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::Serial;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete rig configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Serial -> profile name
    pub serials: BTreeMap<Serial, String>,

    /// Profile name -> profile
    pub profiles: BTreeMap<String, CameraProfile>,
}

/// Per-profile acquisition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraProfile {
    /// Device configuration file, relative to the rig file's directory
    pub file: PathBuf,

    /// Canonical order key (ascending)
    pub order: i64,

    /// Pixel layout of the raw buffers this device delivers
    #[serde(default)]
    pub color_mode: ColorMode,

    /// Control writes applied after start (name -> value)
    #[serde(default = "default_controls")]
    pub controls: BTreeMap<String, i64>,
}

/// Exposure and gain written to every camera unless a profile overrides them.
pub fn default_controls() -> BTreeMap<String, i64> {
    BTreeMap::from([
        ("setExposureTime".to_string(), 30_000),
        ("setAnalogueGain".to_string(), 1),
    ])
}

/// Raw buffer color layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Single-channel luminance
    #[default]
    Mono,
    /// Bayer mosaic, RGGB
    BayerRg,
    /// Bayer mosaic, GRBG
    BayerGr,
    /// Bayer mosaic, GBRG
    BayerGb,
    /// Bayer mosaic, BGGR
    BayerBg,
    /// Packed YUV 4:2:2 (Y0 U Y1 V)
    Yuyv,
    /// Interleaved RGB
    Rgb,
    /// Interleaved BGR
    Bgr,
}

impl ColorMode {
    /// Raw samples per pixel in the driver buffer
    pub fn samples_per_pixel(self) -> usize {
        match self {
            Self::Mono | Self::BayerRg | Self::BayerGr | Self::BayerGb | Self::BayerBg => 1,
            Self::Yuyv => 2,
            Self::Rgb | Self::Bgr => 3,
        }
    }
}

/// Resolved binding of one discovered device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraBinding {
    /// Device serial
    pub serial: Serial,
    /// Index assigned at enumeration time
    pub device_index: u32,
    /// Canonical order key
    pub order_key: i64,
    /// Absolute (or rig-relative resolved) device configuration path
    pub config_path: PathBuf,
    /// Raw buffer color layout
    pub color_mode: ColorMode,
    /// Control writes applied after start
    pub controls: BTreeMap<String, i64>,
}

impl CameraBinding {
    /// Sort bindings into canonical tick order (ascending `order_key`).
    ///
    /// Ties keep their enumeration order.
    pub fn sort_canonical(bindings: &mut [CameraBinding]) {
        bindings.sort_by_key(|b| b.order_key);
    }
}
