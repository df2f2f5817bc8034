//! # Camera Factory
//!
//! Camera handle factory module.
//!
//! Responsibilities:
//! - Scan the driver for devices
//! - Open bound cameras with bounded retry, start them, apply controls
//! - Own the handles of a running rig and tear them down in canonical order
//! - Provide a simulated driver for tests and for rigs without hardware

pub mod driver;
pub mod error;
pub mod factory;
pub mod handle;
pub mod mock_camera;
pub mod mock_driver;

pub use contracts::{CameraBinding, CameraDevice, DiscoveredDevice};
pub use driver::CameraDriver;
pub use error::{CameraFactoryError, Result};
pub use factory::{CameraFactory, CameraRig, RetryPolicy};
pub use handle::{CameraHandle, HandleState};
pub use mock_camera::{MockCamera, MockCameraCalls, MockCameraConfig, MockCameraProbe, ScriptStep};
pub use mock_driver::MockCameraDriver;
