//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the rig.
//! Business crates depend on this crate only, never the other way round.
//!
//! ## Time Model
//! - A tick is one attempted read across all bound cameras
//! - `FrameSet::tick` is the loop's tick index at the moment the set was completed

mod command;
mod device;
mod error;
mod frame;
mod preview;
mod rig;
mod serial;

pub use command::{Command, CommandSource};
pub use device::{CameraDevice, ControlValue, DeviceInfo, DiscoveredDevice};
pub use error::*;
pub use frame::*;
pub use preview::PreviewSink;
pub use rig::*;
pub use serial::Serial;
