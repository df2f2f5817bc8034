//! Run loop orchestration.

mod bus;
mod input;
mod orchestrator;
mod simulated;
mod stats;

pub use bus::CameraBus;
pub use input::{spawn_keyboard_reader, ChannelCommands};
pub use orchestrator::{Pipeline, PipelineConfig};
pub use simulated::{simulated_driver, SimulationConfig};
pub use stats::RunSummary;
