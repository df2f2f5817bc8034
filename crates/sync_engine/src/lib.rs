//! # Sync Engine
//!
//! Synchronized multi-camera read loop.
//!
//! Responsibilities:
//! - Tick: read every camera once in canonical order, abort on the first failure
//! - Classify ticks as complete, partial (desync) or empty
//! - Flush-based resync and per-camera FPS accounting
//! - Route operator commands and drive the session state machine
//!
//! ## Usage
//!
//! ```ignore
//! use sync_engine::{ExitFlag, Session, SyncEngine, SyncEngineConfig};
//!
//! let engine = SyncEngine::new(rig, SyncEngineConfig::default());
//! let mut session = Session::new(engine, Box::new(BmpExporter::new("images")), ExitFlag::new());
//!
//! let stats = session.run(&mut commands);
//! ```

mod command;
mod engine;
mod fps;
mod session;
mod state;

pub use command::{CommandRouter, Routed};
pub use engine::{
    SyncEngine, SyncEngineConfig, TickOutcome, DEFAULT_STREAK_THRESHOLD, DEFAULT_TARGET_FPS,
};
pub use fps::{FpsAccountant, FPS_WINDOW};
pub use session::{Session, SessionState, SessionStats};
pub use state::{ExitFlag, LoopState};
