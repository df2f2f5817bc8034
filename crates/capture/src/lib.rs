//! # Capture
//!
//! Capture/export workflow layered on complete ticks, plus the output sinks
//! it writes to.
//!
//! - `CaptureWorkflow`: arming, periodic sampling, buffered frame sets, commit
//! - `ExportSink` / `BmpExporter`: one directory per batch, one bitmap per camera
//! - `LogPreview`: preview sink that scales and logs frame sets

mod export;
mod preview;
mod workflow;

pub use export::{BatchReport, BmpExporter, ExportSink};
pub use preview::{LogPreview, NullPreview};
pub use workflow::{CaptureWorkflow, CommitReport, DEFAULT_SAMPLE_INTERVAL};
