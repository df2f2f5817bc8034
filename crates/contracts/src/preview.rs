//! PreviewSink trait - display output interface

use crate::FrameSet;

/// Display target for complete frame sets
///
/// Implementations must return promptly; the loop calls this between reads.
pub trait PreviewSink {
    /// Sink name (used for logging)
    fn name(&self) -> &str;

    /// Show one complete frame set
    fn show(&mut self, frame_set: &FrameSet);
}
