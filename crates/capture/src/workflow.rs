//! Capture workflow state
//!
//! Two independent behaviors on complete ticks: continuous capture while
//! armed, and background sampling of every Nth tick regardless of arming.

use contracts::FrameSet;
use tracing::{debug, info, instrument, warn};

use crate::export::ExportSink;

/// Background sampling interval, in complete ticks
pub const DEFAULT_SAMPLE_INTERVAL: u64 = 5;

/// Result of a commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Batches written (one per buffered frame set)
    pub batches: usize,
    /// Images that failed to persist across all batches
    pub failed_images: usize,
}

/// Capture/export state
#[derive(Debug)]
pub struct CaptureWorkflow {
    armed: bool,
    buffered: Vec<FrameSet>,
    exported_count: u64,
    sample_interval: u64,
}

impl Default for CaptureWorkflow {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_INTERVAL)
    }
}

impl CaptureWorkflow {
    /// `sample_interval` of 0 disables background sampling
    pub fn new(sample_interval: u64) -> Self {
        Self {
            armed: false,
            buffered: Vec::new(),
            exported_count: 0,
            sample_interval,
        }
    }

    /// Request continuous capture until the next commit
    pub fn arm(&mut self) {
        if !self.armed {
            info!("capture armed");
        }
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Buffered sets, oldest first
    pub fn buffered(&self) -> &[FrameSet] {
        &self.buffered
    }

    /// Batches exported so far; never decreases
    pub fn exported_count(&self) -> u64 {
        self.exported_count
    }

    /// Whether a complete tick with this index gets buffered
    pub fn wants(&self, tick: u64) -> bool {
        self.armed || (self.sample_interval > 0 && tick % self.sample_interval == 0)
    }

    /// Offer the frame set of a complete tick.
    ///
    /// Returns true if it was buffered.
    pub fn observe(&mut self, frame_set: FrameSet) -> bool {
        if !self.wants(frame_set.tick()) {
            return false;
        }
        debug!(
            tick = frame_set.tick(),
            armed = self.armed,
            buffered = self.buffered.len() + 1,
            "frame set buffered"
        );
        self.buffered.push(frame_set);
        observability::record_buffered_sets(self.buffered.len());
        true
    }

    /// Export every buffered set as its own batch, then disarm.
    ///
    /// Per-image failures are logged and counted; earlier images of the same
    /// batch stay on disk and later ones are still attempted.
    #[instrument(name = "capture_commit", skip(self, sink), fields(sink = %sink.name(), sets = self.buffered.len()))]
    pub fn commit(&mut self, sink: &mut dyn ExportSink) -> CommitReport {
        let mut report = CommitReport::default();

        for frame_set in self.buffered.drain(..) {
            let batch = self.exported_count;
            let batch_report = sink.write_batch(batch, &frame_set);
            for failure in &batch_report.failures {
                warn!(batch, error = %failure, "image export failed");
            }
            observability::record_export_batch(batch_report.failures.len());

            report.batches += 1;
            report.failed_images += batch_report.failures.len();
            self.exported_count += 1;
        }

        self.armed = false;
        observability::record_buffered_sets(0);
        info!(
            batches = report.batches,
            failed_images = report.failed_images,
            exported_total = self.exported_count,
            "commit finished"
        );
        report
    }
}
