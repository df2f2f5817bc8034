//! Per-camera frame rate accounting
//!
//! Fixed one-second windows: counters accumulate until the window has
//! elapsed, are reported as one vector, then start again from zero.

use std::mem;
use std::time::{Duration, Instant};

/// Reporting window
pub const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Successful reads per camera over the current window
#[derive(Debug, Clone)]
pub struct FpsAccountant {
    counts: Vec<u32>,
    window: Duration,
    window_start: Instant,
}

impl FpsAccountant {
    pub fn new(cameras: usize) -> Self {
        Self::with_window(cameras, FPS_WINDOW, Instant::now())
    }

    pub fn with_window(cameras: usize, window: Duration, start: Instant) -> Self {
        Self {
            counts: vec![0; cameras],
            window,
            window_start: start,
        }
    }

    /// Counters of the open window, by camera position
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Count one successful read of `camera`; returns the finished window's
    /// counts if the window elapsed.
    pub fn record(&mut self, camera: usize) -> Option<Vec<u32>> {
        self.record_at(camera, Instant::now())
    }

    pub fn record_at(&mut self, camera: usize, now: Instant) -> Option<Vec<u32>> {
        if let Some(count) = self.counts.get_mut(camera) {
            *count += 1;
        }
        self.poll_at(now)
    }

    /// Close the window if it elapsed at `now`
    pub fn poll_at(&mut self, now: Instant) -> Option<Vec<u32>> {
        if now.saturating_duration_since(self.window_start) < self.window {
            return None;
        }
        let len = self.counts.len();
        let report = mem::replace(&mut self.counts, vec![0; len]);
        self.window_start = now;
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate_within_window() {
        let start = Instant::now();
        let mut fps = FpsAccountant::with_window(3, FPS_WINDOW, start);

        for camera in 0..3 {
            assert!(fps.record_at(camera, start).is_none());
        }
        assert!(fps.record_at(1, start + Duration::from_millis(500)).is_none());
        assert_eq!(fps.counts(), &[1, 2, 1]);
    }

    #[test]
    fn test_window_reports_and_resets() {
        let start = Instant::now();
        let mut fps = FpsAccountant::with_window(2, FPS_WINDOW, start);
        fps.record_at(0, start);
        fps.record_at(1, start);

        let report = fps.record_at(0, start + FPS_WINDOW).unwrap();
        assert_eq!(report, vec![2, 1]);
        assert_eq!(fps.counts(), &[0, 0]);

        // next window starts at the report time
        assert!(fps
            .record_at(0, start + FPS_WINDOW + Duration::from_millis(999))
            .is_none());
        assert!(fps.poll_at(start + FPS_WINDOW * 2).is_some());
    }

    #[test]
    fn test_out_of_range_camera_is_ignored() {
        let start = Instant::now();
        let mut fps = FpsAccountant::with_window(1, FPS_WINDOW, start);
        fps.record_at(4, start);
        assert_eq!(fps.counts(), &[0]);
    }
}
