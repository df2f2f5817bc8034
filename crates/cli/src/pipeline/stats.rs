//! Run summary.

use std::path::PathBuf;

use serde::Serialize;
use sync_engine::SessionStats;

/// Everything reported when the loop has terminated
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Serials in canonical order (Frame Set position = index)
    pub cameras: Vec<String>,

    /// Target tick rate
    pub target_fps: u32,

    /// Per-read timeout derived from the target rate
    pub read_timeout_ms: u64,

    /// Where batches were written
    pub export_dir: PathBuf,

    /// Sets still buffered when the loop ended (never exported)
    pub pending_sets: usize,

    /// Loop statistics
    pub stats: SessionStats,
}

impl RunSummary {
    /// Complete ticks per second over the run
    pub fn tick_rate(&self) -> f64 {
        let secs = self.stats.duration.as_secs_f64();
        if secs > 0.0 {
            self.stats.ticks_complete as f64 / secs
        } else {
            0.0
        }
    }

    /// Share of ticks that were complete, as percentage
    pub fn complete_rate(&self) -> f64 {
        let total = self.stats.ticks_total();
        if total > 0 {
            (self.stats.ticks_complete as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Run Summary ===\n");

        println!("Rig");
        for (position, serial) in self.cameras.iter().enumerate() {
            println!("   ├─ camera{position}: {serial}");
        }
        println!(
            "   └─ target: {} fps ({} ms per read)",
            self.target_fps, self.read_timeout_ms
        );

        println!("\nTicks");
        println!("   ├─ Duration: {:.2}s", self.stats.duration.as_secs_f64());
        println!(
            "   ├─ Complete: {} ({:.1}%)",
            self.stats.ticks_complete,
            self.complete_rate()
        );
        println!("   ├─ Partial (desync): {}", self.stats.ticks_partial);
        println!("   ├─ Empty: {}", self.stats.ticks_empty);
        println!("   ├─ Read timeouts: {}", self.stats.read_timeouts);
        println!("   ├─ Flushes: {}", self.stats.flushes);
        println!("   └─ Complete ticks/s: {:.2}", self.tick_rate());

        println!("\nCapture");
        println!("   ├─ Sets buffered: {}", self.stats.sets_buffered);
        println!("   ├─ Batches exported: {}", self.stats.batches_exported);
        println!("   ├─ Failed images: {}", self.stats.failed_images);
        println!("   ├─ Left unexported: {}", self.pending_sets);
        println!("   └─ Export dir: {}", self.export_dir.display());

        if self.stats.release_failures > 0 {
            println!(
                "\nWarning: {} camera(s) failed to shut down cleanly",
                self.stats.release_failures
            );
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn summary(stats: SessionStats) -> RunSummary {
        RunSummary {
            cameras: vec!["A".into(), "B".into()],
            target_fps: 10,
            read_timeout_ms: 100,
            export_dir: PathBuf::from("images"),
            pending_sets: 0,
            stats,
        }
    }

    #[test]
    fn test_rates() {
        let s = summary(SessionStats {
            ticks_complete: 30,
            ticks_partial: 10,
            duration: Duration::from_secs(3),
            ..Default::default()
        });
        assert!((s.tick_rate() - 10.0).abs() < f64::EPSILON);
        assert!((s.complete_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rates_of_empty_run() {
        let s = summary(SessionStats::default());
        assert_eq!(s.tick_rate(), 0.0);
        assert_eq!(s.complete_rate(), 0.0);
    }

    #[test]
    fn test_json_shape() {
        let s = summary(SessionStats {
            duration: Duration::from_millis(1500),
            ..Default::default()
        });
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["cameras"][1], "B");
        assert_eq!(json["stats"]["duration"], 1500);
    }
}
