//! Synchronized read loop core
//!
//! One tick reads every camera once, strictly in canonical order. The first
//! failed read aborts the tick; only a tick where every camera delivered
//! becomes a `FrameSet`.

use std::time::Duration;

use camera_factory::CameraRig;
use contracts::FrameSet;
use frame_convert::{FrameConverter, RawConverter};
use observability::TickOutcomeLabel;
use tracing::{debug, info, instrument, trace, warn};

use crate::fps::FpsAccountant;
use crate::state::LoopState;

/// Default target tick rate (frames per second)
pub const DEFAULT_TARGET_FPS: u32 = 10;

/// Failed reads tolerated before the streak marker is emitted
pub const DEFAULT_STREAK_THRESHOLD: u32 = 50;

/// Sync engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncEngineConfig {
    /// Target tick rate; each read waits at most `1000 / target_fps` ms
    pub target_fps: u32,
    /// Timeout streak threshold for the diagnostic marker
    pub streak_threshold: u32,
}

impl Default for SyncEngineConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            streak_threshold: DEFAULT_STREAK_THRESHOLD,
        }
    }
}

impl SyncEngineConfig {
    /// Per-read timeout derived from the target rate (one frame period)
    pub fn read_timeout(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.target_fps.max(1)))
    }
}

/// Classification of one tick
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// Every camera delivered
    Complete(FrameSet),
    /// Some but not all cameras delivered before a failure
    Partial { read: usize, expected: usize },
    /// The first camera already failed
    Empty,
}

impl TickOutcome {
    fn label(&self) -> TickOutcomeLabel {
        match self {
            Self::Complete(_) => TickOutcomeLabel::Complete,
            Self::Partial { .. } => TickOutcomeLabel::Partial,
            Self::Empty => TickOutcomeLabel::Empty,
        }
    }
}

/// Multi-camera synchronized read engine
pub struct SyncEngine {
    rig: CameraRig,
    converter: Box<dyn FrameConverter + Send>,
    fps: FpsAccountant,
    state: LoopState,
    config: SyncEngineConfig,
    read_timeout: Duration,
    timeouts_total: u64,
}

impl SyncEngine {
    /// Engine over a running rig, converting with `RawConverter`
    pub fn new(rig: CameraRig, config: SyncEngineConfig) -> Self {
        Self::with_converter(rig, Box::new(RawConverter), config)
    }

    pub fn with_converter(
        rig: CameraRig,
        converter: Box<dyn FrameConverter + Send>,
        config: SyncEngineConfig,
    ) -> Self {
        let fps = FpsAccountant::new(rig.len());
        Self {
            rig,
            converter,
            fps,
            state: LoopState::default(),
            read_timeout: config.read_timeout(),
            config,
            timeouts_total: 0,
        }
    }

    /// Bound camera count (the arity of every `FrameSet`)
    pub fn camera_count(&self) -> usize {
        self.rig.len()
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn config(&self) -> &SyncEngineConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Failed reads over the whole run
    pub fn timeouts_total(&self) -> u64 {
        self.timeouts_total
    }

    /// Frame counters of the open FPS window
    pub fn fps_counts(&self) -> &[u32] {
        self.fps.counts()
    }

    /// Run one tick
    #[instrument(level = "trace", name = "sync_tick", skip(self), fields(tick = self.state.tick_index))]
    pub fn tick(&mut self) -> TickOutcome {
        let expected = self.rig.len();
        let mut images = Vec::with_capacity(expected);
        let mut available = Vec::with_capacity(expected);

        for (camera, handle) in self.rig.handles_mut().iter_mut().enumerate() {
            let Some(frame) = handle.read(self.read_timeout) else {
                trace!(camera, serial = %handle.binding().serial, "read timed out");
                failed_read(
                    &mut self.state,
                    &mut self.timeouts_total,
                    self.config.streak_threshold,
                    camera,
                );
                break;
            };

            match self.converter.convert(&frame, handle.binding().color_mode) {
                Ok(image) => {
                    images.push(image);
                    available.push(frame.available_before);
                    if let Some(counts) = self.fps.record(camera) {
                        info!(fps = ?counts, "frames per second");
                        observability::record_fps(&counts);
                    }
                }
                Err(e) => {
                    warn!(camera, serial = %handle.binding().serial, error = %e, "frame conversion failed");
                    failed_read(
                        &mut self.state,
                        &mut self.timeouts_total,
                        self.config.streak_threshold,
                        camera,
                    );
                    break;
                }
            }
        }

        let read = images.len();
        let outcome = if read == 0 {
            TickOutcome::Empty
        } else if read < expected {
            warn!(
                read,
                expected,
                "desync: {read}/{expected} cameras returned data, flush recommended"
            );
            TickOutcome::Partial { read, expected }
        } else {
            self.state.tick_index += 1;
            let tick = self.state.tick_index;
            match FrameSet::from_tick(tick, images, expected) {
                Ok(frame_set) => {
                    debug!(tick, available_before = ?available, "tick complete");
                    TickOutcome::Complete(frame_set)
                }
                Err(_) => TickOutcome::Partial { read, expected },
            }
        };

        observability::record_tick(outcome.label(), read);
        outcome
    }

    /// Discard buffered frames on every camera and restart the tick epoch
    #[instrument(name = "sync_flush", skip(self), fields(cameras = self.rig.len()))]
    pub fn flush_all(&mut self) {
        for handle in self.rig.handles_mut() {
            handle.flush();
        }
        self.state.reset_tick();
        observability::record_flush();
        info!("all cameras flushed, tick index reset");
    }

    /// Restart the tick epoch without touching the cameras
    pub fn reset_tick_index(&mut self) {
        self.state.reset_tick();
    }

    /// Stop and close every camera in canonical order.
    ///
    /// Returns the number of cameras that failed to shut down.
    pub fn shutdown(&mut self) -> usize {
        self.rig.shutdown()
    }
}

/// Tally a read that produced no usable frame (timeout or bad buffer)
fn failed_read(state: &mut LoopState, timeouts_total: &mut u64, threshold: u32, camera: usize) {
    observability::record_read_timeout(camera);
    *timeouts_total += 1;
    if state.record_timeout(threshold) {
        debug!(threshold, "timeout streak marker");
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("cameras", &self.rig.len())
            .field("state", &self.state)
            .field("config", &self.config)
            .finish()
    }
}
