//! Mock camera implementation
//!
//! Implements `CameraDevice` with a simulated free-running sensor.
//! Used for tests and for rigs without attached hardware.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use contracts::{
    CameraDevice, CaptureConfig, ColorMode, ContractError, ControlValue, DeviceInfo, Frame, Serial,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

/// Mock camera configuration
#[derive(Debug, Clone)]
pub struct MockCameraConfig {
    /// Free-running frame rate (Hz)
    pub frequency_hz: f64,
    /// Random extra delay per frame, uniformly drawn from [0, jitter_ms]
    pub jitter_ms: f64,
    /// Image width
    pub width: u32,
    /// Image height
    pub height: u32,
    /// Significant bits per sample
    pub bit_width: u8,
    /// Raw buffer layout
    pub color_mode: ColorMode,
    /// Driver FIFO capacity; older frames are dropped when full
    pub fifo_depth: u32,
    /// Number of open calls that fail before one succeeds
    pub open_failures: u32,
    /// Control names whose writes are rejected
    pub failing_controls: Vec<String>,
    /// Seed for the jitter generator
    pub seed: u64,
}

impl Default for MockCameraConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 10.0,
            jitter_ms: 0.0,
            width: 640,
            height: 480,
            bit_width: 8,
            color_mode: ColorMode::Mono,
            fifo_depth: 4,
            open_failures: 0,
            failing_controls: Vec::new(),
            seed: 0,
        }
    }
}

impl MockCameraConfig {
    /// Tiny frames for unit tests
    pub fn small() -> Self {
        Self {
            width: 8,
            height: 4,
            ..Self::default()
        }
    }
}

/// One scripted read result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Frame,
    Timeout,
}

/// Calls observed by a mock camera
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockCameraCalls {
    pub open_attempts: u32,
    pub starts: u32,
    pub stops: u32,
    pub closes: u32,
    pub flushes: u32,
    pub reads: u32,
    pub timeouts: u32,
    /// Successful control writes, in call order
    pub controls: Vec<(String, ControlValue)>,
}

/// Shared view of a mock camera's call log, kept by tests after the camera
/// itself moved into a handle.
#[derive(Debug, Clone, Default)]
pub struct MockCameraProbe(Arc<Mutex<MockCameraCalls>>);

impl MockCameraProbe {
    /// Snapshot of the calls so far
    pub fn calls(&self) -> MockCameraCalls {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockCameraCalls> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

enum Timing {
    /// Frames appear on a clock
    FreeRunning {
        next_due: Option<Instant>,
        queued: u32,
    },
    /// Read results come from a script, never sleeping
    Scripted(VecDeque<ScriptStep>),
}

/// Mock camera
pub struct MockCamera {
    serial: Serial,
    config: MockCameraConfig,
    timing: Timing,
    rng: StdRng,
    sequence: u64,
    probe: MockCameraProbe,
}

impl MockCamera {
    /// Create a free-running mock camera
    pub fn new(serial: Serial, config: MockCameraConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            serial,
            config,
            timing: Timing::FreeRunning {
                next_due: None,
                queued: 0,
            },
            rng,
            sequence: 0,
            probe: MockCameraProbe::default(),
        }
    }

    /// Create a mock camera whose reads follow `steps`, then always succeed
    pub fn scripted(
        serial: Serial,
        config: MockCameraConfig,
        steps: impl IntoIterator<Item = ScriptStep>,
    ) -> Self {
        let mut camera = Self::new(serial, config);
        camera.timing = Timing::Scripted(steps.into_iter().collect());
        camera
    }

    /// Handle on this camera's call log
    pub fn probe(&self) -> MockCameraProbe {
        self.probe.clone()
    }

    fn frame_interval(&mut self) -> Duration {
        let base = 1.0 / self.config.frequency_hz.max(f64::EPSILON);
        let jitter = if self.config.jitter_ms > 0.0 {
            self.rng.random_range(0.0..=self.config.jitter_ms) / 1000.0
        } else {
            0.0
        };
        Duration::from_secs_f64(base + jitter)
    }

    /// Enqueue every frame that became due up to `now`
    fn advance(&mut self, now: Instant) {
        let fifo_depth = self.config.fifo_depth.max(1);
        loop {
            let Timing::FreeRunning {
                next_due: Some(due),
                ..
            } = self.timing
            else {
                return;
            };
            if due > now {
                return;
            }
            let interval = self.frame_interval();
            if let Timing::FreeRunning { next_due, queued } = &mut self.timing {
                *queued = (*queued + 1).min(fifo_depth);
                *next_due = Some(due + interval);
            }
            self.sequence += 1;
        }
    }

    fn read_free_running(&mut self, timeout: Duration) -> Option<Frame> {
        let start = Instant::now();
        let deadline = start + timeout;
        self.advance(start);

        if self.queued() == 0 {
            let Timing::FreeRunning {
                next_due: Some(due),
                ..
            } = self.timing
            else {
                return None;
            };
            let wake = due.min(deadline);
            thread::sleep(wake.saturating_duration_since(start));
            self.advance(Instant::now());
        }

        let Timing::FreeRunning { queued, .. } = &mut self.timing else {
            return None;
        };
        if *queued == 0 {
            return None;
        }
        let available_before = *queued;
        *queued -= 1;
        Some(self.make_frame(available_before))
    }

    fn read_scripted(&mut self) -> Option<Frame> {
        let Timing::Scripted(steps) = &mut self.timing else {
            return None;
        };
        let available_before = steps.len().max(1) as u32;
        match steps.pop_front().unwrap_or(ScriptStep::Frame) {
            ScriptStep::Frame => {
                self.sequence += 1;
                Some(self.make_frame(available_before))
            }
            ScriptStep::Timeout => None,
        }
    }

    fn queued(&self) -> u32 {
        match self.timing {
            Timing::FreeRunning { queued, .. } => queued,
            Timing::Scripted(_) => 0,
        }
    }

    /// Diagonal gradient shifted by the frame sequence number
    fn make_frame(&self, available_before: u32) -> Frame {
        let capture = CaptureConfig {
            width: self.config.width,
            height: self.config.height,
            bit_width: self.config.bit_width,
        };
        let samples_per_row = self.config.width as usize * self.config.color_mode.samples_per_pixel();
        let bytes_per_sample = capture.bytes_per_sample();
        let shift = u32::from(capture.bit_width.saturating_sub(8));
        let mut data =
            Vec::with_capacity(samples_per_row * self.config.height as usize * bytes_per_sample);

        for y in 0..self.config.height as usize {
            for x in 0..samples_per_row {
                let value = ((x + y) as u64).wrapping_add(self.sequence) as u8;
                if bytes_per_sample == 1 {
                    data.push(value);
                } else {
                    data.extend_from_slice(&(u16::from(value) << shift).to_le_bytes());
                }
            }
        }

        Frame {
            data: Bytes::from(data),
            capture,
            available_before,
        }
    }
}

impl CameraDevice for MockCamera {
    fn open(&mut self, config_path: &Path, index: u32) -> bool {
        let mut calls = self.probe.lock();
        calls.open_attempts += 1;
        let ok = calls.open_attempts > self.config.open_failures;
        debug!(
            serial = %self.serial,
            index,
            path = %config_path.display(),
            ok,
            "mock camera open"
        );
        ok
    }

    fn start(&mut self) -> Result<(), ContractError> {
        self.probe.lock().starts += 1;
        if let Timing::FreeRunning { next_due, queued } = &mut self.timing {
            *next_due = Some(Instant::now());
            *queued = 0;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ContractError> {
        self.probe.lock().stops += 1;
        if let Timing::FreeRunning { next_due, .. } = &mut self.timing {
            *next_due = None;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), ContractError> {
        self.probe.lock().closes += 1;
        Ok(())
    }

    fn set_control(&mut self, name: &str, value: ControlValue) -> Result<(), ContractError> {
        if self.config.failing_controls.iter().any(|c| c == name) {
            return Err(ContractError::driver(format!("register write '{name}' rejected")));
        }
        self.probe.lock().controls.push((name.to_string(), value));
        Ok(())
    }

    fn flush(&mut self) {
        self.probe.lock().flushes += 1;
        let now = Instant::now();
        self.advance(now);
        if let Timing::FreeRunning { queued, .. } = &mut self.timing {
            *queued = 0;
        }
    }

    fn read(&mut self, timeout: Duration) -> Option<Frame> {
        let frame = if matches!(self.timing, Timing::Scripted(_)) {
            self.read_scripted()
        } else {
            self.read_free_running(timeout)
        };

        let mut calls = self.probe.lock();
        calls.reads += 1;
        if frame.is_none() {
            calls.timeouts += 1;
        }
        trace!(serial = %self.serial, ok = frame.is_some(), "mock read");
        frame
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            serial: self.serial.clone(),
            model: "SIM-USB3".to_string(),
            firmware: "sim-1.0".to_string(),
            usb_type: "USB3".to_string(),
        }
    }
}
