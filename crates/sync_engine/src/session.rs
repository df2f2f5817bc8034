//! Session - the top-level loop state machine
//!
//! RUNNING: tick, hand complete sets to preview and capture, apply commands.
//! TERMINATING: every camera is stopped and closed in canonical order.
//! TERMINATED: nothing left to release.

use std::fmt;
use std::time::{Duration, Instant};

use capture::{CaptureWorkflow, ExportSink, NullPreview};
use contracts::{CommandSource, PreviewSink};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::command::{CommandRouter, Routed};
use crate::engine::{SyncEngine, TickOutcome};
use crate::state::ExitFlag;

/// Top-level loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Running,
    Terminating,
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "running",
            Self::Terminating => "terminating",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Run statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub ticks_complete: u64,
    pub ticks_partial: u64,
    pub ticks_empty: u64,
    pub read_timeouts: u64,
    pub sets_buffered: u64,
    pub batches_exported: u64,
    pub failed_images: u64,
    pub flushes: u64,
    pub commands: u64,
    pub release_failures: u64,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl SessionStats {
    pub fn ticks_total(&self) -> u64 {
        self.ticks_complete + self.ticks_partial + self.ticks_empty
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}

/// One run of the synchronized loop over an opened rig
pub struct Session {
    engine: SyncEngine,
    workflow: CaptureWorkflow,
    exporter: Box<dyn ExportSink + Send>,
    preview: Box<dyn PreviewSink + Send>,
    router: CommandRouter,
    exit: ExitFlag,
    state: SessionState,
    stats: SessionStats,
    tick_limit: Option<u64>,
}

impl Session {
    /// Session with a discarding preview; `exit` is the token the loop watches
    pub fn new(engine: SyncEngine, exporter: Box<dyn ExportSink + Send>, exit: ExitFlag) -> Self {
        Self {
            engine,
            workflow: CaptureWorkflow::default(),
            exporter,
            preview: Box::new(NullPreview),
            router: CommandRouter::new(exit.clone()),
            exit,
            state: SessionState::Running,
            stats: SessionStats::default(),
            tick_limit: None,
        }
    }

    pub fn with_preview(mut self, preview: Box<dyn PreviewSink + Send>) -> Self {
        self.preview = preview;
        self
    }

    pub fn with_workflow(mut self, workflow: CaptureWorkflow) -> Self {
        self.workflow = workflow;
        self
    }

    /// Request exit after `ticks` ticks of any outcome
    pub fn with_tick_limit(mut self, ticks: u64) -> Self {
        self.tick_limit = Some(ticks);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn workflow(&self) -> &CaptureWorkflow {
        &self.workflow
    }

    pub fn exit_flag(&self) -> &ExitFlag {
        &self.exit
    }

    /// Run until exit is requested, then release every camera.
    ///
    /// Opens with one flush of the whole rig. A session runs once; calling
    /// this on a terminated session returns its final statistics.
    #[instrument(
        name = "session_run",
        skip(self, commands),
        fields(cameras = self.engine.camera_count(), timeout_ms = self.engine.read_timeout().as_millis() as u64)
    )]
    pub fn run(&mut self, commands: &mut dyn CommandSource) -> &SessionStats {
        if self.state != SessionState::Running {
            warn!(state = %self.state, "session already finished");
            return &self.stats;
        }

        let started = Instant::now();
        info!(preview = self.preview.name(), "sync loop running");
        self.engine.flush_all();
        self.stats.flushes += 1;

        while !self.exit.is_set() {
            if self
                .tick_limit
                .is_some_and(|limit| self.stats.ticks_total() >= limit)
            {
                info!(ticks = self.stats.ticks_total(), "tick limit reached");
                self.exit.trigger();
                break;
            }

            self.step();

            while let Some(command) = commands.poll() {
                self.apply(command);
            }
        }

        self.stats.duration = started.elapsed();
        self.terminate();
        &self.stats
    }

    /// One tick plus its hand-off to preview and capture
    fn step(&mut self) {
        match self.engine.tick() {
            TickOutcome::Complete(frame_set) => {
                self.stats.ticks_complete += 1;
                self.preview.show(&frame_set);
                if self.workflow.observe(frame_set) {
                    self.stats.sets_buffered += 1;
                }
            }
            TickOutcome::Partial { .. } => self.stats.ticks_partial += 1,
            TickOutcome::Empty => self.stats.ticks_empty += 1,
        }
    }

    fn apply(&mut self, command: contracts::Command) {
        self.stats.commands += 1;
        let routed = self.router.route(
            command,
            &mut self.engine,
            &mut self.workflow,
            self.exporter.as_mut(),
        );
        match routed {
            Routed::Committed(report) => {
                self.stats.batches_exported += report.batches as u64;
                self.stats.failed_images += report.failed_images as u64;
            }
            Routed::Flushed => self.stats.flushes += 1,
            Routed::Quit | Routed::Armed => {}
        }
    }

    fn terminate(&mut self) {
        self.state = SessionState::Terminating;
        info!(state = %self.state, "releasing cameras");

        let failures = self.engine.shutdown();
        self.stats.release_failures = failures as u64;
        self.stats.read_timeouts = self.engine.timeouts_total();

        self.state = SessionState::Terminated;
        info!(
            state = %self.state,
            ticks = self.stats.ticks_total(),
            complete = self.stats.ticks_complete,
            buffered = self.workflow.buffered().len(),
            exported = self.workflow.exported_count(),
            "session finished"
        );
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("engine", &self.engine)
            .field("workflow", &self.workflow)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SyncEngineConfig;
    use camera_factory::{CameraFactory, MockCameraConfig, MockCameraDriver, RetryPolicy, ScriptStep};
    use capture::BmpExporter;
    use contracts::{default_controls, CameraBinding, ColorMode, Command, FrameSet, Serial};
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    const SERIALS: [&str; 3] = ["SIM0-0000-000A", "SIM0-0000-000B", "SIM0-0000-000C"];

    /// Commands released after a given number of loop iterations
    struct ScriptedCommands {
        round: u64,
        script: VecDeque<(u64, Command)>,
    }

    impl ScriptedCommands {
        fn new(script: impl IntoIterator<Item = (u64, Command)>) -> Self {
            Self {
                round: 0,
                script: script.into_iter().collect(),
            }
        }

        fn none() -> Self {
            Self::new([])
        }
    }

    impl CommandSource for ScriptedCommands {
        fn poll(&mut self) -> Option<Command> {
            // polled until None once per iteration
            match self.script.front() {
                Some((after, _)) if *after <= self.round + 1 => self.script.pop_front().map(|(_, c)| c),
                _ => {
                    self.round += 1;
                    None
                }
            }
        }
    }

    /// Records the ticks it was shown
    #[derive(Clone, Default)]
    struct RecordingPreview(Arc<Mutex<Vec<u64>>>);

    impl PreviewSink for RecordingPreview {
        fn name(&self) -> &str {
            "recording"
        }

        fn show(&mut self, frame_set: &FrameSet) {
            self.0.lock().unwrap().push(frame_set.tick());
        }
    }

    fn rig(
        scripts: [Vec<ScriptStep>; 3],
    ) -> (SyncEngine, CameraFactory<MockCameraDriver>) {
        let mut driver = MockCameraDriver::new();
        for (serial, steps) in SERIALS.iter().zip(scripts) {
            driver = driver.with_scripted_camera(*serial, MockCameraConfig::small(), steps);
        }
        let factory = CameraFactory::new(driver).with_retry(RetryPolicy {
            attempts: 1,
            backoff: Duration::ZERO,
        });
        let bindings: Vec<CameraBinding> = SERIALS
            .iter()
            .enumerate()
            .map(|(i, serial)| CameraBinding {
                serial: Serial::new(*serial),
                device_index: i as u32,
                order_key: i as i64,
                config_path: PathBuf::from("cam.cfg"),
                color_mode: ColorMode::Mono,
                controls: default_controls(),
            })
            .collect();
        let rig = factory.open_rig(&bindings).unwrap();
        (SyncEngine::new(rig, SyncEngineConfig::default()), factory)
    }

    fn all_frames() -> [Vec<ScriptStep>; 3] {
        [Vec::new(), Vec::new(), Vec::new()]
    }

    #[test]
    fn test_unarmed_run_samples_every_fifth_tick() {
        let dir = tempdir().unwrap();
        let (engine, _factory) = rig(all_frames());
        let mut session = Session::new(engine, Box::new(BmpExporter::new(dir.path())), ExitFlag::new())
            .with_tick_limit(12);

        let stats = session.run(&mut ScriptedCommands::none()).clone();

        assert_eq!(stats.ticks_complete, 12);
        assert_eq!(stats.sets_buffered, 2);
        let ticks: Vec<u64> = session.workflow().buffered().iter().map(|s| s.tick()).collect();
        assert_eq!(ticks, vec![5, 10]);
        assert_eq!(session.state(), SessionState::Terminated);
    }

    #[test]
    fn test_partial_ticks_are_never_shown_or_buffered() {
        let dir = tempdir().unwrap();
        let mut third = vec![ScriptStep::Frame; 4];
        third.push(ScriptStep::Timeout);
        let (engine, _factory) = rig([Vec::new(), Vec::new(), third]);

        let preview = RecordingPreview::default();
        let shown = preview.0.clone();
        let mut session = Session::new(engine, Box::new(BmpExporter::new(dir.path())), ExitFlag::new())
            .with_preview(Box::new(preview))
            .with_tick_limit(6);
        let stats = session.run(&mut ScriptedCommands::none()).clone();

        assert_eq!(stats.ticks_complete, 5);
        assert_eq!(stats.ticks_partial, 1);
        assert_eq!(stats.read_timeouts, 1);
        assert_eq!(*shown.lock().unwrap(), vec![1, 2, 3, 4, 5]);
        // tick 5 is the fifth complete tick, which happens after the partial one
        assert_eq!(session.workflow().buffered()[0].tick(), 5);
    }

    #[test]
    fn test_quit_command_terminates_and_releases() {
        let dir = tempdir().unwrap();
        let (engine, factory) = rig(all_frames());
        let mut session = Session::new(engine, Box::new(BmpExporter::new(dir.path())), ExitFlag::new());

        let stats = session
            .run(&mut ScriptedCommands::new([(3, Command::Quit)]))
            .clone();

        assert_eq!(stats.ticks_complete, 3);
        assert!(session.exit_flag().is_set());
        assert_eq!(session.state(), SessionState::Terminated);
        for serial in SERIALS {
            let calls = factory.driver().probe(serial).unwrap().calls();
            assert_eq!((calls.stops, calls.closes), (1, 1));
        }
    }

    #[test]
    fn test_external_exit_flag_stops_before_first_tick() {
        let dir = tempdir().unwrap();
        let (engine, _factory) = rig(all_frames());
        let exit = ExitFlag::new();
        let mut session = Session::new(engine, Box::new(BmpExporter::new(dir.path())), exit.clone());

        exit.trigger();
        let stats = session.run(&mut ScriptedCommands::none()).clone();
        assert_eq!(stats.ticks_total(), 0);
        assert_eq!(session.state(), SessionState::Terminated);
    }

    #[test]
    fn test_arm_commit_exports_batches() {
        let dir = tempdir().unwrap();
        let (engine, _factory) = rig(all_frames());
        let mut session = Session::new(engine, Box::new(BmpExporter::new(dir.path())), ExitFlag::new());

        let mut commands = ScriptedCommands::new([
            (1, Command::Arm),
            (3, Command::Commit),
            (4, Command::Quit),
        ]);
        let stats = session.run(&mut commands).clone();

        // armed after tick 1, so ticks 2 and 3 are buffered
        assert_eq!(stats.batches_exported, 2);
        assert_eq!(session.workflow().exported_count(), 2);
        assert!(!session.workflow().is_armed());
        for batch in 0..2 {
            for camera in 0..3 {
                let path = dir.path().join(format!("image{batch}/camera{camera}.bmp"));
                assert!(path.exists(), "missing {}", path.display());
            }
        }
        // commit restarted the epoch: tick 4 is the first of the new one
        assert_eq!(session.engine().state().tick_index, 1);
    }

    #[test]
    fn test_flush_command_resets_tick_index() {
        let dir = tempdir().unwrap();
        let (engine, factory) = rig(all_frames());
        let mut session = Session::new(engine, Box::new(BmpExporter::new(dir.path())), ExitFlag::new());

        let mut commands = ScriptedCommands::new([(4, Command::Flush), (4, Command::Quit)]);
        let stats = session.run(&mut commands).clone();

        assert_eq!(stats.flushes, 2);
        assert_eq!(session.engine().state().tick_index, 0);
        // bring-up flush, startup flush, manual flush
        let calls = factory.driver().probe(SERIALS[0]).unwrap().calls();
        assert_eq!(calls.flushes, 3);
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let dir = tempdir().unwrap();
        let (engine, _factory) = rig(all_frames());
        let mut session = Session::new(engine, Box::new(BmpExporter::new(dir.path())), ExitFlag::new())
            .with_tick_limit(2);

        let first = session.run(&mut ScriptedCommands::none()).clone();
        let second = session.run(&mut ScriptedCommands::none()).clone();
        assert_eq!(first, second);
    }
}
