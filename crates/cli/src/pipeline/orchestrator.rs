//! Pipeline orchestrator - brings the rig up and runs the loop.
//!
//! Startup order: scan, bind, open. Any failure there is fatal and
//! happens before the first tick. The loop itself runs on a blocking
//! worker since every read blocks up to the per-read timeout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use camera_factory::{CameraFactory, RetryPolicy};
use capture::{BmpExporter, LogPreview};
use config_loader::{BindingResolver, ConfigLoader};
use sync_engine::{ExitFlag, Session, SyncEngine, SyncEngineConfig};
use tracing::info;

use super::{CameraBus, ChannelCommands, RunSummary};
use crate::error::CliError;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Rig configuration file
    pub config_path: PathBuf,

    /// Log device info of every camera at startup
    pub verbose_devices: bool,

    /// Preview width flag (-1 = native size); None disables preview
    pub preview_width: Option<i64>,

    /// Target tick rate
    pub target_fps: u32,

    /// Export base directory
    pub export_dir: PathBuf,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Tick limit (None = until quit)
    pub max_ticks: Option<u64>,

    /// Open retry policy
    pub retry: RetryPolicy,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
    bus: CameraBus,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, bus: CameraBus) -> Self {
        Self { config, bus }
    }

    /// Bring the rig up and run the loop until `exit` is set
    pub async fn run(self, exit: ExitFlag, commands: ChannelCommands) -> Result<RunSummary> {
        let Self { config, bus } = self;

        if let Some(port) = config.metrics_port {
            observability::init_metrics_only(port)?;
        }

        let rig_config = ConfigLoader::load_from_path(&config.config_path).with_context(|| {
            format!("Failed to load rig from {}", config.config_path.display())
        })?;
        info!(
            serials = rig_config.serials.len(),
            profiles = rig_config.profiles.len(),
            "Rig configuration loaded"
        );

        let driver = bus.into_driver(&rig_config);
        let factory = CameraFactory::new(driver)
            .with_retry(config.retry)
            .with_verbose(config.verbose_devices);

        let devices = factory.scan().context("Device scan failed")?;
        info!(count = devices.len(), "Devices found");
        for device in &devices {
            info!(index = device.index, serial = %device.serial, "Device");
        }

        let resolver =
            BindingResolver::new(&rig_config, ConfigLoader::base_dir(&config.config_path));
        let bindings = resolver
            .resolve_all(&devices)
            .context("Device binding failed")?;
        let rig = factory
            .open_rig(&bindings)
            .context("Camera bring-up failed")?;

        let engine = SyncEngine::new(
            rig,
            SyncEngineConfig {
                target_fps: config.target_fps,
                ..Default::default()
            },
        );
        let read_timeout_ms = engine.read_timeout().as_millis() as u64;

        let mut session = Session::new(
            engine,
            Box::new(BmpExporter::new(&config.export_dir)),
            exit,
        );
        if let Some(width) = config.preview_width {
            session = session.with_preview(Box::new(LogPreview::from_flag("preview", width)));
        }
        if let Some(limit) = config.max_ticks {
            session = session.with_tick_limit(limit);
        }

        let (stats, pending_sets) = tokio::task::spawn_blocking(move || {
            let mut commands = commands;
            let stats = session.run(&mut commands).clone();
            (stats, session.workflow().buffered().len())
        })
        .await
        .map_err(|e| CliError::loop_aborted(e.to_string()))?;

        Ok(RunSummary {
            cameras: bindings.iter().map(|b| b.serial.to_string()).collect(),
            target_fps: config.target_fps,
            read_timeout_ms,
            export_dir: config.export_dir,
            pending_sets,
            stats,
        })
    }
}
