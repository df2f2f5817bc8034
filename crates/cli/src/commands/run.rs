//! `run` command implementation.

use anyhow::{Context, Result};
use camera_factory::RetryPolicy;
use sync_engine::ExitFlag;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{
    spawn_keyboard_reader, CameraBus, ChannelCommands, Pipeline, PipelineConfig,
    SimulationConfig,
};

/// Execute the `run` command
pub async fn run_loop(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(&args.config).into());
    }

    let pipeline = Pipeline::new(pipeline_config(args), camera_bus(args));

    let exit = ExitFlag::new();
    let (tx, rx) = mpsc::unbounded_channel();
    spawn_keyboard_reader(tx);
    info!("Keys (then Enter): s = arm capture, c = commit export, f = flush, q = quit");

    let signal_exit = exit.clone();
    let signal_task = tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, stopping read loop...");
        signal_exit.trigger();
    });

    let result = pipeline.run(exit, ChannelCommands::new(rx)).await;
    signal_task.abort();
    let summary = result.context("Read loop failed")?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&summary).context("Failed to serialize run summary")?;
        println!("{json}");
    } else {
        summary.print_summary();
    }

    info!("camsync finished");
    Ok(())
}

fn pipeline_config(args: &RunArgs) -> PipelineConfig {
    PipelineConfig {
        config_path: args.config.clone(),
        verbose_devices: args.verbose_devices,
        preview_width: (!args.no_preview).then_some(args.preview_width),
        target_fps: args.target_fps,
        export_dir: args.export_dir.clone(),
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
        max_ticks: (args.max_ticks != 0).then_some(args.max_ticks),
        retry: RetryPolicy::default(),
    }
}

/// No hardware adapter is linked into the binary; the rig runs on the
/// simulated bus.
fn camera_bus(args: &RunArgs) -> CameraBus {
    CameraBus::Simulated(SimulationConfig::new(
        args.sim.sim_fps,
        args.sim.sim_jitter_ms,
        args.target_fps,
    ))
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
