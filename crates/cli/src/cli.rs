//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// camsync - synchronized multi-camera acquisition
#[derive(Parser, Debug)]
#[command(
    name = "camsync",
    author,
    version,
    about = "Synchronized multi-camera read loop",
    long_about = "Reads a variable number of independently-clocked cameras in lock-step.\n\n\
                  Binds discovered devices to rig profiles, reads one frame per camera per tick, \n\
                  flags desynchronized ticks and exports captured frame sets as bitmaps."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "CAMSYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "CAMSYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the synchronized read loop
    Run(RunArgs),

    /// Validate a rig configuration without opening cameras
    Validate(ValidateArgs),

    /// Display the rig configuration
    Info(InfoArgs),

    /// List the devices found on the bus
    Scan(ScanArgs),
}

/// Simulated bus settings, shared by every command that talks to devices
#[derive(Args, Debug, Clone)]
pub struct SimArgs {
    /// Frame rate of each simulated camera (defaults to the target tick rate)
    #[arg(long, env = "CAMSYNC_SIM_FPS")]
    pub sim_fps: Option<f64>,

    /// Random per-frame delay of each simulated camera, in milliseconds
    #[arg(long, default_value = "0", env = "CAMSYNC_SIM_JITTER_MS")]
    pub sim_jitter_ms: f64,
}

/// Arguments for the `run` command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to the rig configuration file (TOML or JSON)
    #[arg(short = 'f', long, env = "CAMSYNC_CONFIG")]
    pub config: PathBuf,

    /// Log model, firmware and link type of every camera at startup
    #[arg(long, env = "CAMSYNC_VERBOSE_DEVICES")]
    pub verbose_devices: bool,

    /// Preview width in pixels (-1 = no scaling)
    #[arg(long, default_value = "-1", allow_negative_numbers = true, env = "CAMSYNC_PREVIEW_WIDTH")]
    pub preview_width: i64,

    /// Disable preview; the loop still runs and samples
    #[arg(short = 'n', long, env = "CAMSYNC_NO_PREVIEW")]
    pub no_preview: bool,

    /// Target tick rate in frames per second (sets the per-read timeout)
    #[arg(
        short = 't',
        long,
        default_value = "10",
        value_parser = clap::value_parser!(u32).range(1..),
        env = "CAMSYNC_TARGET_FPS"
    )]
    pub target_fps: u32,

    /// Directory receiving exported batches
    #[arg(long, default_value = "images", env = "CAMSYNC_EXPORT_DIR")]
    pub export_dir: PathBuf,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "CAMSYNC_METRICS_PORT")]
    pub metrics_port: u16,

    /// Stop after this many ticks (0 = run until quit)
    #[arg(long, default_value = "0", env = "CAMSYNC_MAX_TICKS")]
    pub max_ticks: u64,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub sim: SimArgs,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the rig configuration file to validate
    #[arg(short = 'f', long, env = "CAMSYNC_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to the rig configuration file
    #[arg(short = 'f', long, env = "CAMSYNC_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the controls written to each camera
    #[arg(long)]
    pub controls: bool,
}

/// Arguments for the `scan` command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Rig configuration describing the simulated bus
    #[arg(short = 'f', long, env = "CAMSYNC_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub sim: SimArgs,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["camsync", "run", "-f", "rig.toml"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.preview_width, -1);
        assert_eq!(args.target_fps, 10);
        assert_eq!(args.export_dir, PathBuf::from("images"));
        assert_eq!(args.metrics_port, 0);
        assert!(!args.no_preview);
        assert!(args.sim.sim_fps.is_none());
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "camsync",
            "-v",
            "run",
            "-f",
            "rig.toml",
            "-n",
            "-t",
            "30",
            "--preview-width",
            "320",
            "--verbose-devices",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.no_preview);
        assert!(args.verbose_devices);
        assert_eq!(args.target_fps, 30);
        assert_eq!(args.preview_width, 320);
    }

    #[test]
    fn test_config_is_required() {
        assert!(Cli::try_parse_from(["camsync", "run"]).is_err());
    }

    #[test]
    fn test_zero_target_fps_rejected() {
        assert!(Cli::try_parse_from(["camsync", "run", "-f", "rig.toml", "-t", "0"]).is_err());
    }
}
