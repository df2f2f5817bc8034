//! # Observability
//!
//! Tracing + Prometheus metrics for the camera rig.
//!
//! ## Usage
//!
//! ```ignore
//! observability::init_tracing(LogFormat::Compact, "info", false)?;
//! observability::init_metrics_only(9000)?;
//!
//! observability::record_tick(TickOutcomeLabel::Complete, 3);
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Re-exports
pub use crate::metrics::{
    record_buffered_sets, record_export_batch, record_flush, record_fps, record_read_timeout,
    record_tick, TickOutcomeLabel,
};

/// Log format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logs
    Json,
    /// Human-readable
    #[default]
    Pretty,
    /// Compact single line
    Compact,
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins over `default_level` unless `force_level` is set.
pub fn init_tracing(format: LogFormat, default_level: &str, force_level: bool) -> Result<()> {
    let filter = if force_level {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    let fmt_layer = match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")
}

/// Initialize the Prometheus exporter only
///
/// For when tracing has been set up elsewhere.
pub fn init_metrics_only(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}
