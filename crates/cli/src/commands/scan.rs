//! `scan` command implementation.

use anyhow::{Context, Result};
use camera_factory::{CameraDriver, CameraFactory};
use config_loader::{BindingResolver, ConfigLoader};
use serde::Serialize;
use tracing::info;

use crate::cli::ScanArgs;
use crate::error::CliError;
use crate::pipeline::{CameraBus, SimulationConfig};

/// One enumerated device
#[derive(Debug, Serialize)]
struct ScannedDevice {
    index: u32,
    serial: String,
    /// Canonical position, if the serial has a profile
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<usize>,
}

/// Execute the `scan` command
pub fn run_scan(args: &ScanArgs) -> Result<()> {
    if !args.config.exists() {
        return Err(CliError::config_not_found(&args.config).into());
    }

    let rig = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let bus = CameraBus::Simulated(SimulationConfig::new(
        args.sim.sim_fps,
        args.sim.sim_jitter_ms,
        10,
    ));
    let driver = bus.into_driver(&rig);

    let resolver = BindingResolver::new(&rig, ConfigLoader::base_dir(&args.config));
    let devices = scan_devices(&CameraFactory::new(driver), &resolver)?;
    info!(count = devices.len(), "Scan complete");

    if args.json {
        let json = serde_json::to_string_pretty(&devices).context("Failed to serialize scan")?;
        println!("{}", json);
    } else {
        println!("\nFound {} device(s)\n", devices.len());
        for device in &devices {
            match device.position {
                Some(position) => println!(
                    "  index {} -> {} (camera{})",
                    device.index, device.serial, position
                ),
                None => println!("  index {} -> {} (unbound)", device.index, device.serial),
            }
        }
        println!();
    }

    Ok(())
}

fn scan_devices<D: CameraDriver>(
    factory: &CameraFactory<D>,
    resolver: &BindingResolver<'_>,
) -> Result<Vec<ScannedDevice>> {
    let discovered = factory.scan().context("Device scan failed")?;

    let mut bound: Vec<_> = discovered
        .iter()
        .filter_map(|device| resolver.resolve(device).ok())
        .collect();
    contracts::CameraBinding::sort_canonical(&mut bound);

    Ok(discovered
        .iter()
        .map(|device| ScannedDevice {
            index: device.index,
            serial: device.serial.to_string(),
            position: bound.iter().position(|b| b.serial == device.serial),
        })
        .collect())
}
