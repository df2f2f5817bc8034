//! `info` command implementation.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{ColorMode, RigConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct RigInfo {
    version: String,
    /// Cameras in the order their frames appear in a frame set
    cameras: Vec<CameraInfo>,
}

#[derive(Serialize)]
struct CameraInfo {
    serial: String,
    profile: String,
    order: i64,
    file: String,
    color_mode: ColorMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    controls: Option<BTreeMap<String, i64>>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(&args.config).into());
    }

    let rig = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let rig_info = build_rig_info(&rig, &ConfigLoader::base_dir(&args.config), args.controls);

    if args.json {
        let json =
            serde_json::to_string_pretty(&rig_info).context("Failed to serialize rig info")?;
        println!("{}", json);
    } else {
        print_rig_info(&rig_info);
    }

    Ok(())
}

fn build_rig_info(rig: &RigConfig, base_dir: &Path, with_controls: bool) -> RigInfo {
    let mut cameras: Vec<CameraInfo> = rig
        .serials
        .iter()
        .filter_map(|(serial, profile_name)| {
            let profile = rig.profiles.get(profile_name)?;
            let file = if profile.file.is_absolute() {
                profile.file.clone()
            } else {
                base_dir.join(&profile.file)
            };
            Some(CameraInfo {
                serial: serial.to_string(),
                profile: profile_name.clone(),
                order: profile.order,
                file: file.display().to_string(),
                color_mode: profile.color_mode,
                controls: with_controls.then(|| profile.controls.clone()),
            })
        })
        .collect();
    cameras.sort_by_key(|camera| camera.order);

    RigInfo {
        version: format!("{:?}", rig.version),
        cameras,
    }
}

fn print_rig_info(rig_info: &RigInfo) {
    println!("\n=== Rig Configuration ===\n");
    println!("Version: {}", rig_info.version);
    println!("\nCameras ({}), in frame set order:", rig_info.cameras.len());

    for (position, camera) in rig_info.cameras.iter().enumerate() {
        println!(
            "  [{}] {} - profile '{}' (order {}, {:?})",
            position, camera.serial, camera.profile, camera.order, camera.color_mode
        );
        println!("      file: {}", camera.file);
        if let Some(ref controls) = camera.controls {
            for (name, value) in controls {
                println!("      {} = {}", name, value);
            }
        }
    }

    println!();
}
