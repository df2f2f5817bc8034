//! Camera bus selection.

use camera_factory::CameraDriver;
use contracts::RigConfig;
use tracing::info;

use super::{simulated_driver, SimulationConfig};

/// Boxed driver the factory runs on
pub type BoxedDriver = Box<dyn CameraDriver + Send>;

/// Which camera bus the pipeline drives
pub enum CameraBus {
    /// One mock camera per configured serial
    Simulated(SimulationConfig),
    /// A caller-provided driver (hardware adapter, test double)
    Driver(BoxedDriver),
}

impl CameraBus {
    /// Build the driver for `rig`
    pub fn into_driver(self, rig: &RigConfig) -> BoxedDriver {
        match self {
            Self::Simulated(sim) => {
                info!(
                    fps = sim.fps,
                    jitter_ms = sim.jitter_ms,
                    "Using simulated camera bus"
                );
                Box::new(simulated_driver(rig, sim))
            }
            Self::Driver(driver) => {
                info!("Using provided camera driver");
                driver
            }
        }
    }
}

impl std::fmt::Debug for CameraBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simulated(sim) => f.debug_tuple("Simulated").field(sim).finish(),
            Self::Driver(_) => f.write_str("Driver(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_factory::{MockCameraConfig, MockCameraDriver};
    use config_loader::{ConfigFormat, ConfigLoader};

    const RIG: &str = r#"
[serials]
"SIM0-0000-000A" = "left"

[profiles.left]
file = "left.cfg"
order = 0
"#;

    #[test]
    fn test_simulated_bus_follows_rig() {
        let rig = ConfigLoader::load_from_str(RIG, ConfigFormat::Toml).unwrap();
        let driver = CameraBus::Simulated(SimulationConfig::new(None, 0.0, 10)).into_driver(&rig);

        let devices = driver.scan().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].serial, "SIM0-0000-000A");
    }

    #[test]
    fn test_provided_driver_ignores_rig() {
        let rig = ConfigLoader::load_from_str(RIG, ConfigFormat::Toml).unwrap();
        let bus = CameraBus::Driver(Box::new(
            MockCameraDriver::new()
                .with_camera("SIM0-0000-00FF", MockCameraConfig::small())
                .with_camera("SIM0-0000-00FE", MockCameraConfig::small()),
        ));
        assert_eq!(format!("{bus:?}"), "Driver(..)");

        let devices = bus.into_driver(&rig).scan().unwrap();
        let serials: Vec<&str> = devices.iter().map(|d| d.serial.as_str()).collect();
        assert_eq!(serials, vec!["SIM0-0000-00FF", "SIM0-0000-00FE"]);
    }
}
