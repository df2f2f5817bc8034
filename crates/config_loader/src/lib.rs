//! # Config Loader
//!
//! Rig configuration loading and device binding.
//!
//! Responsibilities:
//! - Parse TOML/JSON rig files
//! - Validate configuration legality
//! - Resolve discovered serials to `CameraBinding`s in canonical order
//!
//! # Example
//!
//! ```no_run
//! use config_loader::{BindingResolver, ConfigLoader};
//! use std::path::Path;
//!
//! let path = Path::new("rig.toml");
//! let rig = ConfigLoader::load_from_path(path).unwrap();
//! let resolver = BindingResolver::new(&rig, ConfigLoader::base_dir(path));
//! ```

mod binding;
mod parser;
mod validator;

pub use binding::BindingResolver;
pub use contracts::RigConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::{Path, PathBuf};

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<RigConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<RigConfig, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Directory profile files are resolved against
    pub fn base_dir(path: &Path) -> PathBuf {
        path.parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Serialize RigConfig to TOML string
    pub fn to_toml(rig: &RigConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(rig)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize RigConfig to JSON string
    pub fn to_json(rig: &RigConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(rig)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<RigConfig, ContractError> {
        let rig = parser::parse(content, format)?;
        validator::validate(&rig)?;
        Ok(rig)
    }
}
