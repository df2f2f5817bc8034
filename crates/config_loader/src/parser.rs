//! Config parsing
//!
//! TOML is the primary format, JSON is accepted as well.

use contracts::{ContractError, RigConfig};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<RigConfig, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<RigConfig, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration according to format
pub fn parse(content: &str, format: ConfigFormat) -> Result<RigConfig, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ColorMode;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[serials]
"AB12-CD34-EF56" = "left"

[profiles.left]
file = "left.cfg"
order = 0
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let rig = result.unwrap();
        assert_eq!(rig.serials.len(), 1);
        let profile = &rig.profiles["left"];
        assert_eq!(profile.order, 0);
        assert_eq!(profile.color_mode, ColorMode::Mono);
        assert_eq!(profile.controls.get("setExposureTime"), Some(&30_000));
    }

    #[test]
    fn test_parse_toml_with_overrides() {
        let content = r#"
[serials]
"AB12-CD34-EF56" = "right"

[profiles.right]
file = "right.cfg"
order = 7
color_mode = "bayer_bg"

[profiles.right.controls]
setExposureTime = 12000
"#;
        let rig = parse_toml(content).unwrap();
        let profile = &rig.profiles["right"];
        assert_eq!(profile.color_mode, ColorMode::BayerBg);
        assert_eq!(profile.controls.len(), 1);
        assert_eq!(profile.controls["setExposureTime"], 12_000);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "serials": { "AB12-CD34-EF56": "left" },
            "profiles": { "left": { "file": "left.cfg", "order": 1 } }
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("ini"), None);
    }
}
