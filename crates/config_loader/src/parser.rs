//! Blueprint parsing
//!
//! Supports TOML (primary) and JSON (optional) formats.

use contracts::{CoreError, DeviceBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a TOML blueprint
pub fn parse_toml(content: &str) -> Result<DeviceBlueprint, CoreError> {
    toml::from_str(content).map_err(|e| CoreError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a JSON blueprint
pub fn parse_json(content: &str) -> Result<DeviceBlueprint, CoreError> {
    serde_json::from_str(content).map_err(|e| CoreError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a blueprint in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<DeviceBlueprint, CoreError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}
