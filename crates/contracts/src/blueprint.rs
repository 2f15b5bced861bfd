//! DeviceBlueprint - Config Loader output
//!
//! Describes the complete device configuration: account, remote store,
//! control polling, sampling, hazard detector, finalize uploads, live sinks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::{PollerConfig, SamplerConfig, UploadConfig};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete device configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Device identity and local storage
    pub device: DeviceConfig,

    /// Remote store connection
    pub store: StoreConfig,

    /// Control polling
    #[serde(default)]
    pub poller: PollerConfig,

    /// Sensor sampling
    #[serde(default)]
    pub sampler: SamplerConfig,

    /// Hazard detector invocation
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Finalize upload behavior
    #[serde(default)]
    pub upload: UploadConfig,

    /// Live telemetry sinks
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Device identity and local spool storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Account this device records for (opaque remote identifier)
    pub account_id: String,

    /// Directory for the durable ride journal
    #[serde(default = "default_spool_dir")]
    pub spool_dir: PathBuf,
}

fn default_spool_dir() -> PathBuf {
    PathBuf::from("spool")
}

/// Remote store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store base URL (no trailing slash)
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_store_timeout_s")]
    pub timeout_s: f64,

    /// Credential acquisition
    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_store_timeout_s() -> f64 {
    5.0
}

/// Credential provider settings
///
/// Secrets come from the environment, never from the blueprint file. When
/// `token_env` is set the pre-issued token is used directly and the password
/// grant is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable holding the store API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Environment variable holding the sign-in email
    #[serde(default = "default_email_env")]
    pub email_env: String,

    /// Environment variable holding the sign-in password
    #[serde(default = "default_password_env")]
    pub password_env: String,

    /// Optional environment variable holding a pre-issued token
    #[serde(default)]
    pub token_env: Option<String>,
}

fn default_api_key_env() -> String {
    "RIDE_SYNCER_STORE_KEY".to_string()
}

fn default_email_env() -> String {
    "RIDE_SYNCER_STORE_EMAIL".to_string()
}

fn default_password_env() -> String {
    "RIDE_SYNCER_STORE_PASSWORD".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            email_env: default_email_env(),
            password_env: default_password_env(),
            token_env: None,
        }
    }
}

/// External hazard classifier settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Model identifier passed to the classifier
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Environment variable holding the classifier API key
    #[serde(default = "default_detector_key_env")]
    pub api_key_env: String,

    /// Classifier executable; `None` disables image classification
    #[serde(default)]
    pub command: Option<PathBuf>,
}

fn default_model_id() -> String {
    "potholes-and-speed-bumps-detection/1".to_string()
}

fn default_detector_key_env() -> String {
    "RIDE_SYNCER_DETECTOR_KEY".to_string()
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            api_key_env: default_detector_key_env(),
            command: None,
        }
    }
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Structured log output
    Log,
    /// Local CSV export
    Csv,
    /// Remote live feed (rider_data merge-patch)
    Live,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_blueprint() -> DeviceBlueprint {
        DeviceBlueprint {
            version: ConfigVersion::V1,
            device: DeviceConfig {
                account_id: "abSdkSyZuxdmryk4jnlMqfwl49n2".into(),
                spool_dir: PathBuf::from("/var/lib/ride-syncer/spool"),
            },
            store: StoreConfig {
                base_url: "https://example-rtdb.firebasedatabase.app".into(),
                timeout_s: 5.0,
                auth: AuthConfig::default(),
            },
            poller: PollerConfig::default(),
            sampler: SamplerConfig::default(),
            detector: DetectorConfig::default(),
            upload: UploadConfig::default(),
            sinks: vec![SinkConfig {
                name: "live".into(),
                sink_type: SinkType::Live,
                queue_capacity: 100,
                params: HashMap::new(),
            }],
        }
    }

    #[test]
    fn test_blueprint_serde_round_trip() {
        let blueprint = sample_blueprint();
        let json = serde_json::to_string(&blueprint).unwrap();
        let back: DeviceBlueprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back.device.account_id, blueprint.device.account_id);
        assert_eq!(back.sinks.len(), 1);
        assert_eq!(back.sinks[0].sink_type, SinkType::Live);
    }

    #[test]
    fn test_blueprint_defaults_fill_in() {
        let json = r#"{
            "device": { "account_id": "acct" },
            "store": { "base_url": "https://db.example" }
        }"#;
        let blueprint: DeviceBlueprint = serde_json::from_str(json).unwrap();
        assert_eq!(blueprint.device.spool_dir, PathBuf::from("spool"));
        assert_eq!(blueprint.poller.interval_s, 2.0);
        assert_eq!(blueprint.sampler.rate_hz, 30.0);
        assert_eq!(blueprint.store.timeout_s, 5.0);
        assert!(blueprint.detector.command.is_none());
        assert!(blueprint.sinks.is_empty());
    }
}
