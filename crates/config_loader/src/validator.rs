//! Blueprint validation
//!
//! Rules:
//! - account_id non-empty
//! - store base_url non-empty, no trailing slash, timeout > 0
//! - poll interval > 0
//! - sample rate > 0, speed-limit refresh >= 0
//! - retry budgets have at least one attempt
//! - sink names non-empty and unique

use std::collections::HashSet;

use contracts::{CoreError, DeviceBlueprint, RetryPolicy};

/// Validate a DeviceBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &DeviceBlueprint) -> Result<(), CoreError> {
    validate_device(blueprint)?;
    validate_store(blueprint)?;
    validate_timing(blueprint)?;
    validate_retries(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_device(blueprint: &DeviceBlueprint) -> Result<(), CoreError> {
    if blueprint.device.account_id.trim().is_empty() {
        return Err(CoreError::config_validation(
            "device.account_id",
            "account_id cannot be empty",
        ));
    }
    if blueprint.device.spool_dir.as_os_str().is_empty() {
        return Err(CoreError::config_validation(
            "device.spool_dir",
            "spool_dir cannot be empty",
        ));
    }
    Ok(())
}

fn validate_store(blueprint: &DeviceBlueprint) -> Result<(), CoreError> {
    let store = &blueprint.store;
    if store.base_url.trim().is_empty() {
        return Err(CoreError::config_validation(
            "store.base_url",
            "base_url cannot be empty",
        ));
    }
    if store.base_url.ends_with('/') {
        return Err(CoreError::config_validation(
            "store.base_url",
            "base_url must not end with '/'",
        ));
    }
    if store.timeout_s <= 0.0 {
        return Err(CoreError::config_validation(
            "store.timeout_s",
            format!("timeout_s must be > 0, got {}", store.timeout_s),
        ));
    }
    Ok(())
}

fn validate_timing(blueprint: &DeviceBlueprint) -> Result<(), CoreError> {
    if blueprint.poller.interval_s <= 0.0 {
        return Err(CoreError::config_validation(
            "poller.interval_s",
            format!("interval_s must be > 0, got {}", blueprint.poller.interval_s),
        ));
    }
    if blueprint.sampler.rate_hz <= 0.0 {
        return Err(CoreError::config_validation(
            "sampler.rate_hz",
            format!("rate_hz must be > 0, got {}", blueprint.sampler.rate_hz),
        ));
    }
    if blueprint.sampler.speed_limit_refresh_s < 0.0 {
        return Err(CoreError::config_validation(
            "sampler.speed_limit_refresh_s",
            "speed_limit_refresh_s cannot be negative",
        ));
    }
    Ok(())
}

fn validate_retries(blueprint: &DeviceBlueprint) -> Result<(), CoreError> {
    check_retry("upload.replace_retry", &blueprint.upload.replace_retry)?;
    check_retry("upload.image_retry", &blueprint.upload.image_retry)?;
    Ok(())
}

fn check_retry(field: &str, policy: &RetryPolicy) -> Result<(), CoreError> {
    if policy.max_attempts == 0 {
        return Err(CoreError::config_validation(
            format!("{field}.max_attempts"),
            "max_attempts must be >= 1",
        ));
    }
    if policy.max_backoff_ms < policy.base_backoff_ms {
        return Err(CoreError::config_validation(
            format!("{field}.max_backoff_ms"),
            format!(
                "max_backoff_ms ({}) must be >= base_backoff_ms ({})",
                policy.max_backoff_ms, policy.base_backoff_ms
            ),
        ));
    }
    Ok(())
}

fn validate_sinks(blueprint: &DeviceBlueprint) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(CoreError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(CoreError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        AuthConfig, ConfigVersion, DetectorConfig, DeviceConfig, PollerConfig, SamplerConfig,
        SinkConfig, SinkType, StoreConfig, UploadConfig,
    };
    use std::path::PathBuf;

    fn minimal_blueprint() -> DeviceBlueprint {
        DeviceBlueprint {
            version: ConfigVersion::V1,
            device: DeviceConfig {
                account_id: "acct".into(),
                spool_dir: PathBuf::from("spool"),
            },
            store: StoreConfig {
                base_url: "https://db.example".into(),
                timeout_s: 5.0,
                auth: AuthConfig::default(),
            },
            poller: PollerConfig::default(),
            sampler: SamplerConfig::default(),
            detector: DetectorConfig::default(),
            upload: UploadConfig::default(),
            sinks: vec![SinkConfig {
                name: "log".into(),
                sink_type: SinkType::Log,
                queue_capacity: 100,
                params: Default::default(),
            }],
        }
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_empty_account_id() {
        let mut bp = minimal_blueprint();
        bp.device.account_id = "  ".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("account_id"), "got: {err}");
    }

    #[test]
    fn test_trailing_slash_base_url() {
        let mut bp = minimal_blueprint();
        bp.store.base_url = "https://db.example/".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("must not end"), "got: {err}");
    }

    #[test]
    fn test_invalid_poll_interval() {
        let mut bp = minimal_blueprint();
        bp.poller.interval_s = 0.0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("interval_s"), "got: {err}");
    }

    #[test]
    fn test_invalid_sample_rate() {
        let mut bp = minimal_blueprint();
        bp.sampler.rate_hz = -5.0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("rate_hz must be > 0"), "got: {err}");
    }

    #[test]
    fn test_zero_retry_attempts() {
        let mut bp = minimal_blueprint();
        bp.upload.replace_retry.max_attempts = 0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("max_attempts"), "got: {err}");
    }

    #[test]
    fn test_duplicate_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks.push(bp.sinks[0].clone());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate sink name"), "got: {err}");
    }
}
