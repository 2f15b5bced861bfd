//! Runtime configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Control poller configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Poll interval in seconds
    pub interval_s: f64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self { interval_s: 2.0 }
    }
}

impl PollerConfig {
    /// Poll interval as a `Duration` (floored at 100ms)
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_s.max(0.1))
    }
}

/// Bounded exponential backoff policy for remote operations
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Delay before the first retry (milliseconds)
    pub base_backoff_ms: u64,
    /// Delay ceiling (milliseconds)
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based), doubling per attempt
    /// and capped at `max_backoff_ms`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let delay = self
            .base_backoff_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_backoff_ms);
        Duration::from_millis(delay)
    }
}

/// Fixed-rate sampler configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Target sampling rate (Hz)
    pub rate_hz: f64,

    /// Minimum seconds between speed-limit lookups (the lookup API is
    /// rate-limited; the cached value is reused in between)
    pub speed_limit_refresh_s: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            rate_hz: 30.0,
            speed_limit_refresh_s: 1.0,
        }
    }
}

impl SamplerConfig {
    /// Interval between samples
    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate_hz.max(0.1))
    }
}

/// Finalize upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Retry policy for the bulk ride-data replace
    #[serde(default)]
    pub replace_retry: RetryPolicy,

    /// Retry policy per image blob
    #[serde(default = "default_image_retry")]
    pub image_retry: RetryPolicy,

    /// MIME type recorded with uploaded blobs
    #[serde(default = "default_image_content_type")]
    pub image_content_type: String,
}

fn default_image_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_backoff_ms: 500,
        max_backoff_ms: 4_000,
    }
}

fn default_image_content_type() -> String {
    "image/jpeg".to_string()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            replace_retry: RetryPolicy::default(),
            image_retry: default_image_retry(),
            image_content_type: default_image_content_type(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 6,
            base_backoff_ms: 500,
            max_backoff_ms: 3_000,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1_000));
        assert_eq!(policy.backoff(3), Duration::from_millis(2_000));
        assert_eq!(policy.backoff(4), Duration::from_millis(3_000));
        assert_eq!(policy.backoff(10), Duration::from_millis(3_000));
    }

    #[test]
    fn test_sampler_interval() {
        let config = SamplerConfig {
            rate_hz: 30.0,
            speed_limit_refresh_s: 1.0,
        };
        let interval = config.sample_interval();
        assert!((interval.as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_poller_interval_floor() {
        let config = PollerConfig { interval_s: 0.0 };
        assert_eq!(config.interval(), Duration::from_millis(100));
    }
}
