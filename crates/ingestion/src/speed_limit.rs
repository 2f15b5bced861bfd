//! HTTP speed-limit lookup
//!
//! Queries the routing provider's speed-limits endpoint for a coordinate
//! pair. An empty answer is a clean `None`; only transport problems are
//! errors.

use std::time::Duration;

use contracts::{CoreError, SpeedLimitLookup};
use serde_json::Value;
use tracing::{debug, instrument};

const DEFAULT_ENDPOINT: &str = "https://api.olamaps.io/routing/v1/speedLimits";

/// Speed-limit lookup over HTTP
pub struct HttpSpeedLimitLookup {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpSpeedLimitLookup {
    /// Create a lookup against the default endpoint
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::transient("speed_limit_client", e.to_string()))?;

        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Override the endpoint (tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl SpeedLimitLookup for HttpSpeedLimitLookup {
    #[instrument(name = "speed_limit_lookup", skip(self))]
    async fn lookup(&self, latitude: f64, longitude: f64) -> Result<Option<f64>, CoreError> {
        // The endpoint expects a polyline; a degenerate two-point line at the
        // query coordinate asks for the limit at that spot.
        let points = format!("{latitude},{longitude}|{latitude},{longitude}");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("points", points.as_str()), ("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| CoreError::transient("speed_limit_lookup", e.to_string()))?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "speed limit endpoint rejected request");
            return Ok(None);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CoreError::transient("speed_limit_decode", e.to_string()))?;

        Ok(extract_limit(&body))
    }
}

fn extract_limit(body: &Value) -> Option<f64> {
    body.get("speed_limits")?
        .as_array()?
        .first()?
        .get("speedLimit")?
        .as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_limit_present() {
        let body = json!({"speed_limits": [{"speedLimit": 50.0}, {"speedLimit": 60.0}]});
        assert_eq!(extract_limit(&body), Some(50.0));
    }

    #[test]
    fn test_extract_limit_empty_list() {
        assert_eq!(extract_limit(&json!({"speed_limits": []})), None);
    }

    #[test]
    fn test_extract_limit_missing_field() {
        assert_eq!(extract_limit(&json!({})), None);
        assert_eq!(extract_limit(&json!({"speed_limits": [{}]})), None);
    }
}
