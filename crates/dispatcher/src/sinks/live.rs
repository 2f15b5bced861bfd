//! LiveFeedSink - merge-patches the remote rider_data node
//!
//! Pushes current speed, speed limit, active warnings, and the latest motion
//! reading for dashboard consumption. Always a merge-patch of named fields,
//! never a replace.

use std::sync::Arc;

use contracts::{rider_data_path, AccountId, CoreError, RemoteStore, TelemetrySink, TelemetryUpdate};
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

/// Sink that pushes live telemetry to the remote store
pub struct LiveFeedSink<S> {
    name: String,
    store: Arc<S>,
    rider_data: String,
}

impl<S: RemoteStore> LiveFeedSink<S> {
    /// Create a live feed sink for an account
    pub fn new(name: impl Into<String>, store: Arc<S>, account: &AccountId) -> Self {
        Self {
            name: name.into(),
            store,
            rider_data: rider_data_path(account),
        }
    }

    /// Build the merge-patch document for one update
    ///
    /// `active_warnings_list` is always present: an empty object clears
    /// warnings on the remote side once the rider slows down.
    fn build_patch(update: &TelemetryUpdate) -> Value {
        let row = &update.row;
        let mut fields = Map::new();

        if let Some(speed) = row.speed {
            fields.insert("current_speed".to_string(), json!(speed));
        }
        if let Some(limit) = row.speed_limit {
            fields.insert("speed_limit".to_string(), json!(limit));
        }

        let mut warnings = Map::new();
        if let Some(warning) = &update.warning {
            warnings.insert(
                warning.key(),
                serde_json::to_value(warning).unwrap_or(Value::Null),
            );
        }
        fields.insert("active_warnings_list".to_string(), Value::Object(warnings));

        if let (Some(acc_x), Some(acc_y), Some(acc_z), Some(gyro_x), Some(gyro_y), Some(gyro_z)) = (
            row.acc_x, row.acc_y, row.acc_z, row.gyro_x, row.gyro_y, row.gyro_z,
        ) {
            fields.insert(
                "mpu".to_string(),
                json!({
                    "acc_x": acc_x,
                    "acc_y": acc_y,
                    "acc_z": acc_z,
                    "gyro_x": gyro_x,
                    "gyro_y": gyro_y,
                    "gyro_z": gyro_z,
                    "timestamp": row.timestamp,
                }),
            );
        }

        Value::Object(fields)
    }
}

impl<S: RemoteStore + Send + Sync> TelemetrySink for LiveFeedSink<S> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "live_sink_write",
        skip(self, update),
        fields(sink = %self.name, timestamp = update.row.timestamp)
    )]
    async fn write(&mut self, update: &TelemetryUpdate) -> Result<(), CoreError> {
        let patch = Self::build_patch(update);
        self.store.patch_json(&self.rider_data, &patch).await
    }

    #[instrument(name = "live_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), CoreError> {
        // Each write is its own request
        Ok(())
    }

    #[instrument(name = "live_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), CoreError> {
        debug!(sink = %self.name, "LiveFeedSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        HazardSeverity, MotionReading, PositionFix, TelemetryRow, TelemetrySample, WarningKind,
        WarningRecord,
    };
    use remote_store::MockStore;

    fn speeding_update() -> TelemetryUpdate {
        let sample = TelemetrySample {
            timestamp: 5000,
            motion: Some(MotionReading {
                acc_x: 0.1,
                acc_y: 0.2,
                acc_z: 9.8,
                gyro_x: 0.0,
                gyro_y: 0.1,
                gyro_z: 0.0,
            }),
            position: Some(PositionFix {
                latitude: 17.0,
                longitude: 78.0,
                speed: 50.0,
            }),
            speed_limit: Some(40.0),
            image_path: None,
        };
        TelemetryUpdate {
            row: TelemetryRow::from_sample(&sample, HazardSeverity::Clear),
            warning: Some(WarningRecord {
                kind: WarningKind::SpeedLimit,
                message: "Speed Limit Exceeded!".to_string(),
                timestamp: 5000,
            }),
        }
    }

    #[tokio::test]
    async fn test_live_sink_patches_rider_data() {
        let store = Arc::new(MockStore::new());
        let mut sink = LiveFeedSink::new("live", store.clone(), &"acct".to_string());

        sink.write(&speeding_update()).await.unwrap();

        let doc = store
            .get_json("users/acct/rider_data")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["current_speed"], 50.0);
        assert_eq!(doc["speed_limit"], 40.0);
        assert_eq!(
            doc["active_warnings_list"]["warning_5000"]["type"],
            "speed_limit"
        );
        assert_eq!(doc["mpu"]["acc_z"], 9.8);
        assert_eq!(doc["mpu"]["timestamp"], 5000);
    }

    #[tokio::test]
    async fn test_live_sink_clears_warnings_when_compliant() {
        let store = Arc::new(MockStore::new());
        let mut sink = LiveFeedSink::new("live", store.clone(), &"acct".to_string());

        sink.write(&speeding_update()).await.unwrap();

        // Compliant sample afterwards
        let sample = TelemetrySample {
            timestamp: 6000,
            motion: None,
            position: Some(PositionFix {
                latitude: 17.0,
                longitude: 78.0,
                speed: 30.0,
            }),
            speed_limit: Some(40.0),
            image_path: None,
        };
        let update = TelemetryUpdate {
            row: TelemetryRow::from_sample(&sample, HazardSeverity::Clear),
            warning: None,
        };
        sink.write(&update).await.unwrap();

        let doc = store
            .get_json("users/acct/rider_data")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["active_warnings_list"], serde_json::json!({}));
        assert_eq!(doc["current_speed"], 30.0);
        // Motion absent: previous mpu left untouched by the merge-patch
        assert_eq!(doc["mpu"]["timestamp"], 5000);
    }

    #[tokio::test]
    async fn test_live_sink_absent_position_omits_speed_fields() {
        let store = Arc::new(MockStore::new());
        let mut sink = LiveFeedSink::new("live", store.clone(), &"acct".to_string());

        let update = TelemetryUpdate {
            row: TelemetryRow::from_sample(&TelemetrySample::empty(1), HazardSeverity::Clear),
            warning: None,
        };
        sink.write(&update).await.unwrap();

        let doc = store
            .get_json("users/acct/rider_data")
            .await
            .unwrap()
            .unwrap();
        assert!(doc.get("current_speed").is_none());
        assert!(doc.get("mpu").is_none());
        assert_eq!(doc["active_warnings_list"], serde_json::json!({}));
    }
}
