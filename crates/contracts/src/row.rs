//! TelemetryRow - the archived form of one sample
//!
//! Rows are buffered locally in capture order and uploaded as a whole at
//! finalize time. The local image path never leaves the device.

use std::path::PathBuf;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{HazardSeverity, TelemetrySample, WarningRecord};

/// One archived telemetry sample
///
/// Serialization round-trips the full row (the durable journal needs the
/// local image path to survive a restart); remote uploads go through
/// [`TelemetryRow::remote_view`], which strips it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRow {
    /// Capture timestamp (epoch milliseconds), non-decreasing within a ride;
    /// out-of-order samples are kept as received
    pub timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acc_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acc_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acc_z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gyro_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gyro_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gyro_z: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_limit: Option<f64>,

    /// Fused hazard severity (0-3)
    #[serde(default)]
    pub hazard_severity: HazardSeverity,

    /// Remote image reference, set only after the paired upload succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,

    /// Local still-image path; stripped from every remote write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_image_path: Option<PathBuf>,
}

impl TelemetryRow {
    /// Build a row from an immutable sample snapshot plus its fused severity
    pub fn from_sample(sample: &TelemetrySample, severity: HazardSeverity) -> Self {
        Self {
            timestamp: sample.timestamp,
            acc_x: sample.motion.map(|m| m.acc_x),
            acc_y: sample.motion.map(|m| m.acc_y),
            acc_z: sample.motion.map(|m| m.acc_z),
            gyro_x: sample.motion.map(|m| m.gyro_x),
            gyro_y: sample.motion.map(|m| m.gyro_y),
            gyro_z: sample.motion.map(|m| m.gyro_z),
            latitude: sample.position.map(|p| p.latitude),
            longitude: sample.position.map(|p| p.longitude),
            speed: sample.position.map(|p| p.speed),
            speed_limit: sample.speed_limit,
            hazard_severity: severity,
            image_key: None,
            local_image_path: sample.image_path.clone(),
        }
    }

    /// Remote form of this row (local image path stripped)
    pub fn remote_view(&self) -> RemoteRowView<'_> {
        RemoteRowView { row: self }
    }
}

/// Serialization adapter producing the remote wire form of a row
///
/// Identical to [`TelemetryRow`] minus `local_image_path`.
#[derive(Debug, Clone, Copy)]
pub struct RemoteRowView<'a> {
    row: &'a TelemetryRow,
}

impl Serialize for RemoteRowView<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        #[derive(Serialize)]
        struct Wire<'a> {
            timestamp: i64,
            #[serde(skip_serializing_if = "Option::is_none")]
            acc_x: Option<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            acc_y: Option<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            acc_z: Option<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            gyro_x: Option<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            gyro_y: Option<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            gyro_z: Option<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            latitude: Option<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            longitude: Option<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            speed: Option<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            speed_limit: Option<f64>,
            hazard_severity: HazardSeverity,
            #[serde(skip_serializing_if = "Option::is_none")]
            image_key: Option<&'a String>,
        }

        let row = self.row;
        Wire {
            timestamp: row.timestamp,
            acc_x: row.acc_x,
            acc_y: row.acc_y,
            acc_z: row.acc_z,
            gyro_x: row.gyro_x,
            gyro_y: row.gyro_y,
            gyro_z: row.gyro_z,
            latitude: row.latitude,
            longitude: row.longitude,
            speed: row.speed,
            speed_limit: row.speed_limit,
            hazard_severity: row.hazard_severity,
            image_key: row.image_key.as_ref(),
        }
        .serialize(serializer)
    }
}

/// One fan-out unit for the live telemetry dispatcher
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryUpdate {
    /// The archived row form of the sample
    pub row: TelemetryRow,

    /// Speed-limit warning derived for this sample, if any
    pub warning: Option<WarningRecord>,
}

/// Raw image blob read from the local capture directory
#[derive(Debug, Clone)]
pub struct ImageBlob {
    /// MIME type, e.g. "image/jpeg"
    pub content_type: String,

    /// Raw file contents
    pub data: Bytes,
}
