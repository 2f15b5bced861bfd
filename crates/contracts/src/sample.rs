//! TelemetrySample - Sampler output
//!
//! Immutable snapshot of the latest sensor values, assembled once per tick
//! and passed by value downstream. Absence of a reading is distinct from a
//! zero reading.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One motion sensor reading (accelerometer in g, gyroscope in rad/s)
///
/// Entirely absent when the motion read failed; fields are never
/// individually missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionReading {
    pub acc_x: f64,
    pub acc_y: f64,
    pub acc_z: f64,
    pub gyro_x: f64,
    pub gyro_y: f64,
    pub gyro_z: f64,
}

/// One satellite positioning fix
///
/// Entirely absent when there is no fix (including the receiver's warm-up
/// window after cold start). Speed is km/h.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
}

/// Immutable per-tick snapshot of all sensor collaborators
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    /// Capture timestamp (epoch milliseconds)
    pub timestamp: i64,

    /// Motion reading, absent if the sensor read failed
    pub motion: Option<MotionReading>,

    /// Position fix, absent without satellite lock
    pub position: Option<PositionFix>,

    /// Speed limit at the current position (km/h), absent when unknown
    pub speed_limit: Option<f64>,

    /// Most recent captured still image, absent if capture failed
    pub image_path: Option<PathBuf>,
}

impl TelemetrySample {
    /// Empty sample at a timestamp (all collaborators absent)
    pub fn empty(timestamp: i64) -> Self {
        Self {
            timestamp,
            motion: None,
            position: None,
            speed_limit: None,
            image_path: None,
        }
    }
}

/// Current wall-clock time as epoch milliseconds
pub fn epoch_ms_now() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
