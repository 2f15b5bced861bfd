//! Sensor collaborator traits
//!
//! Raw acquisition lives outside this core; these traits define the boundary.
//! Every reading is latest-value semantics: a source hands out the most
//! recent value it has, or `None` when it has nothing (sensor read failure,
//! no satellite lock, capture failure). Absence is never an error.

use std::future::Future;
use std::path::PathBuf;

use crate::{CoreError, MotionReading, PositionFix};

/// Motion sensor boundary (accelerometer + gyroscope)
pub trait MotionSource: Send {
    /// Latest motion reading, `None` if the read failed
    fn read(&mut self) -> Option<MotionReading>;
}

/// Satellite positioning boundary
///
/// Receivers have a warm-up window of minutes after cold start during which
/// every read returns `None`.
pub trait PositionSource: Send {
    /// Latest fix, `None` without satellite lock
    fn read(&mut self) -> Option<PositionFix>;
}

/// Forward camera boundary
pub trait FrameSource: Send {
    /// Path of the most recently captured still image
    fn latest_frame(&mut self) -> Option<PathBuf>;
}

/// Speed-limit lookup boundary
///
/// Implementations are expected to be network-backed; callers rate-limit.
pub trait SpeedLimitLookup: Send + Sync {
    /// Speed limit (km/h) at a coordinate, `None` when the service has no
    /// answer for the location
    fn lookup(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<Option<f64>, CoreError>> + Send;
}
