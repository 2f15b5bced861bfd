//! Hazard severity code and warning records.

use serde::{Deserialize, Serialize};

/// Fused two-detector hazard severity
///
/// 2-bit encoding with pothole as the high bit:
/// 0 = neither, 1 = speed-bump only, 2 = pothole only, 3 = both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum HazardSeverity {
    #[default]
    Clear = 0,
    SpeedBump = 1,
    Pothole = 2,
    Both = 3,
}

impl HazardSeverity {
    /// Fuse two independent binary detector outputs
    pub fn from_flags(pothole: bool, speed_bump: bool) -> Self {
        match (pothole, speed_bump) {
            (false, false) => Self::Clear,
            (false, true) => Self::SpeedBump,
            (true, false) => Self::Pothole,
            (true, true) => Self::Both,
        }
    }

    /// Numeric severity code (0-3)
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<HazardSeverity> for u8 {
    fn from(severity: HazardSeverity) -> Self {
        severity as u8
    }
}

impl TryFrom<u8> for HazardSeverity {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Clear),
            1 => Ok(Self::SpeedBump),
            2 => Ok(Self::Pothole),
            3 => Ok(Self::Both),
            other => Err(format!("severity code out of range: {other}")),
        }
    }
}

/// Warning kinds pushed to the live feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    SpeedLimit,
}

/// One warning record, keyed remotely as `warning_{timestamp}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningRecord {
    /// Warning type discriminator
    #[serde(rename = "type")]
    pub kind: WarningKind,

    /// Operator-facing message
    pub message: String,

    /// Epoch milliseconds at which the warning was raised
    pub timestamp: i64,
}

impl WarningRecord {
    /// Remote key for this record
    pub fn key(&self) -> String {
        format!("warning_{}", self.timestamp)
    }
}
