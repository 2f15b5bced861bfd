//! Speed-limit warning derivation

use contracts::{WarningKind, WarningRecord};

/// Derive a speed-limit warning for one sample
///
/// A record is produced if and only if both speed and limit are present and
/// the speed exceeds the limit. Missing position or limit data means "cannot
/// currently evaluate", never "violating".
pub fn speed_warning(
    speed: Option<f64>,
    speed_limit: Option<f64>,
    timestamp: i64,
) -> Option<WarningRecord> {
    let (speed, limit) = (speed?, speed_limit?);
    if speed <= limit {
        return None;
    }

    Some(WarningRecord {
        kind: WarningKind::SpeedLimit,
        message: "Speed Limit Exceeded!".to_string(),
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_limit_produces_record() {
        let record = speed_warning(Some(50.0), Some(40.0), 1234).unwrap();
        assert_eq!(record.kind, WarningKind::SpeedLimit);
        assert_eq!(record.timestamp, 1234);
        assert_eq!(record.key(), "warning_1234");
    }

    #[test]
    fn test_under_limit_is_none() {
        assert!(speed_warning(Some(30.0), Some(40.0), 0).is_none());
    }

    #[test]
    fn test_exactly_at_limit_is_none() {
        assert!(speed_warning(Some(40.0), Some(40.0), 0).is_none());
    }

    #[test]
    fn test_absent_inputs_are_none() {
        assert!(speed_warning(None, Some(40.0), 0).is_none());
        assert!(speed_warning(Some(50.0), None, 0).is_none());
        assert!(speed_warning(None, None, 0).is_none());
    }
}
