//! Two-detector severity fusion
//!
//! A detector invocation failure must not fabricate a false positive: it is
//! mapped to "undetected" for that detector and reported upward as a
//! distinct condition, never conflated with a clean negative.

use std::path::Path;

use contracts::{CoreError, HazardSeverity};
use tracing::warn;

use crate::classifier::HazardClassifier;

/// One detector's verdict: detected / not detected / invocation failed
pub type DetectorReading = Result<bool, CoreError>;

/// Fusion result with any detector failures kept alongside the severity
#[derive(Debug)]
pub struct FusedHazard {
    /// Fused severity; failed detectors contribute "undetected"
    pub severity: HazardSeverity,

    /// Invocation failures, surfaced so callers can distinguish a degraded
    /// zero from a clean one
    pub failures: Vec<CoreError>,
}

impl FusedHazard {
    /// Whether any detector failed for this sample
    pub fn degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Pure 2-bit fusion, pothole as the high bit
pub fn severity(pothole_detected: bool, speedbump_detected: bool) -> HazardSeverity {
    HazardSeverity::from_flags(pothole_detected, speedbump_detected)
}

/// Fuse two independent detector readings
pub fn fuse_readings(pothole: DetectorReading, speed_bump: DetectorReading) -> FusedHazard {
    let mut failures = Vec::new();

    let pothole_detected = match pothole {
        Ok(detected) => detected,
        Err(error) => {
            failures.push(error);
            false
        }
    };
    let speedbump_detected = match speed_bump {
        Ok(detected) => detected,
        Err(error) => {
            failures.push(error);
            false
        }
    };

    FusedHazard {
        severity: severity(pothole_detected, speedbump_detected),
        failures,
    }
}

/// Run the classifier on a sample's image (if any) and fuse the verdicts
///
/// No image means nothing to assess: severity 0 with no failures. A single
/// classifier invocation covers both detector classes, so an invocation
/// failure degrades both.
pub async fn assess<C: HazardClassifier>(classifier: &C, image: Option<&Path>) -> FusedHazard {
    let Some(image) = image else {
        return FusedHazard {
            severity: HazardSeverity::Clear,
            failures: Vec::new(),
        };
    };

    let fused = match classifier.classify(image).await {
        Ok(detections) => fuse_readings(Ok(detections.pothole), Ok(detections.speed_bump)),
        Err(error) => {
            let message = error.to_string();
            fuse_readings(
                Err(CoreError::detector_failure("pothole", &message)),
                Err(CoreError::detector_failure("speed_bump", &message)),
            )
        }
    };

    if fused.degraded() {
        warn!(
            image = %image.display(),
            failures = fused.failures.len(),
            "detector failure, recording degraded severity"
        );
        metrics::counter!("ride_syncer_detector_failures_total")
            .increment(fused.failures.len() as u64);
    }

    fused
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Detections, NullClassifier};
    use std::path::PathBuf;

    #[test]
    fn test_severity_truth_table() {
        assert_eq!(severity(false, false).code(), 0);
        assert_eq!(severity(false, true).code(), 1);
        assert_eq!(severity(true, false).code(), 2);
        assert_eq!(severity(true, true).code(), 3);
    }

    #[test]
    fn test_failed_detector_is_undetected_but_reported() {
        let fused = fuse_readings(
            Err(CoreError::detector_failure("pothole", "classifier crashed")),
            Ok(true),
        );
        // Pothole failure must not fabricate the pothole bit
        assert_eq!(fused.severity, contracts::HazardSeverity::SpeedBump);
        assert!(fused.degraded());
        assert_eq!(fused.failures.len(), 1);
    }

    #[test]
    fn test_both_failed_is_degraded_zero() {
        let fused = fuse_readings(
            Err(CoreError::detector_failure("pothole", "down")),
            Err(CoreError::detector_failure("speed_bump", "down")),
        );
        assert_eq!(fused.severity.code(), 0);
        assert_eq!(fused.failures.len(), 2);
    }

    #[tokio::test]
    async fn test_assess_without_image_is_clean_zero() {
        let fused = assess(&NullClassifier, None).await;
        assert_eq!(fused.severity.code(), 0);
        assert!(!fused.degraded());
    }

    #[tokio::test]
    async fn test_assess_with_detections() {
        struct Always(Detections);
        impl HazardClassifier for Always {
            async fn classify(&self, _image: &Path) -> Result<Detections, CoreError> {
                Ok(self.0)
            }
        }

        let classifier = Always(Detections {
            pothole: true,
            speed_bump: true,
        });
        let fused = assess(&classifier, Some(&PathBuf::from("x.jpg"))).await;
        assert_eq!(fused.severity.code(), 3);
        assert!(!fused.degraded());
    }

    #[tokio::test]
    async fn test_assess_classifier_error_degrades_both() {
        struct Broken;
        impl HazardClassifier for Broken {
            async fn classify(&self, _image: &Path) -> Result<Detections, CoreError> {
                Err(CoreError::detector_failure("combined", "exit status 1"))
            }
        }

        let fused = assess(&Broken, Some(&PathBuf::from("x.jpg"))).await;
        assert_eq!(fused.severity.code(), 0);
        assert_eq!(fused.failures.len(), 2);
    }
}
