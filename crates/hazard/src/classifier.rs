//! Black-box image classifier boundary
//!
//! The classifier is an external program invoked per still image with a
//! model identifier and an API key. It prints a prediction list on stdout;
//! this side consumes only "which detector classes appear".
//!
//! Exit status contract: 0 = predictions on stdout, 255 = no input provided
//! (clean no-detection), anything else = invocation failure.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use contracts::CoreError;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Per-class detection flags for one image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Detections {
    pub pothole: bool,
    pub speed_bump: bool,
}

/// Image hazard classifier boundary
pub trait HazardClassifier: Send + Sync {
    /// Classify one still image
    fn classify(&self, image: &Path) -> impl Future<Output = Result<Detections, CoreError>> + Send;
}

/// Classifier that never detects anything (classification disabled)
pub struct NullClassifier;

impl HazardClassifier for NullClassifier {
    async fn classify(&self, _image: &Path) -> Result<Detections, CoreError> {
        Ok(Detections::default())
    }
}

/// Subprocess-backed classifier
pub struct CommandClassifier {
    command: PathBuf,
    model_id: String,
    api_key: String,
}

const EXIT_NO_INPUT: i32 = 255;

impl CommandClassifier {
    /// Create a classifier invoking `command` per image
    pub fn new(
        command: impl Into<PathBuf>,
        model_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            model_id: model_id.into(),
            api_key: api_key.into(),
        }
    }
}

impl HazardClassifier for CommandClassifier {
    #[instrument(name = "classifier_invoke", skip(self), fields(image = %image.display()))]
    async fn classify(&self, image: &Path) -> Result<Detections, CoreError> {
        let output = Command::new(&self.command)
            .arg("--model")
            .arg(&self.model_id)
            .arg("--api-key")
            .arg(&self.api_key)
            .arg(image)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                CoreError::detector_failure("classifier", format!("spawn failed: {e}"))
            })?;

        match output.status.code() {
            Some(0) => {}
            Some(EXIT_NO_INPUT) => {
                // The classifier had nothing to work on; a clean negative.
                debug!("classifier reported no input");
                return Ok(Detections::default());
            }
            Some(code) => {
                return Err(CoreError::detector_failure(
                    "classifier",
                    format!("exit status {code}"),
                ));
            }
            None => {
                return Err(CoreError::detector_failure(
                    "classifier",
                    "terminated by signal",
                ));
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_predictions(&stdout)
    }
}

/// Parse the classifier's prediction list
///
/// Expected shape: `{"predictions": [{"class": "Pothole", ...}, ...]}`.
/// Detector membership is by class-name substring, case-insensitive
/// ("speed" also catches "Speed-Bump").
fn parse_predictions(stdout: &str) -> Result<Detections, CoreError> {
    let body: Value = serde_json::from_str(stdout.trim()).map_err(|e| {
        CoreError::detector_failure("classifier", format!("malformed output: {e}"))
    })?;

    let predictions = body
        .get("predictions")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            CoreError::detector_failure("classifier", "missing 'predictions' list")
        })?;

    let mut detections = Detections::default();
    for prediction in predictions {
        let Some(class) = prediction.get("class").and_then(Value::as_str) else {
            continue;
        };
        let class = class.to_lowercase();
        if class.contains("pothole") {
            detections.pothole = true;
        }
        if class.contains("speed") {
            detections.speed_bump = true;
        }
    }

    Ok(detections)
}
