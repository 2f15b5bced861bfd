//! CSV replay feed
//!
//! Replays a recorded sensor stream (the device's CSV export format) as a
//! sample stream, with speed multiplier and loop options. Used for
//! development and soak testing without hardware.
//!
//! Column order: timestamp, image_path, acc_x, acc_y, acc_z, gyro_x, gyro_y,
//! gyro_z, latitude, longitude, speed, speed_limit. Empty fields are absent
//! readings. Timestamps are epoch seconds (fractional).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_channel::{bounded, Receiver};
use contracts::{CoreError, MotionReading, PositionFix, TelemetrySample};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

/// Replay behavior
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Playback speed multiplier (1.0 = realtime)
    pub speed: f64,
    /// Restart from the beginning when the recording ends
    pub loop_replay: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            loop_replay: false,
        }
    }
}

/// Parsed recording ready for playback
pub struct ReplayFeed {
    samples: Vec<TelemetrySample>,
    config: ReplayConfig,
}

/// Handle to a running replay task
pub struct ReplayHandle {
    running: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl ReplayHandle {
    /// Stop playback
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Wait for playback to finish
    pub async fn join(self) {
        self.stop();
        let _ = self.task.await;
    }
}

impl ReplayFeed {
    /// Parse a recorded CSV stream
    #[instrument(name = "replay_load", skip(config), fields(path = %path.display()))]
    pub fn load(path: &Path, config: ReplayConfig) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        let samples = parse_csv(&content)?;
        if samples.is_empty() {
            return Err(CoreError::config_parse(format!(
                "replay file has no data rows: {}",
                path.display()
            )));
        }
        debug!(rows = samples.len(), "replay recording loaded");
        Ok(Self { samples, config })
    }

    /// Number of samples in the recording
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the recording is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Start playback, emitting samples with their original timestamps
    pub fn start(self, channel_capacity: usize) -> (Receiver<TelemetrySample>, ReplayHandle) {
        let (tx, rx) = bounded(channel_capacity);
        let running = Arc::new(AtomicBool::new(true));
        let loop_running = running.clone();
        let config = self.config;
        let samples = self.samples;

        let task = tokio::spawn(async move {
            let speed = config.speed.max(0.01);
            loop {
                let mut previous_ts: Option<i64> = None;
                for sample in &samples {
                    if !loop_running.load(Ordering::Relaxed) {
                        return;
                    }

                    if let Some(prev) = previous_ts {
                        let gap_ms = (sample.timestamp - prev).max(0) as f64 / speed;
                        tokio::time::sleep(Duration::from_millis(gap_ms as u64)).await;
                    }
                    previous_ts = Some(sample.timestamp);

                    if tx.send(sample.clone()).await.is_err() {
                        debug!("replay channel closed");
                        return;
                    }
                }

                if !config.loop_replay {
                    break;
                }
                debug!("replay looping");
            }
            debug!("replay finished");
        });

        (rx, ReplayHandle { running, task })
    }
}

fn parse_csv(content: &str) -> Result<Vec<TelemetrySample>, CoreError> {
    let mut samples = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || (index == 0 && line.starts_with("timestamp")) {
            continue;
        }
        match parse_row(line) {
            Some(sample) => samples.push(sample),
            None => warn!(line_number = index + 1, "skipping unparseable replay row"),
        }
    }
    Ok(samples)
}

fn parse_row(line: &str) -> Option<TelemetrySample> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 12 {
        return None;
    }

    let timestamp_s: f64 = fields[0].parse().ok()?;
    let acc = [opt_f64(fields[2]), opt_f64(fields[3]), opt_f64(fields[4])];
    let gyro = [opt_f64(fields[5]), opt_f64(fields[6]), opt_f64(fields[7])];

    // Motion is all-or-nothing: the device writes all six or none
    let motion = match (acc, gyro) {
        ([Some(ax), Some(ay), Some(az)], [Some(gx), Some(gy), Some(gz)]) => Some(MotionReading {
            acc_x: ax,
            acc_y: ay,
            acc_z: az,
            gyro_x: gx,
            gyro_y: gy,
            gyro_z: gz,
        }),
        _ => None,
    };

    let position = match (opt_f64(fields[8]), opt_f64(fields[9]), opt_f64(fields[10])) {
        (Some(latitude), Some(longitude), speed) => Some(PositionFix {
            latitude,
            longitude,
            speed: speed.unwrap_or(0.0),
        }),
        _ => None,
    };

    Some(TelemetrySample {
        timestamp: (timestamp_s * 1000.0) as i64,
        motion,
        position,
        speed_limit: opt_f64(fields[11]),
        image_path: opt_path(fields[1]),
    })
}

fn opt_f64(field: &str) -> Option<f64> {
    let field = field.trim();
    if field.is_empty() || field == "None" {
        return None;
    }
    field.parse().ok()
}

fn opt_path(field: &str) -> Option<PathBuf> {
    let field = field.trim();
    if field.is_empty() || field == "None" {
        return None;
    }
    Some(PathBuf::from(field))
}
