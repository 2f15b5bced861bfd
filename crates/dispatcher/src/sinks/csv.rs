//! CsvSink - local CSV export of the sample stream
//!
//! Keeps the device's historical CSV column order so existing downstream
//! tooling keeps working:
//! timestamp, image_path, acc_x, acc_y, acc_z, gyro_x, gyro_y, gyro_z,
//! latitude, longitude, speed, speed_limit

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use chrono::Local;
use contracts::{CoreError, TelemetrySink, TelemetryUpdate};
use tracing::{debug, instrument};

const HEADER: &str =
    "timestamp,image_path,acc_x,acc_y,acc_z,gyro_x,gyro_y,gyro_z,latitude,longitude,speed,speed_limit";

/// Configuration for CsvSink
#[derive(Debug, Clone)]
pub struct CsvSinkConfig {
    /// Output file path
    pub path: PathBuf,
}

impl CsvSinkConfig {
    /// Create config from params map
    ///
    /// Without a `path` param a timestamped stream file is created in the
    /// working directory.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let path = params.get("path").map(PathBuf::from).unwrap_or_else(|| {
            let stamp = Local::now().format("%Y%m%d-%H%M%S");
            PathBuf::from(format!("sensor_stream_{stamp}.csv"))
        });
        Self { path }
    }
}

/// Sink that appends rows to a local CSV file
pub struct CsvSink {
    name: String,
    writer: BufWriter<File>,
    rows_since_flush: u32,
}

const FLUSH_EVERY_ROWS: u32 = 32;

impl CsvSink {
    /// Create a new CsvSink, appending to an existing file if present
    pub fn new(name: impl Into<String>, config: CsvSinkConfig) -> std::io::Result<Self> {
        let existing = config.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;
        let mut writer = BufWriter::new(file);

        if !existing {
            writeln!(writer, "{HEADER}")?;
        }

        Ok(Self {
            name: name.into(),
            writer,
            rows_since_flush: 0,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, CsvSinkConfig::from_params(params))
    }

    fn format_row(update: &TelemetryUpdate) -> String {
        let row = &update.row;
        let image = row
            .local_image_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            row.timestamp,
            image,
            opt(row.acc_x),
            opt(row.acc_y),
            opt(row.acc_z),
            opt(row.gyro_x),
            opt(row.gyro_y),
            opt(row.gyro_z),
            opt(row.latitude),
            opt(row.longitude),
            opt(row.speed),
            opt(row.speed_limit),
        )
    }

    fn append_row(&mut self, update: &TelemetryUpdate) -> std::io::Result<()> {
        writeln!(self.writer, "{}", Self::format_row(update))?;
        self.rows_since_flush += 1;
        if self.rows_since_flush >= FLUSH_EVERY_ROWS {
            self.writer.flush()?;
            self.rows_since_flush = 0;
        }
        Ok(())
    }
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl TelemetrySink for CsvSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "csv_sink_write",
        skip(self, update),
        fields(sink = %self.name, timestamp = update.row.timestamp)
    )]
    async fn write(&mut self, update: &TelemetryUpdate) -> Result<(), CoreError> {
        self.append_row(update)
            .map_err(|e| CoreError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "csv_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), CoreError> {
        self.writer
            .flush()
            .map_err(|e| CoreError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "csv_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), CoreError> {
        self.writer
            .flush()
            .map_err(|e| CoreError::sink_write(&self.name, e.to_string()))?;
        debug!(sink = %self.name, "CsvSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{HazardSeverity, MotionReading, PositionFix, TelemetryRow, TelemetrySample};

    fn full_update() -> TelemetryUpdate {
        let sample = TelemetrySample {
            timestamp: 1000,
            motion: Some(MotionReading {
                acc_x: 0.1,
                acc_y: 0.2,
                acc_z: 9.8,
                gyro_x: 0.0,
                gyro_y: 0.0,
                gyro_z: 0.0,
            }),
            position: Some(PositionFix {
                latitude: 17.385,
                longitude: 78.486,
                speed: 45.0,
            }),
            speed_limit: Some(40.0),
            image_path: Some(PathBuf::from("captured_images/x.jpg")),
        };
        TelemetryUpdate {
            row: TelemetryRow::from_sample(&sample, HazardSeverity::Clear),
            warning: None,
        }
    }

    #[tokio::test]
    async fn test_csv_sink_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.csv");
        let mut sink = CsvSink::new(
            "csv",
            CsvSinkConfig { path: path.clone() },
        )
        .unwrap();

        sink.write(&full_update()).await.unwrap();
        sink.flush().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("timestamp,image_path,acc_x"));
        assert!(lines[1].starts_with("1000,captured_images/x.jpg,0.1,0.2,9.8"));
        assert!(lines[1].ends_with(",45,40"));
    }

    #[tokio::test]
    async fn test_csv_sink_absent_fields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.csv");
        let mut sink = CsvSink::new("csv", CsvSinkConfig { path: path.clone() }).unwrap();

        let update = TelemetryUpdate {
            row: TelemetryRow::from_sample(&TelemetrySample::empty(7), HazardSeverity::Clear),
            warning: None,
        };
        sink.write(&update).await.unwrap();
        sink.flush().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.lines().nth(1).unwrap().starts_with("7,,,,,,,,,"));
    }

    #[tokio::test]
    async fn test_csv_sink_appends_without_duplicate_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.csv");

        {
            let mut sink = CsvSink::new("csv", CsvSinkConfig { path: path.clone() }).unwrap();
            sink.write(&full_update()).await.unwrap();
            sink.close().await.unwrap();
        }
        {
            let mut sink = CsvSink::new("csv", CsvSinkConfig { path: path.clone() }).unwrap();
            sink.write(&full_update()).await.unwrap();
            sink.close().await.unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let headers = content
            .lines()
            .filter(|l| l.starts_with("timestamp"))
            .count();
        assert_eq!(headers, 1);
        assert_eq!(content.lines().count(), 3);
    }
}
