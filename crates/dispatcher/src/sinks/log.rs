//! LogSink - logs update summary via tracing

use contracts::{CoreError, TelemetrySink, TelemetryUpdate};
use tracing::{info, instrument};

/// Sink that logs update summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_update_summary(&self, update: &TelemetryUpdate) {
        let row = &update.row;
        info!(
            sink = %self.name,
            timestamp = row.timestamp,
            speed = row.speed,
            speed_limit = row.speed_limit,
            severity = row.hazard_severity.code(),
            warning = update.warning.is_some(),
            has_image = row.local_image_path.is_some(),
            "Telemetry update"
        );
    }
}

impl TelemetrySink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, update),
        fields(sink = %self.name, timestamp = update.row.timestamp)
    )]
    async fn write(&mut self, update: &TelemetryUpdate) -> Result<(), CoreError> {
        self.log_update_summary(update);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), CoreError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), CoreError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
