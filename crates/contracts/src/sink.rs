//! TelemetrySink trait - Dispatcher output interface
//!
//! Defines the abstract interface for live telemetry sinks.

use crate::{CoreError, TelemetryUpdate};

/// Telemetry output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(TelemetrySink: Send)]
pub trait LocalTelemetrySink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one telemetry update
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, update: &TelemetryUpdate) -> Result<(), CoreError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), CoreError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), CoreError>;
}
