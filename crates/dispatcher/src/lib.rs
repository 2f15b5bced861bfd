//! # Dispatcher
//!
//! Live telemetry fan-out. Every sampled row (plus its derived warning) is
//! distributed to configured sinks through per-sink isolated queues: a slow
//! or failing sink drops its own updates and never stalls the sampling path.

mod dispatcher;
mod error;
mod handle;
mod metrics;
mod sinks;

pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{CsvSink, LiveFeedSink, LogSink};
