//! Sink implementations

mod csv;
mod live;
mod log;

pub use csv::{CsvSink, CsvSinkConfig};
pub use live::LiveFeedSink;
pub use log::LogSink;
