//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::RideStatsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total rows sampled
    pub rows_sampled: u64,

    /// Live updates dropped because the dispatcher queue was full
    pub updates_dropped: u64,

    /// Rides finalized during the run
    pub rides_finalized: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of sinks that received data
    pub active_sinks: usize,

    /// Ride statistics aggregator
    pub ride_stats: RideStatsAggregator,
}

impl PipelineStats {
    /// Calculate sampled rows per second
    pub fn rows_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.rows_sampled as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Pipeline Statistics ===\n");

        println!("Overview");
        println!("   Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   Rows sampled: {}", self.rows_sampled);
        println!("   Sample rate: {:.2}/s", self.rows_per_second());
        println!("   Updates dropped: {}", self.updates_dropped);
        println!("   Rides finalized: {}", self.rides_finalized);
        println!("   Active sinks: {}", self.active_sinks);

        println!("\n{}", self.ride_stats.summary());
    }
}
