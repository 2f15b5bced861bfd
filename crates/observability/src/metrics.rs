//! Ride metrics collection
//!
//! Prometheus-facing record functions plus an in-memory aggregator for the
//! end-of-run summary.

use std::collections::HashMap;

use metrics::{counter, gauge, histogram};

/// Record a poll cycle outcome
pub fn record_poll_outcome(success: bool) {
    let status = if success { "ok" } else { "failed" };
    counter!("ride_syncer_poll_cycles_total", "status" => status.to_string()).increment(1);
}

/// Record a ride start
pub fn record_ride_started(ride_id: u64) {
    counter!("ride_syncer_rides_started_total").increment(1);
    gauge!("ride_syncer_current_ride_id").set(ride_id as f64);
}

/// Record a finalize attempt outcome
pub fn record_finalize_outcome(ride_id: u64, rows: usize, success: bool) {
    let status = if success { "ok" } else { "failed" };
    counter!("ride_syncer_finalize_total", "status" => status.to_string()).increment(1);
    if success {
        histogram!("ride_syncer_finalized_rows").record(rows as f64);
        gauge!("ride_syncer_last_finalized_ride").set(ride_id as f64);
    }
}

/// Record a live feed push
pub fn record_live_push(success: bool) {
    let status = if success { "ok" } else { "failed" };
    counter!("ride_syncer_live_pushes_total", "status" => status.to_string()).increment(1);
}

/// Ride statistics aggregator
///
/// Aggregates per-ride statistics in memory for the run summary.
#[derive(Debug, Clone, Default)]
pub struct RideStatsAggregator {
    /// Rides started
    pub rides_started: u64,

    /// Rides finalized
    pub rides_finalized: u64,

    /// Finalize attempts that failed (ride stayed in Finalizing)
    pub finalize_failures: u64,

    /// Total rows sampled
    pub rows_sampled: u64,

    /// Rows per finalized ride
    pub ride_rows: RunningStats,

    /// Finalize latency (milliseconds, drain to replace success)
    pub finalize_latency_ms: RunningStats,

    /// Detector failures observed
    pub detector_failures: u64,

    /// Warnings raised per kind
    pub warning_counts: HashMap<String, u64>,
}

impl RideStatsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sampled row
    pub fn record_row(&mut self) {
        self.rows_sampled += 1;
    }

    /// Record a raised warning
    pub fn record_warning(&mut self, kind: &str) {
        *self.warning_counts.entry(kind.to_string()).or_insert(0) += 1;
    }

    /// Record detector failures for one sample
    pub fn record_detector_failures(&mut self, count: u64) {
        self.detector_failures += count;
    }

    /// Record a ride start
    pub fn record_ride_started(&mut self) {
        self.rides_started += 1;
    }

    /// Record a finalize outcome
    pub fn record_finalize(&mut self, rows: usize, latency_ms: f64, success: bool) {
        if success {
            self.rides_finalized += 1;
            self.ride_rows.push(rows as f64);
            self.finalize_latency_ms.push(latency_ms);
        } else {
            self.finalize_failures += 1;
        }
    }

    /// Produce the summary report
    pub fn summary(&self) -> RideStatsSummary {
        RideStatsSummary {
            rides_started: self.rides_started,
            rides_finalized: self.rides_finalized,
            finalize_failures: self.finalize_failures,
            rows_sampled: self.rows_sampled,
            detector_failures: self.detector_failures,
            ride_rows: StatsSummary::from(&self.ride_rows),
            finalize_latency_ms: StatsSummary::from(&self.finalize_latency_ms),
            warning_counts: self.warning_counts.clone(),
        }
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Summary report for one run
#[derive(Debug, Clone, Default)]
pub struct RideStatsSummary {
    pub rides_started: u64,
    pub rides_finalized: u64,
    pub finalize_failures: u64,
    pub rows_sampled: u64,
    pub detector_failures: u64,
    pub ride_rows: StatsSummary,
    pub finalize_latency_ms: StatsSummary,
    pub warning_counts: HashMap<String, u64>,
}

impl std::fmt::Display for RideStatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Ride Stats Summary ===")?;
        writeln!(f, "Rides started: {}", self.rides_started)?;
        writeln!(f, "Rides finalized: {}", self.rides_finalized)?;
        writeln!(f, "Finalize failures: {}", self.finalize_failures)?;
        writeln!(f, "Rows sampled: {}", self.rows_sampled)?;
        writeln!(f, "Detector failures: {}", self.detector_failures)?;
        writeln!(f, "Rows per ride: {}", self.ride_rows)?;
        writeln!(f, "Finalize latency (ms): {}", self.finalize_latency_ms)?;

        if !self.warning_counts.is_empty() {
            writeln!(f, "Warnings raised:")?;
            for (kind, count) in &self.warning_counts {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}
