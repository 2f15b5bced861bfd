//! Fixed-rate sampling loop
//!
//! Drives the sensor collaborators at the configured rate and emits one
//! immutable snapshot per tick. Snapshots are passed by value; no shared
//! mutable "latest reading" state exists downstream of this loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_channel::{bounded, Receiver, TrySendError};
use contracts::{
    epoch_ms_now, FrameSource, MotionSource, PositionSource, SamplerConfig, SpeedLimitLookup,
    TelemetrySample,
};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace, warn};

/// Fixed-rate sensor sampler
pub struct Sampler {
    config: SamplerConfig,
}

/// Handle to a running sampler task
pub struct SamplerHandle {
    running: Arc<AtomicBool>,
    task: JoinHandle<u64>,
}

impl SamplerHandle {
    /// Signal the loop to stop after the current tick
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Wait for the loop to finish; returns the number of samples emitted
    pub async fn join(self) -> u64 {
        self.stop();
        self.task.await.unwrap_or(0)
    }
}

impl Sampler {
    /// Create a sampler with the given configuration
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// Start the sampling loop
    ///
    /// Returns the sample stream and a handle to stop the loop. The channel
    /// is bounded; when the consumer falls behind, samples are dropped and
    /// counted rather than blocking the sensor path.
    #[instrument(name = "sampler_start", skip_all)]
    pub fn start<M, P, F, L>(
        self,
        mut motion: M,
        mut position: P,
        mut frames: F,
        limits: L,
        channel_capacity: usize,
    ) -> (Receiver<TelemetrySample>, SamplerHandle)
    where
        M: MotionSource + 'static,
        P: PositionSource + 'static,
        F: FrameSource + 'static,
        L: SpeedLimitLookup + 'static,
    {
        let (tx, rx) = bounded(channel_capacity);
        let running = Arc::new(AtomicBool::new(true));
        let loop_running = running.clone();
        let config = self.config;

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(config.sample_interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            let mut limit_cache = SpeedLimitCache::new(config.speed_limit_refresh_s);
            let mut emitted: u64 = 0;

            debug!(rate_hz = config.rate_hz, "sampler started");

            while loop_running.load(Ordering::Relaxed) {
                interval.tick().await;

                let fix = position.read();
                let speed_limit = match fix {
                    Some(fix) => limit_cache.refresh(&limits, fix.latitude, fix.longitude).await,
                    None => limit_cache.last(),
                };

                let sample = TelemetrySample {
                    timestamp: epoch_ms_now(),
                    motion: motion.read(),
                    position: fix,
                    speed_limit,
                    image_path: frames.latest_frame(),
                };

                trace!(timestamp = sample.timestamp, "sample assembled");

                match tx.try_send(sample) {
                    Ok(()) => {
                        emitted += 1;
                        metrics::counter!("ride_syncer_samples_emitted_total").increment(1);
                    }
                    Err(TrySendError::Full(_)) => {
                        metrics::counter!("ride_syncer_samples_dropped_total").increment(1);
                        warn!("sample channel full, dropping sample");
                    }
                    Err(TrySendError::Closed(_)) => {
                        debug!("sample channel closed, stopping sampler");
                        break;
                    }
                }
            }

            debug!(emitted, "sampler stopped");
            emitted
        });

        (rx, SamplerHandle { running, task })
    }
}

/// Rate-limited speed-limit cache
///
/// The lookup API is queried at most once per refresh window; the cached
/// value is reused in between. A lookup failure keeps the previous value.
struct SpeedLimitCache {
    refresh_s: f64,
    value: Option<f64>,
    last_fetch: Option<Instant>,
}

impl SpeedLimitCache {
    fn new(refresh_s: f64) -> Self {
        Self {
            refresh_s,
            value: None,
            last_fetch: None,
        }
    }

    fn last(&self) -> Option<f64> {
        self.value
    }

    async fn refresh<L: SpeedLimitLookup>(
        &mut self,
        limits: &L,
        latitude: f64,
        longitude: f64,
    ) -> Option<f64> {
        let due = match self.last_fetch {
            None => true,
            Some(at) => at.elapsed().as_secs_f64() >= self.refresh_s,
        };
        if !due {
            return self.value;
        }

        self.last_fetch = Some(Instant::now());
        match limits.lookup(latitude, longitude).await {
            Ok(limit) => {
                self.value = limit;
            }
            Err(error) => {
                warn!(error = %error, "speed limit lookup failed, keeping cached value");
                metrics::counter!("ride_syncer_speed_limit_lookup_failures_total").increment(1);
            }
        }
        self.value
    }
}
