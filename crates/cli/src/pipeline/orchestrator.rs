//! Pipeline orchestrator - coordinates all components.
//!
//! Wires the sample feed (mock sensors or CSV replay), hazard assessment,
//! the telemetry buffer, the control poller, the sync engine, and the live
//! dispatcher together for one run.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{
    CoreError, DeviceBlueprint, TelemetryRow, TelemetrySample, TelemetryUpdate,
};
use hazard::{CommandClassifier, Detections, HazardClassifier, NullClassifier};
use ingestion::{
    FixedSpeedLimit, MockFrameSource, MockMotionSource, MockPositionSource, ReplayConfig,
    ReplayFeed, Sampler,
};
use remote_store::{Credentials, HttpStore, HttpStoreConfig, PasswordCredentials, StaticToken};
use sync_engine::{ControlPoller, EngineConfig, RideJournal, SyncEngine, TelemetryBuffer};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The device blueprint configuration
    pub blueprint: DeviceBlueprint,

    /// Maximum number of rows to sample (None = unlimited)
    pub max_rows: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Channel buffer size
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Replay recorded data path (instead of mock sensors)
    pub replay_path: Option<std::path::PathBuf>,

    /// Replay speed multiplier (1.0 = original speed)
    pub replay_speed: f64,

    /// Loop replay when finished
    pub replay_loop: bool,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

/// Classifier selected at runtime from the blueprint
enum PipelineClassifier {
    Command(CommandClassifier),
    Disabled(NullClassifier),
}

impl HazardClassifier for PipelineClassifier {
    async fn classify(&self, image: &Path) -> Result<Detections, CoreError> {
        match self {
            PipelineClassifier::Command(classifier) => classifier.classify(image).await,
            PipelineClassifier::Disabled(classifier) => classifier.classify(image).await,
        }
    }
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;
        let account = blueprint.device.account_id.clone();

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Remote store client
        let store = Arc::new(build_store(blueprint)?);
        info!(store = %blueprint.store.base_url, "Remote store client ready");

        // Durable journal + shared buffer
        let journal = Arc::new(
            RideJournal::open(&blueprint.device.spool_dir)
                .context("Failed to open ride journal")?,
        );
        let buffer = Arc::new(TelemetryBuffer::with_journal(journal.clone()));

        // Sync engine + control poller
        let (engine, ride_rx) = SyncEngine::new(
            store.clone(),
            EngineConfig {
                account: account.clone(),
                upload: blueprint.upload.clone(),
            },
            buffer.clone(),
            Some(journal),
        );
        let (events_tx, events_rx) = mpsc::channel(32);
        let poller = ControlPoller::new(
            store.clone(),
            account.clone(),
            blueprint.poller,
            ride_rx,
        );
        let poller_handle = poller.spawn(events_tx);
        let engine_handle = tokio::spawn(engine.run(events_rx));
        info!(poll_interval_s = blueprint.poller.interval_s, "Control poller started");

        // Live dispatcher
        let (updates_tx, updates_rx) = mpsc::channel::<TelemetryUpdate>(self.config.buffer_size);
        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - live telemetry will be dropped");
        }
        let dispatcher = dispatcher::create_dispatcher(
            blueprint.sinks.clone(),
            account.clone(),
            store.clone(),
            updates_rx,
        )
        .context("Failed to create dispatcher")?;
        let active_sinks = blueprint.sinks.len();
        let dispatcher_handle = dispatcher.spawn();
        info!(active_sinks, "Dispatcher started");

        // Hazard classifier
        let classifier = build_classifier(blueprint);

        // Sample feed: CSV replay or mock sensors
        let (samples_rx, feed) = self.start_sample_feed()?;

        let max_rows = self.config.max_rows;

        // Sample processing task: assess hazards, buffer, fan out live
        let buffer_for_loop = buffer.clone();
        let sample_task = async move {
            let mut stats = PipelineStats {
                active_sinks,
                ..Default::default()
            };

            while let Ok(sample) = samples_rx.recv().await {
                stats.rows_sampled += 1;
                stats.ride_stats.record_row();

                let update = assess_sample(&classifier, sample, &mut stats).await;
                buffer_for_loop.append(update.row.clone());

                if updates_tx.try_send(update).is_err() {
                    stats.updates_dropped += 1;
                }

                if let Some(max) = max_rows {
                    if stats.rows_sampled >= max {
                        info!(rows = stats.rows_sampled, "Reached max rows limit");
                        break;
                    }
                }
            }

            stats
        };

        // Run with optional timeout
        let stats = if let Some(timeout) = self.config.timeout {
            match tokio::time::timeout(timeout, sample_task).await {
                Ok(stats) => stats,
                Err(_) => {
                    warn!(timeout_secs = timeout.as_secs(), "Pipeline timed out");
                    PipelineStats::default()
                }
            }
        } else {
            sample_task.await
        };

        // Shutdown: stop the feed, let the dispatcher drain, then give the
        // engine time to complete any in-flight finalize (a bulk replace is
        // never cancelled mid-flight).
        info!("Shutting down pipeline...");
        feed.stop().await;
        poller_handle.abort();

        let rides_finalized =
            match tokio::time::timeout(Duration::from_secs(30), engine_handle).await {
                Ok(Ok(rides)) => rides,
                Ok(Err(e)) => {
                    warn!(error = %e, "Engine task failed");
                    0
                }
                Err(_) => {
                    warn!("Engine did not settle within shutdown budget");
                    0
                }
            };

        let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;

        let mut final_stats = stats;
        final_stats.rides_finalized = rides_finalized;
        final_stats.duration = start_time.elapsed();

        info!(
            duration_secs = final_stats.duration.as_secs_f64(),
            rate = format!("{:.2}", final_stats.rows_per_second()),
            "Pipeline shutdown complete"
        );

        Ok(final_stats)
    }

    fn start_sample_feed(&self) -> Result<(async_channel::Receiver<TelemetrySample>, SampleFeed)> {
        if let Some(ref replay_path) = self.config.replay_path {
            info!(path = %replay_path.display(), "Running in REPLAY mode");
            let feed = ReplayFeed::load(
                replay_path,
                ReplayConfig {
                    speed: self.config.replay_speed,
                    loop_replay: self.config.replay_loop,
                },
            )
            .with_context(|| format!("Failed to load replay from {}", replay_path.display()))?;
            let (rx, handle) = feed.start(self.config.buffer_size);
            Ok((rx, SampleFeed::Replay(handle)))
        } else {
            info!("Running in MOCK sensor mode (no hardware attached)");
            let sampler = Sampler::new(self.config.blueprint.sampler);
            let (rx, handle) = sampler.start(
                MockMotionSource::steady(),
                MockPositionSource::no_fix(),
                MockFrameSource::none(),
                FixedSpeedLimit(None),
                self.config.buffer_size,
            );
            Ok((rx, SampleFeed::Sampler(handle)))
        }
    }
}

/// Handle to whichever feed variant is running
enum SampleFeed {
    Sampler(ingestion::SamplerHandle),
    Replay(ingestion::ReplayHandle),
}

impl SampleFeed {
    async fn stop(self) {
        match self {
            SampleFeed::Sampler(handle) => {
                handle.join().await;
            }
            SampleFeed::Replay(handle) => handle.join().await,
        }
    }
}

/// Assess one sample and produce its dispatch unit
async fn assess_sample(
    classifier: &PipelineClassifier,
    sample: TelemetrySample,
    stats: &mut PipelineStats,
) -> TelemetryUpdate {
    let fused = hazard::assess(classifier, sample.image_path.as_deref()).await;
    stats
        .ride_stats
        .record_detector_failures(fused.failures.len() as u64);

    let row = TelemetryRow::from_sample(&sample, fused.severity);
    let warning = hazard::speed_warning(row.speed, row.speed_limit, row.timestamp);
    if warning.is_some() {
        stats.ride_stats.record_warning("speed_limit");
    }

    TelemetryUpdate { row, warning }
}

/// Build the remote store client from blueprint + environment credentials
fn build_store(blueprint: &DeviceBlueprint) -> Result<HttpStore<Credentials>> {
    let auth = &blueprint.store.auth;
    let timeout = Duration::from_secs_f64(blueprint.store.timeout_s);

    let credentials = if let Some(token) = auth
        .token_env
        .as_ref()
        .and_then(|variable| std::env::var(variable).ok())
    {
        Credentials::Static(StaticToken(token))
    } else {
        let api_key = require_env(&auth.api_key_env)?;
        let email = require_env(&auth.email_env)?;
        let password = require_env(&auth.password_env)?;
        Credentials::Password(
            PasswordCredentials::new(api_key, email, password, timeout)
                .context("Failed to build credential provider")?,
        )
    };

    HttpStore::new(
        HttpStoreConfig {
            base_url: blueprint.store.base_url.clone(),
            timeout,
        },
        credentials,
    )
    .context("Failed to build remote store client")
}

fn require_env(variable: &str) -> Result<String> {
    std::env::var(variable)
        .with_context(|| format!("Missing credential: environment variable '{variable}' is not set"))
}

/// Build the hazard classifier from the blueprint
fn build_classifier(blueprint: &DeviceBlueprint) -> PipelineClassifier {
    match &blueprint.detector.command {
        Some(command) => match std::env::var(&blueprint.detector.api_key_env) {
            Ok(api_key) => {
                info!(
                    command = %command.display(),
                    model = %blueprint.detector.model_id,
                    "Hazard classifier enabled"
                );
                PipelineClassifier::Command(CommandClassifier::new(
                    command,
                    blueprint.detector.model_id.clone(),
                    api_key,
                ))
            }
            Err(_) => {
                warn!(
                    variable = %blueprint.detector.api_key_env,
                    "Classifier API key not set, hazard classification disabled"
                );
                PipelineClassifier::Disabled(NullClassifier)
            }
        },
        None => {
            info!("Hazard classification disabled by configuration");
            PipelineClassifier::Disabled(NullClassifier)
        }
    }
}
