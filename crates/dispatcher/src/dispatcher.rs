//! Dispatcher - main loop for fan-out to sinks

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{AccountId, RemoteStore, SinkConfig, SinkType, TelemetryUpdate};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{CsvSink, LiveFeedSink, LogSink};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Sink configurations
    pub sinks: Vec<SinkConfig>,

    /// Account for remote-feed sinks
    pub account: AccountId,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    input_rx: mpsc::Receiver<TelemetryUpdate>,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: DispatcherConfig, input_rx: mpsc::Receiver<TelemetryUpdate>) -> Self {
        Self { config, input_rx }
    }

    /// Build and start the dispatcher
    #[instrument(name = "dispatcher_builder_build", skip(self, store))]
    pub fn build<S: RemoteStore + Send + Sync + 'static>(
        self,
        store: Arc<S>,
    ) -> Result<Dispatcher, DispatcherError> {
        let handles = Self::initialize_handles(&self.config, store)?;

        Ok(Dispatcher {
            handles,
            input_rx: self.input_rx,
        })
    }

    #[instrument(
        name = "dispatcher_initialize_handles",
        skip(config, store),
        fields(sink_count = config.sinks.len())
    )]
    fn initialize_handles<S: RemoteStore + Send + Sync + 'static>(
        config: &DispatcherConfig,
        store: Arc<S>,
    ) -> Result<Vec<SinkHandle>, DispatcherError> {
        let mut handles = Vec::with_capacity(config.sinks.len());
        for sink_config in &config.sinks {
            handles.push(create_sink_handle(
                sink_config,
                store.clone(),
                &config.account,
            )?);
        }
        Ok(handles)
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config, store),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle<S: RemoteStore + Send + Sync + 'static>(
    config: &SinkConfig,
    store: Arc<S>,
    account: &AccountId,
) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Csv => {
            let sink = CsvSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Live => {
            let sink = LiveFeedSink::new(&config.name, store, account);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// The main Dispatcher that fans out updates to sinks
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    input_rx: mpsc::Receiver<TelemetryUpdate>,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles (for testing)
    pub fn with_handles(
        handles: Vec<SinkHandle>,
        input_rx: mpsc::Receiver<TelemetryUpdate>,
    ) -> Self {
        Self { handles, input_rx }
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Run the dispatcher main loop
    ///
    /// Consumes updates from input and fans out to all sinks.
    /// Returns when input channel is closed.
    #[instrument(name = "dispatcher_run", skip(self))]
    pub async fn run(mut self) {
        info!(sinks = self.handles.len(), "Dispatcher started");

        let mut update_count: u64 = 0;

        while let Some(update) = self.input_rx.recv().await {
            update_count += 1;
            self.dispatch_update(&update);

            if update_count.is_multiple_of(100) {
                debug!(updates = update_count, "Dispatcher progress");
            }
        }

        info!(
            updates = update_count,
            "Dispatcher input closed, shutting down"
        );

        Self::shutdown_handles(self.handles).await;

        info!("Dispatcher shutdown complete");
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    fn dispatch_update(&self, update: &TelemetryUpdate) {
        for handle in &self.handles {
            handle.try_send(update.clone());
        }
    }

    async fn shutdown_handles(handles: Vec<SinkHandle>) {
        for handle in handles {
            handle.shutdown().await;
        }
    }
}

/// Convenience function to create a dispatcher from sink configs
#[instrument(name = "dispatcher_create", skip(sink_configs, input_rx, store))]
pub fn create_dispatcher<S: RemoteStore + Send + Sync + 'static>(
    sink_configs: Vec<SinkConfig>,
    account: AccountId,
    store: Arc<S>,
    input_rx: mpsc::Receiver<TelemetryUpdate>,
) -> Result<Dispatcher, DispatcherError> {
    let config = DispatcherConfig {
        sinks: sink_configs,
        account,
    };
    DispatcherBuilder::new(config, input_rx).build(store)
}
