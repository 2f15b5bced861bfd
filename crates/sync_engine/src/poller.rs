//! Control intent poller
//!
//! Polls the resolved control node on a fixed interval and emits a
//! de-duplicated event stream. The one-shot compute flag is edge-detected:
//! an unchanged `true` across polls never re-fires until the flag has been
//! observed `false` again.

use std::sync::Arc;

use contracts::{AccountId, ControlIntent, PollerConfig, RemoteStore, RideId};
use remote_store::{resolve, Resolution};
use serde_json::json;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

/// Events emitted toward the sync engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// One poll cycle elapsed (drives finalize retries)
    Tick,
    /// The de-duplicated control intent changed
    Intent(ControlIntent),
    /// One-shot compute trigger (fired once per false->true edge)
    Compute,
}

/// Fixed-interval control poller
pub struct ControlPoller<S> {
    store: Arc<S>,
    account: AccountId,
    config: PollerConfig,
    /// Current ride from the engine; scopes layout resolution
    ride_rx: watch::Receiver<Option<RideId>>,
    last_emitted: Option<ControlIntent>,
    /// Armed after the compute flag has been observed false
    compute_armed: bool,
}

impl<S: RemoteStore + Send + Sync + 'static> ControlPoller<S> {
    /// Create a poller for one account
    pub fn new(
        store: Arc<S>,
        account: AccountId,
        config: PollerConfig,
        ride_rx: watch::Receiver<Option<RideId>>,
    ) -> Self {
        Self {
            store,
            account,
            config,
            ride_rx,
            last_emitted: None,
            compute_armed: true,
        }
    }

    /// Run one poll cycle and return the events it produced
    ///
    /// Always starts with `Tick`. A read failure produces no intent event;
    /// the previous known intent remains authoritative until a successful
    /// read changes it.
    #[instrument(name = "poller_poll_once", skip(self), fields(account = %self.account))]
    pub async fn poll_once(&mut self) -> Vec<ControlEvent> {
        let mut events = vec![ControlEvent::Tick];
        let ride = *self.ride_rx.borrow();

        match resolve(self.store.as_ref(), &self.account, ride).await {
            Err(e) => {
                warn!(error = %e, "control read failed, keeping last known intent");
                metrics::counter!("ride_syncer_poll_failures_total").increment(1);
            }
            Ok(Resolution::Ambiguous { layout, reason }) => {
                // Surfaced, never auto-resolved; no write goes near an
                // ambiguous path set.
                error!(layout = %layout, reason = %reason, "ambiguous control layout");
            }
            Ok(Resolution::NotFound) => {
                self.observe(ControlIntent::default(), None, &mut events).await;
            }
            Ok(Resolution::Resolved { paths, intent }) => {
                self.observe(intent, Some(paths.control.as_str()), &mut events)
                    .await;
            }
        }

        metrics::counter!("ride_syncer_polls_total").increment(1);
        events
    }

    async fn observe(
        &mut self,
        intent: ControlIntent,
        control_path: Option<&str>,
        events: &mut Vec<ControlEvent>,
    ) {
        if self.last_emitted != Some(intent) {
            debug!(?intent, "control intent changed");
            self.last_emitted = Some(intent);
            events.push(ControlEvent::Intent(intent));
        }

        if intent.compute_requested {
            if self.compute_armed {
                self.compute_armed = false;
                events.push(ControlEvent::Compute);
                self.clear_compute_flag(control_path).await;
            }
        } else {
            self.compute_armed = true;
        }
    }

    /// Best-effort write-back clearing the one-shot flag
    ///
    /// Failure does not block local processing; the edge detector already
    /// guarantees the event will not re-fire while the flag stays true.
    async fn clear_compute_flag(&self, control_path: Option<&str>) {
        let Some(path) = control_path else {
            return;
        };
        let clear = json!({ "calculate_model": false });
        if let Err(e) = self.store.patch_json(path, &clear).await {
            warn!(path = %path, error = %e, "failed to clear compute flag");
            metrics::counter!("ride_syncer_compute_clear_failures_total").increment(1);
        }
    }

    /// Spawn the polling loop, forwarding events into `events_tx`
    pub fn spawn(mut self, events_tx: mpsc::Sender<ControlEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            debug!(account = %self.account, interval_s = self.config.interval_s, "poller started");
            loop {
                interval.tick().await;
                for event in self.poll_once().await {
                    if events_tx.send(event).await.is_err() {
                        debug!("event channel closed, poller stopping");
                        return;
                    }
                }
            }
        })
    }
}
