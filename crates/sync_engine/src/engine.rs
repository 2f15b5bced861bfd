//! Ride state machine and finalize upload
//!
//! `Idle -> Active -> Finalizing -> Idle`. Finalization uploads linked image
//! blobs first (concurrently, per-blob retry budget), then replaces the
//! remote ride-data collection in a single PUT. The ride stays `Finalizing`
//! until that replace succeeds; intent observations are latched meanwhile.

use std::path::Path;
use std::sync::Arc;

use base64::Engine as _;
use bytes::Bytes;
use contracts::{
    epoch_ms_now, AccountId, ControlIntent, CoreError, ImageBlob, PathLayout, RemotePathSet,
    RemoteStore, RetryPolicy, RideId, RideState, TelemetryRow, UploadConfig,
};
use remote_store::{next_ride_id, resolve, retry_with_backoff, Resolution};
use serde_json::{json, Value};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::buffer::TelemetryBuffer;
use crate::journal::RideJournal;
use crate::poller::ControlEvent;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Account this device records for
    pub account: AccountId,

    /// Finalize upload behavior
    pub upload: UploadConfig,
}

/// Active ride bookkeeping
#[derive(Debug)]
struct RideSession {
    ride_id: RideId,
    start_time: i64,
    paths: RemotePathSet,
}

/// A drained ride awaiting its bulk replace
#[derive(Debug)]
struct PendingFinalize {
    ride_id: RideId,
    paths: RemotePathSet,
    rows: Vec<TelemetryRow>,
    attempts: u32,
}

/// Ride lifecycle state machine
pub struct SyncEngine<S> {
    store: Arc<S>,
    config: EngineConfig,
    buffer: Arc<TelemetryBuffer>,
    journal: Option<Arc<RideJournal>>,
    state: RideState,
    session: Option<RideSession>,
    pending: Option<PendingFinalize>,
    /// Last intent observed, kept for tick-driven recovery of a failed start
    /// and for releasing the latch after a compute-triggered finalize
    last_intent: ControlIntent,
    ride_tx: watch::Sender<Option<RideId>>,
    rides_finalized: u64,
}

impl<S: RemoteStore + Send + Sync + 'static> SyncEngine<S> {
    /// Create an engine; the returned watch channel publishes the current
    /// ride id for layout resolution (consumed by the poller)
    pub fn new(
        store: Arc<S>,
        config: EngineConfig,
        buffer: Arc<TelemetryBuffer>,
        journal: Option<Arc<RideJournal>>,
    ) -> (Self, watch::Receiver<Option<RideId>>) {
        let (ride_tx, ride_rx) = watch::channel(None);
        (
            Self {
                store,
                config,
                buffer,
                journal,
                state: RideState::Idle,
                session: None,
                pending: None,
                last_intent: ControlIntent::default(),
                ride_tx,
                rides_finalized: 0,
            },
            ride_rx,
        )
    }

    /// Current lifecycle state
    pub fn state(&self) -> RideState {
        self.state
    }

    /// Ride currently active or finalizing
    pub fn current_ride(&self) -> Option<RideId> {
        self.session
            .as_ref()
            .map(|s| s.ride_id)
            .or_else(|| self.pending.as_ref().map(|p| p.ride_id))
    }

    /// Rides finalized since startup
    pub fn rides_finalized(&self) -> u64 {
        self.rides_finalized
    }

    /// Consume the control event stream until it closes
    pub async fn run(mut self, mut events: mpsc::Receiver<ControlEvent>) -> u64 {
        if let Err(e) = self.recover().await {
            error!(error = %e, "journal recovery failed");
        }

        while let Some(event) = events.recv().await {
            if let Err(e) = self.handle_event(event).await {
                warn!(error = %e, "engine event handling failed");
            }
        }

        info!(
            rides = self.rides_finalized,
            "engine event stream closed"
        );
        self.rides_finalized
    }

    /// Handle one control event
    #[instrument(name = "engine_handle_event", skip(self), fields(state = ?self.state))]
    pub async fn handle_event(&mut self, event: ControlEvent) -> Result<(), CoreError> {
        match event {
            ControlEvent::Intent(intent) => {
                self.last_intent = intent;
                match (self.state, intent.is_active) {
                    (RideState::Idle, true) => self.start_ride().await,
                    (RideState::Active, false) => {
                        self.begin_finalize();
                        self.try_finalize_pending().await
                    }
                    (RideState::Finalizing, _) => {
                        debug!("intent latched until finalize completes");
                        Ok(())
                    }
                    _ => Ok(()),
                }
            }
            ControlEvent::Compute => {
                if self.state == RideState::Active {
                    self.begin_finalize();
                    self.try_finalize_pending().await
                } else {
                    debug!(state = ?self.state, "compute event outside an active ride, ignored");
                    Ok(())
                }
            }
            ControlEvent::Tick => match self.state {
                RideState::Finalizing => self.try_finalize_pending().await,
                // A failed start, or an is_active latched through a
                // compute-triggered finalize, is retried here.
                RideState::Idle if self.last_intent.is_active => self.start_ride().await,
                _ => Ok(()),
            },
        }
    }

    /// Finalize any rides the journal recorded before a restart
    pub async fn recover(&mut self) -> Result<(), CoreError> {
        if self.adopt_next_pending().await? {
            self.try_finalize_pending().await
        } else {
            Ok(())
        }
    }

    #[instrument(name = "engine_start_ride", skip(self))]
    async fn start_ride(&mut self) -> Result<(), CoreError> {
        let account = self.config.account.clone();
        let ride_id = next_ride_id(self.store.as_ref(), &account).await?;
        let start_time = epoch_ms_now();

        // Create the ride-scoped control node before resolving. This is the
        // migration write every deployment generation performs: once the
        // node exists, resolution selects the ride-scoped layout. If the
        // write cannot land, resolution falls back to whichever legacy node
        // commanded the start.
        let init = json!({
            "is_active": true,
            "start_timestamp": start_time,
            "calculate_model": false,
        });
        if let Some(scoped) =
            RemotePathSet::from_layout(PathLayout::RideScoped, &account, Some(ride_id))
        {
            if let Err(e) = self.store.patch_json(&scoped.control, &init).await {
                warn!(ride_id, error = %e, "ride control init write failed");
            }
        }

        let paths = self.resolve_paths_for(ride_id).await?;

        self.buffer.begin(ride_id);
        let _ = self.ride_tx.send(Some(ride_id));
        info!(ride_id, layout = %paths.layout, start_time, "ride started");
        metrics::counter!("ride_syncer_rides_started_total").increment(1);

        self.session = Some(RideSession {
            ride_id,
            start_time,
            paths,
        });
        self.state = RideState::Active;
        Ok(())
    }

    /// Stop collecting and stage the drained rows for upload
    fn begin_finalize(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        self.buffer.end();
        let rows = self.buffer.drain();
        info!(
            ride_id = session.ride_id,
            rows = rows.len(),
            duration_ms = epoch_ms_now() - session.start_time,
            "ride stopped, finalizing"
        );
        metrics::histogram!("ride_syncer_finalize_rows").record(rows.len() as f64);

        self.pending = Some(PendingFinalize {
            ride_id: session.ride_id,
            paths: session.paths,
            rows,
            attempts: 0,
        });
        self.state = RideState::Finalizing;
    }

    /// One finalize attempt: settle image uploads, then bulk-replace
    #[instrument(name = "engine_try_finalize", skip(self))]
    async fn try_finalize_pending(&mut self) -> Result<(), CoreError> {
        let Some(pending) = self.pending.as_mut() else {
            return Ok(());
        };
        pending.attempts += 1;
        metrics::counter!("ride_syncer_finalize_attempts_total").increment(1);

        // Every image upload must have succeeded or been given up on before
        // the replace is issued; partial completion is tolerated, partial
        // visibility of the ride record is not.
        upload_images(
            self.store.clone(),
            &pending.paths,
            &mut pending.rows,
            &self.config.upload,
        )
        .await;

        let value = rows_to_remote_value(&pending.rows)?;
        let path = pending.paths.ride_data.clone();
        let store = self.store.clone();
        let replace = retry_with_backoff(
            &self.config.upload.replace_retry,
            "ride_data_replace",
            || {
                let store = store.clone();
                let path = path.clone();
                let value = value.clone();
                async move { store.put_json(&path, &value).await }
            },
        )
        .await;

        match replace {
            Ok(()) => {
                let ride_id = pending.ride_id;
                let rows = pending.rows.len();
                if let Some(journal) = &self.journal {
                    if let Err(e) = journal.remove(ride_id) {
                        warn!(ride_id, error = %e, "journal cleanup failed");
                    }
                }
                self.pending = None;
                self.state = RideState::Idle;
                let _ = self.ride_tx.send(None);
                self.rides_finalized += 1;
                info!(ride_id, rows, "ride finalized");
                metrics::counter!("ride_syncer_rides_finalized_total").increment(1);

                // A restart may have left older journals behind this one
                self.adopt_next_pending().await?;
                Ok(())
            }
            Err(e) => {
                let ride_id = pending.ride_id;
                let attempts = pending.attempts;
                warn!(ride_id, attempts, error = %e, "bulk replace failed, ride stays finalizing");
                metrics::counter!("ride_syncer_finalize_failures_total").increment(1);
                Err(CoreError::FinalizeIncomplete { ride_id, attempts })
            }
        }
    }

    /// Stage the oldest journaled ride, if any, as the pending finalize
    async fn adopt_next_pending(&mut self) -> Result<bool, CoreError> {
        let Some(journal) = self.journal.clone() else {
            return Ok(false);
        };

        for ride_id in journal.pending()? {
            let rows = journal.load(ride_id)?;
            if rows.is_empty() {
                journal.remove(ride_id)?;
                continue;
            }

            info!(ride_id, rows = rows.len(), "adopting journaled ride for finalize");
            let paths = self.resolve_paths_for(ride_id).await?;
            self.pending = Some(PendingFinalize {
                ride_id,
                paths,
                rows,
                attempts: 0,
            });
            self.state = RideState::Finalizing;
            let _ = self.ride_tx.send(Some(ride_id));
            return Ok(true);
        }
        Ok(false)
    }

    /// Authoritative path set for a ride
    ///
    /// `NotFound` falls back to the ride-scoped templates: the device is
    /// about to create the nodes it will write. `Ambiguous` aborts; no write
    /// goes near an ambiguous path set.
    async fn resolve_paths_for(&self, ride_id: RideId) -> Result<RemotePathSet, CoreError> {
        match resolve(self.store.as_ref(), &self.config.account, Some(ride_id)).await? {
            Resolution::Resolved { paths, .. } => Ok(paths),
            Resolution::Ambiguous { layout, reason } => {
                Err(CoreError::layout_ambiguous(layout.to_string(), reason))
            }
            Resolution::NotFound => {
                RemotePathSet::from_layout(PathLayout::RideScoped, &self.config.account, Some(ride_id))
                    .ok_or_else(|| CoreError::Other("ride-scoped template needs a ride id".into()))
            }
        }
    }
}

/// Upload every pending image blob, concurrently, settling all before return
///
/// Success rewrites the row's `image_key` and drops the local path; failure
/// keeps the local path and the row ships without a remote reference.
/// Duplicate timestamp keys within one ride are last-write-wins at the
/// remote key.
async fn upload_images<S: RemoteStore + Send + Sync + 'static>(
    store: Arc<S>,
    paths: &RemotePathSet,
    rows: &mut [TelemetryRow],
    config: &UploadConfig,
) {
    let mut uploads = JoinSet::new();

    for (index, row) in rows.iter().enumerate() {
        if row.image_key.is_some() {
            continue;
        }
        let Some(local) = row.local_image_path.clone() else {
            continue;
        };

        let blob_path = paths.image_path(&row.timestamp.to_string());
        let store = store.clone();
        let content_type = config.image_content_type.clone();
        let retry = config.image_retry;
        uploads.spawn(async move {
            let key = upload_one_image(store, &blob_path, &local, &content_type, &retry).await;
            (index, key)
        });
    }

    while let Some(joined) = uploads.join_next().await {
        match joined {
            Ok((index, Some(key))) => {
                rows[index].image_key = Some(key);
                rows[index].local_image_path = None;
                metrics::counter!("ride_syncer_images_uploaded_total").increment(1);
            }
            Ok((index, None)) => {
                debug!(row = index, "image not uploaded, row ships without remote reference");
                metrics::counter!("ride_syncer_images_failed_total").increment(1);
            }
            Err(e) => {
                error!(error = %e, "image upload task failed");
            }
        }
    }
}

/// Upload one blob; `None` means given up (row keeps its local path)
async fn upload_one_image<S: RemoteStore>(
    store: Arc<S>,
    blob_path: &str,
    local: &Path,
    content_type: &str,
    retry: &RetryPolicy,
) -> Option<String> {
    let data = match tokio::fs::read(local).await {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %local.display(), error = %e, "image file unreadable");
            return None;
        }
    };

    let blob = ImageBlob {
        content_type: content_type.to_string(),
        data: Bytes::from(data),
    };
    let document = json!({
        "content_type": blob.content_type,
        "uploaded_at": epoch_ms_now(),
        "data_base64": base64::engine::general_purpose::STANDARD.encode(&blob.data),
    });

    let result = retry_with_backoff(retry, "image_upload", || {
        let store = store.clone();
        let path = blob_path.to_string();
        let document = document.clone();
        async move { store.put_json(&path, &document).await }
    })
    .await;

    match result {
        Ok(()) => Some(blob_path.to_string()),
        Err(e) => {
            warn!(path = blob_path, error = %e, "image upload gave up");
            None
        }
    }
}

fn rows_to_remote_value(rows: &[TelemetryRow]) -> Result<Value, CoreError> {
    rows.iter()
        .map(|row| {
            serde_json::to_value(row.remote_view())
                .map_err(|e| CoreError::Other(format!("row encode: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{HazardSeverity, TelemetrySample};
    use remote_store::MockStore;
    use std::io::Write;

    fn make_row(timestamp: i64) -> TelemetryRow {
        TelemetryRow::from_sample(&TelemetrySample::empty(timestamp), HazardSeverity::Clear)
    }

    fn fast_upload_config() -> UploadConfig {
        UploadConfig {
            replace_retry: RetryPolicy {
                max_attempts: 1,
                base_backoff_ms: 1,
                max_backoff_ms: 1,
            },
            image_retry: RetryPolicy {
                max_attempts: 2,
                base_backoff_ms: 1,
                max_backoff_ms: 1,
            },
            image_content_type: "image/jpeg".to_string(),
        }
    }

    fn make_engine(
        store: Arc<MockStore>,
    ) -> (SyncEngine<MockStore>, Arc<TelemetryBuffer>) {
        let buffer = Arc::new(TelemetryBuffer::new());
        let (engine, _ride_rx) = SyncEngine::new(
            store,
            EngineConfig {
                account: "acct".to_string(),
                upload: fast_upload_config(),
            },
            buffer.clone(),
            None,
        );
        (engine, buffer)
    }

    fn active() -> ControlEvent {
        ControlEvent::Intent(ControlIntent {
            is_active: true,
            compute_requested: false,
        })
    }

    fn inactive() -> ControlEvent {
        ControlEvent::Intent(ControlIntent {
            is_active: false,
            compute_requested: false,
        })
    }

    #[tokio::test]
    async fn test_full_ride_lifecycle() {
        let store = Arc::new(MockStore::new());
        let (mut engine, buffer) = make_engine(store.clone());

        assert_eq!(engine.state(), RideState::Idle);
        engine.handle_event(active()).await.unwrap();
        assert_eq!(engine.state(), RideState::Active);
        assert_eq!(engine.current_ride(), Some(0));

        for ts in 0..5 {
            assert!(buffer.append(make_row(ts)));
        }

        engine.handle_event(inactive()).await.unwrap();
        assert_eq!(engine.state(), RideState::Idle);
        assert_eq!(engine.rides_finalized(), 1);

        // Exactly one bulk replace, exactly 5 rows, no local paths
        let puts = store.puts_at("users/acct/rides/0/ride_data");
        assert_eq!(puts.len(), 1);
        let rows = puts[0].as_array().unwrap();
        assert_eq!(rows.len(), 5);
        for row in rows {
            assert!(row.get("local_image_path").is_none());
        }

        // Control node was initialized for the ride
        let control = store
            .document("users/acct/rides/0/rider_control/ride_status")
            .unwrap();
        assert_eq!(control["is_active"], true);
        assert_eq!(control["calculate_model"], false);
        assert!(control["start_timestamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_ride_ids_allocate_monotonically() {
        let store = Arc::new(MockStore::new());
        store.seed("users/acct/rides", serde_json::json!({"0": {"ride_data": [1]}, "2": {"ride_data": [1]}}));
        let (mut engine, buffer) = make_engine(store.clone());

        engine.handle_event(active()).await.unwrap();
        assert_eq!(engine.current_ride(), Some(3));
        buffer.append(make_row(1));
        engine.handle_event(inactive()).await.unwrap();

        assert_eq!(store.puts_at("users/acct/rides/3/ride_data").len(), 1);
    }

    #[tokio::test]
    async fn test_failed_replace_stays_finalizing_and_retries_same_rows() {
        let store = Arc::new(MockStore::new());
        store.fail_puts_matching("ride_data", 1);
        let (mut engine, buffer) = make_engine(store.clone());

        engine.handle_event(active()).await.unwrap();
        for ts in 0..5 {
            buffer.append(make_row(ts));
        }

        let result = engine.handle_event(inactive()).await;
        assert!(matches!(
            result,
            Err(CoreError::FinalizeIncomplete { ride_id: 0, attempts: 1 })
        ));
        assert_eq!(engine.state(), RideState::Finalizing);

        // A new activation is latched while finalizing
        engine.handle_event(active()).await.unwrap();
        assert_eq!(engine.state(), RideState::Finalizing);

        // Next poll tick retries and succeeds with the identical payload
        engine.handle_event(ControlEvent::Tick).await.unwrap();
        assert_eq!(engine.rides_finalized(), 1);

        let puts = store.puts_at("users/acct/rides/0/ride_data");
        assert_eq!(puts.len(), 1);
        let rows = puts[0].as_array().unwrap();
        assert_eq!(rows.len(), 5);
        let timestamps: Vec<i64> = rows
            .iter()
            .map(|r| r["timestamp"].as_i64().unwrap())
            .collect();
        assert_eq!(timestamps, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_image_upload_rewrites_reference() {
        let store = Arc::new(MockStore::new());
        let (mut engine, buffer) = make_engine(store.clone());

        let mut image = tempfile::NamedTempFile::new().unwrap();
        image.write_all(b"\xff\xd8jpegdata").unwrap();

        engine.handle_event(active()).await.unwrap();
        let mut row = make_row(1234);
        row.local_image_path = Some(image.path().to_path_buf());
        buffer.append(row);
        engine.handle_event(inactive()).await.unwrap();

        // Blob landed keyed by the row timestamp
        let blob_path = "users/acct/rides/0/ride_images_base64/1234";
        let blob = store.document(blob_path).unwrap();
        assert_eq!(blob["content_type"], "image/jpeg");
        assert!(blob["data_base64"].as_str().unwrap().len() > 4);

        // Row carries the remote reference, not the local path
        let rows = store.puts_at("users/acct/rides/0/ride_data");
        let row = &rows[0].as_array().unwrap()[0];
        assert_eq!(row["image_key"], blob_path);
        assert!(row.get("local_image_path").is_none());
    }

    #[tokio::test]
    async fn test_image_failure_row_still_ships() {
        let store = Arc::new(MockStore::new());
        // Exhaust the 2-attempt image budget
        store.fail_puts_matching("ride_images_base64", 2);
        let (mut engine, buffer) = make_engine(store.clone());

        let mut image = tempfile::NamedTempFile::new().unwrap();
        image.write_all(b"data").unwrap();

        engine.handle_event(active()).await.unwrap();
        let mut row = make_row(99);
        row.local_image_path = Some(image.path().to_path_buf());
        buffer.append(row);
        engine.handle_event(inactive()).await.unwrap();

        // Partial image coverage is acceptable, a lost ride record is not
        assert_eq!(engine.state(), RideState::Idle);
        let rows = store.puts_at("users/acct/rides/0/ride_data");
        assert_eq!(rows.len(), 1);
        let row = &rows[0].as_array().unwrap()[0];
        assert!(row.get("image_key").is_none());
        assert!(row.get("local_image_path").is_none());
    }

    #[tokio::test]
    async fn test_compute_event_finalizes_and_latch_restarts() {
        let store = Arc::new(MockStore::new());
        let (mut engine, buffer) = make_engine(store.clone());

        engine.handle_event(active()).await.unwrap();
        buffer.append(make_row(1));
        engine.handle_event(ControlEvent::Compute).await.unwrap();
        assert_eq!(engine.state(), RideState::Idle);
        assert_eq!(store.puts_at("users/acct/rides/0/ride_data").len(), 1);

        // is_active was never flipped off; the latched observation starts
        // the next ride on the following tick
        engine.handle_event(ControlEvent::Tick).await.unwrap();
        assert_eq!(engine.state(), RideState::Active);
        assert_eq!(engine.current_ride(), Some(1));
    }

    #[tokio::test]
    async fn test_compute_while_idle_is_ignored() {
        let store = Arc::new(MockStore::new());
        let (mut engine, _buffer) = make_engine(store.clone());

        engine.handle_event(ControlEvent::Compute).await.unwrap();
        assert_eq!(engine.state(), RideState::Idle);
        assert!(store.puts().is_empty());
    }

    #[tokio::test]
    async fn test_failed_start_retried_on_tick() {
        let store = Arc::new(MockStore::new());
        store.fail_next_gets(1);
        let (mut engine, _buffer) = make_engine(store.clone());

        // Allocation read fails; engine stays Idle
        assert!(engine.handle_event(active()).await.is_err());
        assert_eq!(engine.state(), RideState::Idle);

        // The intent is still active; the next tick retries the start
        engine.handle_event(ControlEvent::Tick).await.unwrap();
        assert_eq!(engine.state(), RideState::Active);
    }

    #[tokio::test]
    async fn test_recover_finalizes_journaled_ride() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Arc::new(RideJournal::open(dir.path()).unwrap());
        journal.append(7, &make_row(1)).unwrap();
        journal.append(7, &make_row(2)).unwrap();

        let store = Arc::new(MockStore::new());
        let buffer = Arc::new(TelemetryBuffer::with_journal(journal.clone()));
        let (mut engine, _ride_rx) = SyncEngine::new(
            store.clone(),
            EngineConfig {
                account: "acct".to_string(),
                upload: fast_upload_config(),
            },
            buffer,
            Some(journal.clone()),
        );

        engine.recover().await.unwrap();

        assert_eq!(engine.state(), RideState::Idle);
        let puts = store.puts_at("users/acct/rides/7/ride_data");
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].as_array().unwrap().len(), 2);
        assert!(journal.pending().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_migrates_account_to_ride_scoped_layout() {
        let store = Arc::new(MockStore::new());
        // The activation came through the legacy per-user node
        store.seed(
            "users/acct/rider_control/ride_status",
            serde_json::json!({"is_active": true}),
        );
        let (mut engine, buffer) = make_engine(store.clone());

        engine.handle_event(active()).await.unwrap();
        buffer.append(make_row(1));
        engine.handle_event(inactive()).await.unwrap();

        // The device created the ride-scoped node, making that layout
        // authoritative for the ride's data
        assert_eq!(store.puts_at("users/acct/rides/0/ride_data").len(), 1);
        assert!(store.puts_at("users/acct/ride_data").is_empty());
    }

    #[tokio::test]
    async fn test_legacy_layout_governs_when_migration_write_fails() {
        let store = Arc::new(MockStore::new());
        store.seed(
            "users/acct/rider_control/ride_status",
            serde_json::json!({"is_active": true}),
        );
        // The ride-scoped init write cannot land
        store.fail_patches_matching("rides/0/rider_control", 1);
        let (mut engine, buffer) = make_engine(store.clone());

        engine.handle_event(active()).await.unwrap();
        buffer.append(make_row(1));
        engine.handle_event(inactive()).await.unwrap();

        // Resolution fell back to the legacy node that commanded the start
        assert_eq!(store.puts_at("users/acct/ride_data").len(), 1);
        assert!(store.puts_at("users/acct/rides/0/ride_data").is_empty());
    }
}
