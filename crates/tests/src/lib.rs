//! # Integration Tests
//!
//! End-to-end tests against the mock store and mock sensors.
//!
//! Covers:
//! - remote-commanded ride lifecycle (poll -> collect -> finalize)
//! - finalize retry idempotence
//! - one-shot compute trigger
//! - crash recovery from the durable journal
//! - live dispatch with warning derivation
//!
//! Activation arrives through a control node the backend can write before a
//! ride id exists (the legacy per-user node); at start the device creates
//! the ride-scoped control node, which the resolver then selects for the
//! rest of the ride.

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;

    use contracts::{
        HazardSeverity, PollerConfig, RetryPolicy, RideState, SinkConfig, SinkType, TelemetryRow,
        TelemetrySample, UploadConfig,
    };
    use remote_store::MockStore;
    use serde_json::json;
    use sync_engine::{ControlPoller, EngineConfig, RideJournal, SyncEngine, TelemetryBuffer};

    const ACCOUNT: &str = "abSdkSyZuxdmryk4jnlMqfwl49n2";

    fn legacy_control() -> String {
        format!("users/{ACCOUNT}/rider_control/ride_status")
    }

    fn scoped_control(ride: u64) -> String {
        format!("users/{ACCOUNT}/rides/{ride}/rider_control/ride_status")
    }

    fn scoped_ride_data(ride: u64) -> String {
        format!("users/{ACCOUNT}/rides/{ride}/ride_data")
    }

    fn fast_upload() -> UploadConfig {
        UploadConfig {
            replace_retry: RetryPolicy {
                max_attempts: 1,
                base_backoff_ms: 1,
                max_backoff_ms: 1,
            },
            image_retry: RetryPolicy {
                max_attempts: 1,
                base_backoff_ms: 1,
                max_backoff_ms: 1,
            },
            image_content_type: "image/jpeg".to_string(),
        }
    }

    fn make_row(timestamp: i64) -> TelemetryRow {
        TelemetryRow::from_sample(&TelemetrySample::empty(timestamp), HazardSeverity::Clear)
    }

    /// Poller and engine wired over the mock store, driven tick by tick
    struct Harness {
        poller: ControlPoller<MockStore>,
        engine: SyncEngine<MockStore>,
        buffer: Arc<TelemetryBuffer>,
    }

    fn make_harness(store: Arc<MockStore>) -> Harness {
        let buffer = Arc::new(TelemetryBuffer::new());
        let (engine, ride_rx) = SyncEngine::new(
            store.clone(),
            EngineConfig {
                account: ACCOUNT.to_string(),
                upload: fast_upload(),
            },
            buffer.clone(),
            None,
        );
        let poller = ControlPoller::new(
            store,
            ACCOUNT.to_string(),
            PollerConfig::default(),
            ride_rx,
        );
        Harness {
            poller,
            engine,
            buffer,
        }
    }

    impl Harness {
        /// One poll cycle: every emitted event goes through the engine
        async fn cycle(&mut self) {
            for event in self.poller.poll_once().await {
                let _ = self.engine.handle_event(event).await;
            }
        }
    }

    /// Full remote-commanded lifecycle:
    /// activate -> 5 rows -> deactivate -> exactly one bulk replace of 5 rows
    #[tokio::test]
    async fn test_e2e_remote_commanded_ride() {
        let store = Arc::new(MockStore::new());
        store.seed(
            &legacy_control(),
            json!({"is_active": false, "calculate_model": false}),
        );
        let mut harness = make_harness(store.clone());

        // Idle while the remote intent is inactive
        harness.cycle().await;
        assert_eq!(harness.engine.state(), RideState::Idle);

        // Backend flips the ride on through the node it can reach before a
        // ride id exists
        store.seed(
            &legacy_control(),
            json!({"is_active": true, "calculate_model": false}),
        );
        harness.cycle().await;
        assert_eq!(harness.engine.state(), RideState::Active);
        assert_eq!(harness.engine.current_ride(), Some(0));

        // The device created the ride-scoped control node and stamped it
        let control = store.document(&scoped_control(0)).unwrap();
        assert_eq!(control["is_active"], true);
        assert!(control["start_timestamp"].as_i64().unwrap() > 0);

        // An unchanged intent across polls causes no transitions
        harness.cycle().await;
        assert_eq!(harness.engine.state(), RideState::Active);

        for ts in 0..5 {
            assert!(harness.buffer.append(make_row(ts)));
        }

        // Backend flips the ride off at the now-authoritative scoped node
        store.seed(
            &scoped_control(0),
            json!({"is_active": false, "calculate_model": false}),
        );
        harness.cycle().await;

        assert_eq!(harness.engine.state(), RideState::Idle);
        assert_eq!(harness.engine.rides_finalized(), 1);

        let puts = store.puts_at(&scoped_ride_data(0));
        assert_eq!(puts.len(), 1, "exactly one bulk replace");
        let rows = puts[0].as_array().unwrap();
        assert_eq!(rows.len(), 5);
        for row in rows {
            assert!(row.get("local_image_path").is_none());
        }

        // Late sample after the stop is a harmless no-op
        assert!(!harness.buffer.append(make_row(99)));
    }

    /// A failed bulk replace keeps the ride finalizing; the retry on the
    /// next poll tick reproduces the identical 5 rows
    #[tokio::test]
    async fn test_e2e_finalize_retry_is_idempotent() {
        let store = Arc::new(MockStore::new());
        store.seed(&legacy_control(), json!({"is_active": true}));
        store.fail_puts_matching("ride_data", 1);
        let mut harness = make_harness(store.clone());

        harness.cycle().await;
        assert_eq!(harness.engine.current_ride(), Some(0));
        for ts in 10..15 {
            harness.buffer.append(make_row(ts));
        }

        store.seed(&scoped_control(0), json!({"is_active": false}));
        harness.cycle().await;
        assert_eq!(harness.engine.state(), RideState::Finalizing);

        // Next poll interval retries the replace
        harness.cycle().await;
        assert_eq!(harness.engine.state(), RideState::Idle);

        let puts = store.puts_at(&scoped_ride_data(0));
        assert_eq!(puts.len(), 1, "only the successful replace is recorded");
        let timestamps: Vec<i64> = puts[0]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["timestamp"].as_i64().unwrap())
            .collect();
        assert_eq!(timestamps, vec![10, 11, 12, 13, 14]);
    }

    /// The compute flag finalizes the active ride once and is cleared
    /// remotely; the still-active intent then starts the next ride
    #[tokio::test]
    async fn test_e2e_compute_trigger() {
        let store = Arc::new(MockStore::new());
        store.seed(
            &legacy_control(),
            json!({"is_active": true, "calculate_model": false}),
        );
        let mut harness = make_harness(store.clone());

        harness.cycle().await;
        assert_eq!(harness.engine.current_ride(), Some(0));
        harness.buffer.append(make_row(1));

        // Backend asserts the one-shot trigger on the scoped node
        store.seed(
            &scoped_control(0),
            json!({"is_active": true, "calculate_model": true}),
        );
        harness.cycle().await;

        // The ride was finalized and the flag cleared on the resolved node
        assert_eq!(store.puts_at(&scoped_ride_data(0)).len(), 1);
        let control = store.document(&scoped_control(0)).unwrap();
        assert_eq!(control["calculate_model"], false);

        // is_active stayed true on the legacy node: the latched observation
        // starts ride 1, allocated past the ride the device just created
        harness.cycle().await;
        assert_eq!(harness.engine.state(), RideState::Active);
        assert_eq!(harness.engine.current_ride(), Some(1));

        // The trigger does not re-fire for the new ride
        harness.cycle().await;
        assert_eq!(store.puts_at(&scoped_ride_data(0)).len(), 1);
        assert!(store.puts_at(&scoped_ride_data(1)).is_empty());
        assert_eq!(harness.engine.state(), RideState::Active);
    }

    /// Rows journaled before a crash are finalized by the next process
    #[tokio::test]
    async fn test_e2e_crash_recovery() {
        let dir = tempfile::tempdir().unwrap();

        // First process: collect rows, crash before finalize
        {
            let journal = Arc::new(RideJournal::open(dir.path()).unwrap());
            let buffer = TelemetryBuffer::with_journal(journal);
            buffer.begin(3);
            for ts in 0..4 {
                buffer.append(make_row(ts));
            }
            // process dies here
        }

        // Second process: recovery finalizes the journaled ride; with no
        // control node on any layout, the ride-scoped templates apply
        let store = Arc::new(MockStore::new());
        let journal = Arc::new(RideJournal::open(dir.path()).unwrap());
        let buffer = Arc::new(TelemetryBuffer::with_journal(journal.clone()));
        let (mut engine, _ride_rx) = SyncEngine::new(
            store.clone(),
            EngineConfig {
                account: ACCOUNT.to_string(),
                upload: fast_upload(),
            },
            buffer,
            Some(journal.clone()),
        );

        engine.recover().await.unwrap();

        let puts = store.puts_at(&format!("users/{ACCOUNT}/rides/3/ride_data"));
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].as_array().unwrap().len(), 4);
        assert!(journal.pending().unwrap().is_empty());
        assert_eq!(engine.state(), RideState::Idle);
    }

    /// Sampled speeding rows reach the live feed with a warning record
    #[tokio::test]
    async fn test_e2e_live_dispatch_with_warning() {
        use contracts::TelemetryUpdate;
        use dispatcher::create_dispatcher;
        use ingestion::{
            FixedSpeedLimit, MockFrameSource, MockMotionSource, MockPositionSource, Sampler,
        };
        use observability::RideStatsAggregator;
        use tokio::sync::mpsc;

        let store = Arc::new(MockStore::new());
        let mut stats = RideStatsAggregator::new();

        // Live sink through the dispatcher
        let (updates_tx, updates_rx) = mpsc::channel::<TelemetryUpdate>(64);
        let sink_configs = vec![SinkConfig {
            name: "live".to_string(),
            sink_type: SinkType::Live,
            queue_capacity: 64,
            params: Default::default(),
        }];
        let dispatcher = create_dispatcher(
            sink_configs,
            ACCOUNT.to_string(),
            store.clone(),
            updates_rx,
        )
        .unwrap();
        let dispatcher_handle = dispatcher.spawn();

        // Sampler with a rider doing 55 in a 40 zone
        let sampler = Sampler::new(contracts::SamplerConfig {
            rate_hz: 200.0,
            speed_limit_refresh_s: 0.0,
        });
        let (samples_rx, sampler_handle) = sampler.start(
            MockMotionSource::steady(),
            MockPositionSource::fixed(17.385, 78.486, 55.0),
            MockFrameSource::none(),
            FixedSpeedLimit(Some(40.0)),
            64,
        );

        for _ in 0..5 {
            let sample = samples_rx.recv().await.unwrap();
            stats.record_row();
            let row = TelemetryRow::from_sample(&sample, HazardSeverity::Clear);
            let warning = hazard::speed_warning(row.speed, row.speed_limit, row.timestamp);
            assert!(warning.is_some(), "55 km/h in a 40 zone must warn");
            stats.record_warning("speed_limit");
            updates_tx
                .send(TelemetryUpdate { row, warning })
                .await
                .unwrap();
        }

        sampler_handle.join().await;
        drop(updates_tx);
        dispatcher_handle.await.unwrap();

        // The rider_data node carries speed, limit, and a warning record
        let doc = store
            .document(&format!("users/{ACCOUNT}/rider_data"))
            .unwrap();
        assert_eq!(doc["current_speed"], 55.0);
        assert_eq!(doc["speed_limit"], 40.0);
        let warnings = doc["active_warnings_list"].as_object().unwrap();
        assert!(!warnings.is_empty());
        let (key, record) = warnings.iter().next().unwrap();
        assert!(key.starts_with("warning_"));
        assert_eq!(record["type"], "speed_limit");
        assert_eq!(record["message"], "Speed Limit Exceeded!");

        let summary = stats.summary();
        assert_eq!(summary.rows_sampled, 5);
        assert_eq!(summary.warning_counts.get("speed_limit"), Some(&5));
    }

    /// A production-shaped blueprint loads through the config stack
    #[tokio::test]
    async fn test_e2e_blueprint_loads() {
        let toml = format!(
            r#"
[device]
account_id = "{ACCOUNT}"
spool_dir = "/var/lib/ride-syncer/spool"

[store]
base_url = "https://wheeler-rtdb.example.app"
timeout_s = 5.0

[poller]
interval_s = 2.0

[sampler]
rate_hz = 30.0
speed_limit_refresh_s = 1.0

[detector]
model_id = "potholes-and-speed-bumps-detection/1"

[[sinks]]
name = "live"
sink_type = "live"

[[sinks]]
name = "csv"
sink_type = "csv"
[sinks.params]
path = "/tmp/ride.csv"
"#
        );

        let blueprint =
            config_loader::ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml)
                .unwrap();
        assert_eq!(blueprint.device.account_id, ACCOUNT);
        assert_eq!(blueprint.sinks.len(), 2);
        assert_eq!(blueprint.upload.replace_retry.max_attempts, 5);
    }
}
