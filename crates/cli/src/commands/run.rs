//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref account) = args.account {
        info!(account = %account, "Overriding account from CLI");
        blueprint.device.account_id = account.clone();
    }
    if let Some(ref url) = args.store_url {
        info!(url = %url, "Overriding store URL from CLI");
        blueprint.store.base_url = url.clone();
    }

    info!(
        account = %blueprint.device.account_id,
        store = %blueprint.store.base_url,
        poll_interval_s = blueprint.poller.interval_s,
        rate_hz = blueprint.sampler.rate_hz,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        max_rows: if args.max_rows == 0 {
            None
        } else {
            Some(args.max_rows)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        buffer_size: args.buffer_size,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
        replay_path: args.replay.clone(),
        replay_speed: args.replay_speed,
        replay_loop: args.replay_loop,
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        rows_sampled = stats.rows_sampled,
                        rides_finalized = stats.rides_finalized,
                        duration_secs = stats.duration.as_secs_f64(),
                        rate = format!("{:.2}", stats.rows_per_second()),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("Ride Syncer finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::DeviceBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Device:");
    println!("  Account: {}", blueprint.device.account_id);
    println!("  Spool dir: {}", blueprint.device.spool_dir.display());
    println!("\nStore:");
    println!("  Base URL: {}", blueprint.store.base_url);
    println!("  Timeout: {}s", blueprint.store.timeout_s);
    println!("\nTiming:");
    println!("  Poll interval: {}s", blueprint.poller.interval_s);
    println!("  Sample rate: {} Hz", blueprint.sampler.rate_hz);
    println!(
        "  Speed-limit refresh: {}s",
        blueprint.sampler.speed_limit_refresh_s
    );

    println!("\nDetector:");
    println!("  Model: {}", blueprint.detector.model_id);
    match &blueprint.detector.command {
        Some(command) => println!("  Command: {}", command.display()),
        None => println!("  Command: (disabled)"),
    }

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
