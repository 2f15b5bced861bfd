//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::InfoArgs;

/// Structured info output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    device: DeviceInfo,
    store: StoreInfo,
    timing: TimingInfo,
    detector: DetectorInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    sinks: Option<Vec<SinkInfo>>,
}

#[derive(Serialize)]
struct DeviceInfo {
    account: String,
    spool_dir: String,
}

#[derive(Serialize)]
struct StoreInfo {
    base_url: String,
    timeout_s: f64,
    api_key_env: String,
    token_env: Option<String>,
}

#[derive(Serialize)]
struct TimingInfo {
    poll_interval_s: f64,
    sample_rate_hz: f64,
    speed_limit_refresh_s: f64,
}

#[derive(Serialize)]
struct DetectorInfo {
    model_id: String,
    command: Option<String>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = ConfigInfo {
        version: format!("{:?}", blueprint.version),
        device: DeviceInfo {
            account: blueprint.device.account_id.clone(),
            spool_dir: blueprint.device.spool_dir.display().to_string(),
        },
        store: StoreInfo {
            base_url: blueprint.store.base_url.clone(),
            timeout_s: blueprint.store.timeout_s,
            api_key_env: blueprint.store.auth.api_key_env.clone(),
            token_env: blueprint.store.auth.token_env.clone(),
        },
        timing: TimingInfo {
            poll_interval_s: blueprint.poller.interval_s,
            sample_rate_hz: blueprint.sampler.rate_hz,
            speed_limit_refresh_s: blueprint.sampler.speed_limit_refresh_s,
        },
        detector: DetectorInfo {
            model_id: blueprint.detector.model_id.clone(),
            command: blueprint
                .detector
                .command
                .as_ref()
                .map(|c| c.display().to_string()),
        },
        sinks: if args.sinks {
            Some(
                blueprint
                    .sinks
                    .iter()
                    .map(|sink| SinkInfo {
                        name: sink.name.clone(),
                        sink_type: format!("{:?}", sink.sink_type),
                        queue_capacity: sink.queue_capacity,
                    })
                    .collect(),
            )
        } else {
            None
        },
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?
        );
    } else {
        print_info(&info);
    }

    Ok(())
}

fn print_info(info: &ConfigInfo) {
    println!("Configuration ({})", info.version);
    println!("\nDevice:");
    println!("  Account: {}", info.device.account);
    println!("  Spool dir: {}", info.device.spool_dir);

    println!("\nStore:");
    println!("  Base URL: {}", info.store.base_url);
    println!("  Timeout: {}s", info.store.timeout_s);
    println!("  API key env: {}", info.store.api_key_env);
    if let Some(ref token_env) = info.store.token_env {
        println!("  Token env: {}", token_env);
    }

    println!("\nTiming:");
    println!("  Poll interval: {}s", info.timing.poll_interval_s);
    println!("  Sample rate: {} Hz", info.timing.sample_rate_hz);
    println!(
        "  Speed-limit refresh: {}s",
        info.timing.speed_limit_refresh_s
    );

    println!("\nDetector:");
    println!("  Model: {}", info.detector.model_id);
    match &info.detector.command {
        Some(command) => println!("  Command: {}", command),
        None => println!("  Command: (disabled)"),
    }

    if let Some(ref sinks) = info.sinks {
        println!("\nSinks ({}):", sinks.len());
        for sink in sinks {
            println!(
                "  - {} ({}, queue {})",
                sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }

    println!();
}
