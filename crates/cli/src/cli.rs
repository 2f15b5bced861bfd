//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Ride Syncer - edge telemetry recorder with remote ride control
#[derive(Parser, Debug)]
#[command(
    name = "ride-syncer",
    author,
    version,
    about = "Vehicle telemetry recorder synchronized with a remote control plane",
    long_about = "Samples motion/position sensors and a forward camera, buffers rows \n\
                  locally, and follows remote ride start/stop/finalize commands.\n\n\
                  On finalize, buffered rows and linked images are reconciled with \n\
                  the remote store exactly once."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "RIDE_SYNCER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "RIDE_SYNCER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the telemetry pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "device.toml",
        env = "RIDE_SYNCER_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the account id from configuration
    #[arg(long, env = "RIDE_SYNCER_ACCOUNT")]
    pub account: Option<String>,

    /// Override the remote store base URL from configuration
    #[arg(long, env = "RIDE_SYNCER_STORE_URL")]
    pub store_url: Option<String>,

    /// Maximum number of rows to sample (0 = unlimited)
    #[arg(long, default_value = "0", env = "RIDE_SYNCER_MAX_ROWS")]
    pub max_rows: u64,

    /// Pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "RIDE_SYNCER_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Channel buffer size for internal queues
    #[arg(long, default_value = "100", env = "RIDE_SYNCER_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "RIDE_SYNCER_METRICS_PORT")]
    pub metrics_port: u16,

    /// Replay a recorded CSV stream instead of sampling mock sensors
    #[arg(long, env = "RIDE_SYNCER_REPLAY")]
    pub replay: Option<PathBuf>,

    /// Replay speed multiplier (1.0 = original speed)
    #[arg(long, default_value = "1.0", env = "RIDE_SYNCER_REPLAY_SPEED")]
    pub replay_speed: f64,

    /// Loop replay when finished
    #[arg(long)]
    pub replay_loop: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "device.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "device.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
