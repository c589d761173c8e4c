//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::ClockTime;
use std::path::PathBuf;

/// Clock Pulse - analogue slave clock synchronization service
#[derive(Parser, Debug)]
#[command(
    name = "clock-pulse",
    author,
    version,
    about = "Analogue slave clock synchronization service",
    long_about = "Keeps analogue slave clocks aligned with an authoritative time source.\n\n\
                  Polls a remote clock service over HTTP, models the position of the \n\
                  analogue movement, and drives the configured pulse sinks with \n\
                  polarity-alternating step pulses."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "CLOCK_PULSE_VERBOSE")]
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
        env = "CLOCK_PULSE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the synchronization service
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
    #[arg(short, long, default_value = "config.toml", env = "CLOCK_PULSE_CONFIG")]
    pub config: PathBuf,

    /// Override the remote clock status URL from configuration
    #[arg(long, env = "CLOCK_PULSE_HREF")]
    pub href: Option<String>,

    /// Reset the modeled position to the configured start time
    #[arg(short = 'r', long)]
    pub reset: bool,

    /// Assume the slave clocks show this position at startup (HH:MM, implies --reset)
    #[arg(short = 't', long, value_name = "HH:MM", env = "CLOCK_PULSE_START_TIME")]
    pub start_time: Option<ClockTime>,

    /// Validate configuration and exit without running the service
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "CLOCK_PULSE_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sink parameters
    #[arg(long)]
    pub params: bool,
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
