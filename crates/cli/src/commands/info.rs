//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    pulse: PulseInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct PulseInfo {
    href: String,
    start_time: String,
    dial_hours: u16,
    poll_interval_seconds: u64,
    fast_forward_interval_milliseconds: u64,
    pulse_duration_milliseconds: u64,
    error_wait_retry_milliseconds: u64,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::ServiceBlueprint, args: &InfoArgs) -> ConfigInfo {
    let pulse = PulseInfo {
        href: blueprint.pulse.remote_clock_time_href.clone(),
        start_time: blueprint.pulse.analogue_clock_start_time.to_string(),
        dial_hours: if blueprint.pulse.use_12_hour_clock {
            12
        } else {
            24
        },
        poll_interval_seconds: blueprint.pulse.poll_interval_seconds,
        fast_forward_interval_milliseconds: blueprint.pulse.fast_forward_interval_milliseconds,
        pulse_duration_milliseconds: blueprint.pulse.pulse_duration_milliseconds,
        error_wait_retry_milliseconds: blueprint.pulse.error_wait_retry_milliseconds,
    };

    let sinks = blueprint
        .sinks
        .iter()
        .map(|s| SinkInfo {
            name: s.name.clone(),
            sink_type: format!("{:?}", s.sink_type),
            params: if args.params {
                s.params.clone()
            } else {
                Default::default()
            },
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        pulse,
        sinks,
    }
}

fn print_config_info(blueprint: &contracts::ServiceBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                Clock Pulse Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Pulse settings
    println!("⏱  Pulse");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Source: {}", blueprint.pulse.remote_clock_time_href);
    println!(
        "   ├─ Dial: {}-hour, start at {}",
        if blueprint.pulse.use_12_hour_clock {
            12
        } else {
            24
        },
        blueprint.pulse.analogue_clock_start_time
    );
    println!(
        "   ├─ Poll: every {}s (retry after {}ms on failure)",
        blueprint.pulse.poll_interval_seconds, blueprint.pulse.error_wait_retry_milliseconds
    );
    println!(
        "   └─ Step: {}ms pulse, {}ms catch-up tick",
        blueprint.pulse.pulse_duration_milliseconds,
        blueprint.pulse.fast_forward_interval_milliseconds
    );

    // Sinks
    if blueprint.sinks.is_empty() {
        println!("\n📤 Sinks: none configured");
    } else {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);

            if args.params && !sink.params.is_empty() {
                let child_prefix = if is_last { "   " } else { "│  " };
                let mut params: Vec<_> = sink.params.iter().collect();
                params.sort();
                for (j, (key, value)) in params.iter().enumerate() {
                    let param_is_last = j == params.len() - 1;
                    let param_prefix = if param_is_last { "└─" } else { "├─" };
                    println!("   {}  {} {} = {}", child_prefix, param_prefix, key, value);
                }
            }
        }
    }

    println!();
}
