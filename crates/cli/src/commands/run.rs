//! `run` command implementation.

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use poller::Poller;
use pulse_engine::PulseEngine;
use status_client::HttpStatusSource;

/// Execute the `run` command
pub async fn run_service(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref href) = args.href {
        info!(href = %href, "Overriding remote clock URL from CLI");
        blueprint.pulse.remote_clock_time_href = href.clone();
    }
    if let Some(start_time) = args.start_time {
        info!(start_time = %start_time, "Overriding modeled start position from CLI");
        blueprint.pulse.analogue_clock_start_time = start_time;
    } else if args.reset {
        info!(
            start_time = %blueprint.pulse.analogue_clock_start_time,
            "Resetting modeled position to configured start time"
        );
    }

    info!(
        href = %blueprint.pulse.remote_clock_time_href,
        poll_interval_s = blueprint.pulse.poll_interval_seconds,
        dial_modulus = blueprint.pulse.modulus(),
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Metrics exporter
    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)
            .context("Failed to initialize metrics")?;
    }

    // Build sinks, engine, source, poller
    let sink_set = sinks::create_sinks(&blueprint.sinks, &blueprint.pulse)
        .context("Failed to build sink set")?;
    let engine = PulseEngine::new(blueprint.pulse.clone(), sink_set);
    let source = HttpStatusSource::new(&blueprint.pulse.remote_clock_time_href)
        .context("Failed to build status client")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = Poller::new(source, engine, &blueprint.pulse, shutdown_rx);

    info!("Starting service...");
    let handle = tokio::spawn(poller.run());

    // Graceful shutdown: signal the poller, then wait for it to finish the
    // in-flight pulse and tear the sinks down.
    wait_for_shutdown_signal().await;
    warn!("Received shutdown signal, stopping service...");
    let _ = shutdown_tx.send(true);

    let stats = handle
        .await
        .map_err(|e| CliError::service_execution(e.to_string()))?;

    info!(
        polls = stats.polls,
        failures = stats.failures,
        steps = stats.steps,
        final_time = %stats.final_time,
        duration_secs = stats.duration.as_secs_f64(),
        "Service stopped"
    );
    stats.print_summary();

    info!("Clock Pulse finished");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn wait_for_shutdown_signal() {
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
fn print_config_summary(blueprint: &contracts::ServiceBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Pulse:");
    println!("  Source: {}", blueprint.pulse.remote_clock_time_href);
    println!(
        "  Dial: {}-hour, starting at {}",
        if blueprint.pulse.use_12_hour_clock {
            12
        } else {
            24
        },
        blueprint.pulse.analogue_clock_start_time
    );
    println!(
        "  Timing: poll {}s, fast-forward {}ms, pulse {}ms, retry {}ms",
        blueprint.pulse.poll_interval_seconds,
        blueprint.pulse.fast_forward_interval_milliseconds,
        blueprint.pulse.pulse_duration_milliseconds,
        blueprint.pulse.error_wait_retry_milliseconds
    );

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
