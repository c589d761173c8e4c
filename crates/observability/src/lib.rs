//! # Observability
//!
//! Prometheus metrics export and metric recording helpers.
//!
//! Tracing initialization lives in the CLI (the binary owns the subscriber);
//! this crate only installs the metrics recorder and names the metrics.

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;

pub use crate::metrics::{
    record_fast_forward, record_modeled_time, record_poll_failure, record_poll_success,
    record_step,
};

/// Install the Prometheus exporter on the given port.
///
/// Call once at startup; the recorder is process-global.
pub fn init_metrics_only(port: u16) -> Result<()> {
    let builder = PrometheusBuilder::new();
    builder
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}
