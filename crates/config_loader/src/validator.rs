//! Configuration validation
//!
//! Rules:
//! - all intervals > 0
//! - pulse duration fits inside one fast-forward tick
//! - remote_clock_time_href present
//! - sink names unique and non-empty
//! - per-type required sink params present

use std::collections::HashSet;

use contracts::{ContractError, ServiceBlueprint, SinkConfig, SinkType};

/// Validate a ServiceBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    validate_intervals(blueprint)?;
    validate_source(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_intervals(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    let pulse = &blueprint.pulse;

    for (field, value) in [
        ("pulse.poll_interval_seconds", pulse.poll_interval_seconds),
        (
            "pulse.fast_forward_interval_milliseconds",
            pulse.fast_forward_interval_milliseconds,
        ),
        (
            "pulse.pulse_duration_milliseconds",
            pulse.pulse_duration_milliseconds,
        ),
        (
            "pulse.error_wait_retry_milliseconds",
            pulse.error_wait_retry_milliseconds,
        ),
    ] {
        if value == 0 {
            return Err(ContractError::config_validation(field, "must be > 0"));
        }
    }

    // A catch-up tick must leave room for the zero phase after the pulse hold.
    if pulse.pulse_duration_milliseconds >= pulse.fast_forward_interval_milliseconds {
        return Err(ContractError::config_validation(
            "pulse.pulse_duration_milliseconds",
            format!(
                "pulse duration ({}) must be shorter than the fast forward interval ({})",
                pulse.pulse_duration_milliseconds, pulse.fast_forward_interval_milliseconds
            ),
        ));
    }

    Ok(())
}

fn validate_source(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    if blueprint.pulse.remote_clock_time_href.is_empty() {
        return Err(ContractError::config_validation(
            "pulse.remote_clock_time_href",
            "remote clock locator is required",
        ));
    }
    Ok(())
}

fn validate_sinks(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        validate_sink_params(sink)?;
    }
    Ok(())
}

fn validate_sink_params(sink: &SinkConfig) -> Result<(), ContractError> {
    let required: &[&str] = match sink.sink_type {
        SinkType::Udp => &["addr"],
        SinkType::Serial => &["port"],
        SinkType::Log | SinkType::Simulator => &[],
    };
    for param in required {
        if !sink.params.contains_key(*param) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}].params.{param}", sink.name),
                "required parameter missing",
            ));
        }
    }
    Ok(())
}
