//! Metric recording helpers
//!
//! All metric names live here so dashboards have a single place to check.

use metrics::{counter, gauge, histogram};

/// Record a successful poll of the remote clock service.
pub fn record_poll_success() {
    counter!("clock_pulse_polls_total").increment(1);
}

/// Record a failed poll (transport, response, or decode failure).
pub fn record_poll_failure() {
    counter!("clock_pulse_polls_total").increment(1);
    counter!("clock_pulse_poll_failures_total").increment(1);
}

/// Record one completed electromechanical step.
pub fn record_step() {
    counter!("clock_pulse_steps_total").increment(1);
}

/// Record the modeled analogue position after a step, in minutes.
pub fn record_modeled_time(minutes: u16) {
    gauge!("clock_pulse_modeled_time_minutes").set(f64::from(minutes));
}

/// Record a completed catch-up run and its length in steps.
pub fn record_fast_forward(steps: u16) {
    counter!("clock_pulse_fast_forward_runs_total").increment(1);
    histogram!("clock_pulse_fast_forward_steps").record(f64::from(steps));
}
