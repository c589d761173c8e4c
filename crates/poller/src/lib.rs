//! # Poller
//!
//! The polling loop that drives the pulse engine.
//!
//! Responsibilities:
//! - Drift-corrected fixed-period polling of the status source
//! - Flat retry delay after a failed poll, retrying indefinitely
//! - Cooperative shutdown that never interrupts an in-flight pulse

mod poller;
mod stats;

pub use poller::Poller;
pub use stats::PollerStats;

pub use contracts::StatusSource;
pub use pulse_engine::PulseEngine;
