//! # Pulse Engine
//!
//! The pulse synchronization state machine.
//!
//! Responsibilities:
//! - Interpret authoritative `ClockStatus` reports
//! - Decide between a single advancing step and a catch-up run
//! - Fan polarity-encoded pulses out to every installed sink, in order
//!
//! ## Usage
//!
//! ```ignore
//! use pulse_engine::PulseEngine;
//!
//! let mut engine = PulseEngine::new(settings, sinks);
//! // On each poll:
//! engine.update(&status).await?;
//! // On shutdown:
//! engine.shutdown().await?;
//! ```

mod engine;

pub use engine::{EngineState, PulseEngine};

pub use contracts::{ClockStatus, ClockTime, PulseSettings, PulseSink};
