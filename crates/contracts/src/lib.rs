//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - `ClockTime` is a minute-of-day position on an analogue dial
//! - 12-hour dials wrap at 720 minutes, 24-hour dials at 1440

mod blueprint;
mod clock_time;
mod error;
mod settings;
mod sink;
mod source;
mod status;

pub use blueprint::*;
pub use clock_time::{ClockTime, MINUTES_12H, MINUTES_24H};
pub use error::*;
pub use settings::PulseSettings;
pub use sink::PulseSink;
pub use source::{LocalStatusSource, StatusSource};
pub use status::ClockStatus;
