//! ClockStatus - authoritative time report
//!
//! One report is fetched per poll from the remote clock service. The three
//! flags mark reports that carry no actionable analogue position.

use serde::{Deserialize, Serialize};

use crate::ClockTime;

/// Authoritative time report from the remote clock service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClockStatus {
    /// Authoritative time-of-day, absent when the service reports none.
    #[serde(default)]
    pub time: Option<ClockTime>,

    /// Service is up but the game clock is not available.
    #[serde(default)]
    pub is_unavailable: bool,

    /// The clock runs at wall-clock speed; slave dials follow real time on
    /// their own and must not be driven.
    #[serde(default)]
    pub is_realtime: bool,

    /// The game clock is paused.
    #[serde(default)]
    pub is_paused: bool,
}

impl ClockStatus {
    /// The position the engine should track, or `None` when the report must
    /// be ignored (unavailable, realtime, paused, or no time at all).
    pub fn actionable_time(&self) -> Option<ClockTime> {
        if self.is_unavailable || self.is_realtime || self.is_paused {
            return None;
        }
        self.time
    }

    /// A plain running report at the given time.
    pub fn running_at(time: ClockTime) -> Self {
        Self {
            time: Some(time),
            ..Self::default()
        }
    }
}
