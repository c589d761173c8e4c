//! PulseSettings - immutable engine and polling parameters

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ClockTime, MINUTES_12H, MINUTES_24H};

/// Engine and polling parameters, read-only after configuration load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseSettings {
    /// Drive a 12-hour dial (wrap at 12:00) instead of a 24-hour one.
    #[serde(default)]
    pub use_12_hour_clock: bool,

    /// Analogue position the slave clocks are assumed to show at startup.
    #[serde(default = "default_start_time")]
    pub analogue_clock_start_time: ClockTime,

    /// Poll cadence against the remote clock service.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Tick interval of the catch-up sub-loop. Must exceed the pulse
    /// duration so one full step fits inside each tick.
    #[serde(default = "default_fast_forward_interval")]
    pub fast_forward_interval_milliseconds: u64,

    /// Hold time between the polarity phase and the zero phase of a step.
    #[serde(default = "default_pulse_duration")]
    pub pulse_duration_milliseconds: u64,

    /// Flat delay before retrying after a failed poll.
    #[serde(default = "default_error_wait")]
    pub error_wait_retry_milliseconds: u64,

    /// Locator of the remote clock status resource.
    #[serde(default)]
    pub remote_clock_time_href: String,
}

fn default_start_time() -> ClockTime {
    ClockTime::from_minutes(6 * 60)
}

fn default_poll_interval() -> u64 {
    10
}

fn default_fast_forward_interval() -> u64 {
    500
}

fn default_pulse_duration() -> u64 {
    200
}

fn default_error_wait() -> u64 {
    5000
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self {
            use_12_hour_clock: false,
            analogue_clock_start_time: default_start_time(),
            poll_interval_seconds: default_poll_interval(),
            fast_forward_interval_milliseconds: default_fast_forward_interval(),
            pulse_duration_milliseconds: default_pulse_duration(),
            error_wait_retry_milliseconds: default_error_wait(),
            remote_clock_time_href: String::new(),
        }
    }
}

impl PulseSettings {
    /// Dial modulus in minutes (720 for 12-hour dials, 1440 otherwise).
    pub fn modulus(&self) -> u16 {
        if self.use_12_hour_clock {
            MINUTES_12H
        } else {
            MINUTES_24H
        }
    }
}

impl fmt::Display for PulseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "href={} poll={}s fast_forward={}ms pulse={}ms retry={}ms dial={}h start={}",
            self.remote_clock_time_href,
            self.poll_interval_seconds,
            self.fast_forward_interval_milliseconds,
            self.pulse_duration_milliseconds,
            self.error_wait_retry_milliseconds,
            if self.use_12_hour_clock { 12 } else { 24 },
            self.analogue_clock_start_time,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = PulseSettings::default();
        assert_eq!(settings.poll_interval_seconds, 10);
        assert_eq!(settings.modulus(), MINUTES_24H);
        assert_eq!(settings.analogue_clock_start_time.to_string(), "06:00");
    }

    #[test]
    fn test_modulus_12h() {
        let settings = PulseSettings {
            use_12_hour_clock: true,
            ..Default::default()
        };
        assert_eq!(settings.modulus(), MINUTES_12H);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let settings: PulseSettings = serde_json::from_str(
            r#"{ "remote_clock_time_href": "http://host/api/clock", "poll_interval_seconds": 2 }"#,
        )
        .unwrap();
        assert_eq!(settings.poll_interval_seconds, 2);
        assert_eq!(settings.pulse_duration_milliseconds, 200);
    }
}
