//! ClockTime - minute-of-day position arithmetic
//!
//! All engine decisions (single step vs. catch-up, pulse polarity) are made
//! in terms of this type, so the wraparound rules live here and nowhere else.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ContractError;

/// Modulus of a 12-hour analogue dial, in minutes.
pub const MINUTES_12H: u16 = 720;
/// Modulus of a 24-hour analogue dial, in minutes.
pub const MINUTES_24H: u16 = 1440;

/// A time-of-day position at minute granularity.
///
/// Internally a minute count, always `< 1440`. Seconds are truncated on
/// parse: a slave clock mechanism only steps whole minutes.
///
/// # Examples
/// ```
/// use contracts::{ClockTime, MINUTES_24H};
///
/// let t: ClockTime = "23:59".parse().unwrap();
/// assert_eq!(t.succ(MINUTES_24H).to_string(), "00:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    /// Create from an hour and minute component.
    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, ContractError> {
        if hour >= 24 || minute >= 60 {
            return Err(ContractError::Other(format!(
                "invalid time {hour:02}:{minute:02}"
            )));
        }
        Ok(Self {
            minutes: u16::from(hour) * 60 + u16::from(minute),
        })
    }

    /// Create from a raw minute count, wrapping at the 24-hour boundary.
    pub fn from_minutes(minutes: u16) -> Self {
        Self {
            minutes: minutes % MINUTES_24H,
        }
    }

    /// Minute count since midnight (or since 12:00 once normalized).
    pub fn as_minutes(&self) -> u16 {
        self.minutes
    }

    /// Hour-of-day component.
    pub fn hour(&self) -> u16 {
        self.minutes / 60
    }

    /// Minute-of-hour component. Its parity selects the pulse polarity.
    pub fn minute(&self) -> u16 {
        self.minutes % 60
    }

    /// Wrap this position to the dial modulus (720 or 1440 minutes).
    pub fn normalize(&self, modulus: u16) -> Self {
        Self {
            minutes: self.minutes % modulus,
        }
    }

    /// The position one minute ahead, with wraparound at the modulus.
    pub fn succ(&self, modulus: u16) -> Self {
        Self {
            minutes: (self.minutes + 1) % modulus,
        }
    }

    /// True when adding one minute to `self` (with wraparound) yields `target`.
    ///
    /// This is the steady-state test: one authoritative minute elapsed since
    /// the previous poll, so a single step closes the gap.
    pub fn is_one_minute_before(&self, target: Self, modulus: u16) -> bool {
        self.succ(modulus) == target
    }

    /// Forward minute distance from `self` to `target` under the modulus.
    ///
    /// A target behind the current position is still reached by stepping
    /// forward across the wraparound; the mechanism cannot step backwards.
    pub fn forward_distance(&self, target: Self, modulus: u16) -> u16 {
        let from = self.minutes % modulus;
        let to = target.minutes % modulus;
        (to + modulus - from) % modulus
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .map_err(|e| ContractError::Other(format!("invalid time '{s}': {e}")))?;
        Ok(Self {
            minutes: (parsed.hour() * 60 + parsed.minute()) as u16,
        })
    }
}

impl Serialize for ClockTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
