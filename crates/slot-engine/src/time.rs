//! Conversions between `HH:MM` text and minute-of-day on a circular 24-hour day.
//!
//! Every value is normalized modulo [`MINUTES_PER_DAY`], so arithmetic that
//! crosses midnight lands back inside `0..=1439`.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseTimeError;

/// Minutes in one day.
pub const MINUTES_PER_DAY: i32 = 1440;

/// A minute of the day, always in `0..=1439`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const LAST_MINUTE: TimeOfDay = TimeOfDay(1439);

    /// Build from any integer minute count, wrapping it onto the circular day.
    pub fn from_minutes(minutes: i32) -> Self {
        TimeOfDay(minutes.rem_euclid(MINUTES_PER_DAY) as u16)
    }

    /// Build from hour and minute, or `None` when either is out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(TimeOfDay((hour * 60 + minute) as u16))
        } else {
            None
        }
    }

    /// Parse strictly `HH:MM` (two digits, colon, two digits).
    ///
    /// Returns `None` for anything else; callers drop such slots silently.
    pub fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return None;
        }
        let digit = |i: usize| -> Option<u32> {
            let b = bytes[i];
            b.is_ascii_digit().then(|| u32::from(b - b'0'))
        };
        let hour = digit(0)? * 10 + digit(1)?;
        let minute = digit(3)? * 10 + digit(4)?;
        Self::from_hm(hour, minute)
    }

    /// The minute-of-day of a local wall-clock instant (seconds truncated).
    pub fn of(instant: NaiveDateTime) -> Self {
        TimeOfDay((instant.hour() * 60 + instant.minute()) as u16)
    }

    pub fn minutes(self) -> i32 {
        i32::from(self.0)
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0 / 60)
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0 % 60)
    }

    /// Shift by a signed number of minutes, wrapping across midnight.
    pub fn add_minutes(self, delta: i32) -> Self {
        Self::from_minutes(self.minutes() + delta)
    }
}

/// Format any minute count as `HH:MM` after circular normalization.
pub fn format_minutes(minutes: i32) -> String {
    TimeOfDay::from_minutes(minutes).to_string()
}

/// Minutes elapsed going backwards from `now` to the most recent occurrence of `t`.
///
/// Zero when `t == now`; a slot at 23:58 is 5 minutes behind 00:03.
pub fn minutes_since(now: TimeOfDay, t: TimeOfDay) -> i32 {
    (now.minutes() - t.minutes()).rem_euclid(MINUTES_PER_DAY)
}

/// Minutes going forwards from `now` to the next occurrence of `t`.
pub fn minutes_until(now: TimeOfDay, t: TimeOfDay) -> i32 {
    (t.minutes() - now.minutes()).rem_euclid(MINUTES_PER_DAY)
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseTimeError(s.to_string()))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
