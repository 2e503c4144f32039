//! Time-of-day dependent minimum spacing between publication slots.
//!
//! The day is split into three half-open bands, `[00:00, 13:00)`,
//! `[13:00, 17:00)` and `[17:00, 24:00)`, each with its own required spacing.
//! An unset band falls back to the legacy single value, then to
//! [`DEFAULT_INTERVAL_MINUTES`]. Results are always clamped to
//! [`MIN_INTERVAL_MINUTES`]..=[`MAX_INTERVAL_MINUTES`].

use serde::{Deserialize, Serialize};

use crate::time::TimeOfDay;

/// Spacing used when neither the band nor the legacy value is configured.
pub const DEFAULT_INTERVAL_MINUTES: i32 = 11;
pub const MIN_INTERVAL_MINUTES: i32 = 1;
pub const MAX_INTERVAL_MINUTES: i32 = 60;

const BAND_13_START: i32 = 13 * 60;
const BAND_17_START: i32 = 17 * 60;

/// One of the three spacing bands of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    /// 00:00 up to (not including) 13:00.
    Night,
    /// 13:00 up to 17:00.
    Afternoon,
    /// 17:00 up to midnight.
    Evening,
}

impl Band {
    pub fn of(time: TimeOfDay) -> Self {
        match time.minutes() {
            m if m < BAND_13_START => Band::Night,
            m if m < BAND_17_START => Band::Afternoon,
            _ => Band::Evening,
        }
    }
}

/// Spacing policy and automation flags, as stored by the settings collaborator.
///
/// Shared read-only between callers; nothing in the engine mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalSettings {
    #[serde(rename = "minInterval_00_13", skip_serializing_if = "Option::is_none")]
    pub band_00_13: Option<i32>,
    #[serde(rename = "minInterval_13_17", skip_serializing_if = "Option::is_none")]
    pub band_13_17: Option<i32>,
    #[serde(rename = "minInterval_17_24", skip_serializing_if = "Option::is_none")]
    pub band_17_24: Option<i32>,
    /// Single-value spacing from older configurations.
    #[serde(rename = "minIntervalMinutes", skip_serializing_if = "Option::is_none")]
    pub legacy_minutes: Option<i32>,
    #[serde(rename = "conflictsCheckEnabled")]
    pub conflicts_check_enabled: bool,
    /// Surfaced to callers; does not change any computation here.
    #[serde(rename = "isAutomationPaused")]
    pub automation_paused: bool,
}

impl Default for IntervalSettings {
    fn default() -> Self {
        Self {
            band_00_13: None,
            band_13_17: None,
            band_17_24: None,
            legacy_minutes: None,
            conflicts_check_enabled: true,
            automation_paused: false,
        }
    }
}

impl IntervalSettings {
    /// All three bands set to the same value.
    pub fn uniform(minutes: i32) -> Self {
        Self {
            band_00_13: Some(minutes),
            band_13_17: Some(minutes),
            band_17_24: Some(minutes),
            ..Self::default()
        }
    }

    /// Only the legacy single value set.
    pub fn legacy(minutes: i32) -> Self {
        Self {
            legacy_minutes: Some(minutes),
            ..Self::default()
        }
    }

    pub fn band_value(&self, band: Band) -> Option<i32> {
        match band {
            Band::Night => self.band_00_13,
            Band::Afternoon => self.band_13_17,
            Band::Evening => self.band_17_24,
        }
    }

    /// Required spacing in minutes for a slot at `time`.
    pub fn required_interval(&self, time: TimeOfDay) -> i32 {
        self.band_value(Band::of(time))
            .or(self.legacy_minutes)
            .unwrap_or(DEFAULT_INTERVAL_MINUTES)
            .clamp(MIN_INTERVAL_MINUTES, MAX_INTERVAL_MINUTES)
    }
}

/// Free-function form of [`IntervalSettings::required_interval`] taking a raw minute.
pub fn required_interval(minutes: i32, settings: &IntervalSettings) -> i32 {
    settings.required_interval(TimeOfDay::from_minutes(minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> TimeOfDay {
        TimeOfDay::from_hm(h, m).unwrap()
    }

    #[test]
    fn band_edges_are_half_open() {
        assert_eq!(Band::of(at(12, 59)), Band::Night);
        assert_eq!(Band::of(at(13, 0)), Band::Afternoon);
        assert_eq!(Band::of(at(16, 59)), Band::Afternoon);
        assert_eq!(Band::of(at(17, 0)), Band::Evening);
        assert_eq!(Band::of(at(23, 59)), Band::Evening);
    }

    #[test]
    fn fallback_order_band_then_legacy_then_default() {
        let mut settings = IntervalSettings::legacy(20);
        settings.band_13_17 = Some(5);
        assert_eq!(settings.required_interval(at(14, 0)), 5);
        assert_eq!(settings.required_interval(at(9, 0)), 20);
        assert_eq!(IntervalSettings::default().required_interval(at(9, 0)), 11);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut settings = IntervalSettings::uniform(0);
        settings.band_17_24 = Some(500);
        assert_eq!(settings.required_interval(at(1, 0)), 1);
        assert_eq!(settings.required_interval(at(18, 0)), 60);
        assert_eq!(required_interval(-5, &IntervalSettings::uniform(-3)), 1);
    }
}
