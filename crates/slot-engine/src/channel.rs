//! Channel records as supplied by the persistence collaborator, and the flat
//! slot list every computation works from.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::policy::IntervalSettings;
use crate::time::TimeOfDay;

/// One scheduled daily publication time as stored (`time` is raw text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub time: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

/// A publishing channel and its recurring schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    /// Opaque identifier. Numeric ids in the input are kept as their decimal text.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub auto_send_enabled: bool,
    #[serde(default)]
    pub schedules: Vec<ScheduleEntry>,
}

impl Channel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            auto_send_enabled: true,
            schedules: Vec::new(),
        }
    }

    /// Builder-style helper appending an enabled schedule entry.
    pub fn with_slot(mut self, time: &str) -> Self {
        self.schedules.push(ScheduleEntry {
            time: time.to_string(),
            enabled: true,
        });
        self
    }

    /// Builder-style helper appending a disabled schedule entry.
    pub fn with_disabled_slot(mut self, time: &str) -> Self {
        self.schedules.push(ScheduleEntry {
            time: time.to_string(),
            enabled: false,
        });
        self
    }

    pub fn with_auto_send(mut self, enabled: bool) -> Self {
        self.auto_send_enabled = enabled;
        self
    }

    /// Enabled, parsable slot times, sorted ascending with duplicates removed.
    pub fn enabled_times(&self) -> Vec<TimeOfDay> {
        let mut times: Vec<TimeOfDay> = self
            .schedules
            .iter()
            .filter(|entry| entry.enabled)
            .filter_map(|entry| parse_entry(&self.id, &entry.time))
            .collect();
        times.sort_unstable();
        times.dedup();
        times
    }
}

/// A single `(channel, time)` pair flattened out of a channel's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub channel_id: String,
    pub channel_name: String,
    pub time: TimeOfDay,
    pub enabled: bool,
}

/// Everything one invocation of the engine needs besides the instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub channels: Vec<Channel>,
    pub settings: IntervalSettings,
}

impl Snapshot {
    /// Parse a `{ "channels": [...], "settings": {...} }` document.
    ///
    /// # Errors
    /// Returns `EngineError::Json` if the document is not valid JSON or has the
    /// wrong shape. Individual malformed slot times are not errors.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Flatten every channel's schedule into slots, dropping unparsable times.
///
/// Disabled entries are kept (with `enabled: false`) so callers can render them.
pub fn flatten_slots(channels: &[Channel]) -> Vec<Slot> {
    channels
        .iter()
        .flat_map(|channel| {
            channel.schedules.iter().filter_map(move |entry| {
                parse_entry(&channel.id, &entry.time).map(|time| Slot {
                    channel_id: channel.id.clone(),
                    channel_name: channel.name.clone(),
                    time,
                    enabled: entry.enabled,
                })
            })
        })
        .collect()
}

/// Enabled slots across all channels.
pub fn enabled_slots(channels: &[Channel]) -> Vec<Slot> {
    flatten_slots(channels)
        .into_iter()
        .filter(|slot| slot.enabled)
        .collect()
}

/// The times occupied by enabled slots of any channel.
pub fn occupied_times(channels: &[Channel]) -> Vec<TimeOfDay> {
    enabled_slots(channels)
        .into_iter()
        .map(|slot| slot.time)
        .collect()
}

fn parse_entry(channel_id: &str, text: &str) -> Option<TimeOfDay> {
    let parsed = TimeOfDay::parse(text);
    if parsed.is_none() {
        debug!(channel_id, time = text, "dropping unparsable schedule time");
    }
    parsed
}

fn enabled_by_default() -> bool {
    true
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(n) => n.to_string(),
    })
}
