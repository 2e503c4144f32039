//! Detect slots that sit closer together than the spacing policy allows.
//!
//! Slots from all channels are sorted by minute and only neighbours in that
//! order are compared, plus the pair that wraps across midnight (last slot of
//! the day against the first). A pair violates the policy when its gap is
//! smaller than the interval required at the later slot's time. Non-adjacent
//! pairs are never compared, so in a tight cluster of three the outer two are
//! only flagged through their neighbours.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::channel::{enabled_slots, Channel, Slot};
use crate::policy::IntervalSettings;
use crate::time::{TimeOfDay, MINUTES_PER_DAY};

/// Composite key for a slot taking part in a violation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConflictKey {
    pub channel_id: String,
    pub time: TimeOfDay,
}

impl ConflictKey {
    pub fn new(channel_id: impl Into<String>, time: TimeOfDay) -> Self {
        Self {
            channel_id: channel_id.into(),
            time,
        }
    }
}

impl fmt::Display for ConflictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.channel_id, self.time)
    }
}

impl Serialize for ConflictKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A neighbouring pair of slots that violates the spacing policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub earlier: Slot,
    pub later: Slot,
    /// Minutes from `earlier` to `later` going forward (across midnight for the wrap pair).
    pub gap_minutes: i32,
    /// Spacing required at the time of `later`.
    pub required_minutes: i32,
    pub wraps_midnight: bool,
}

/// Every slot that currently participates in at least one violation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConflictSet(BTreeSet<ConflictKey>);

impl ConflictSet {
    pub fn contains(&self, channel_id: &str, time: TimeOfDay) -> bool {
        self.0.contains(&ConflictKey::new(channel_id, time))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConflictKey> {
        self.0.iter()
    }

    /// The `"{channelId}-{HH:MM}"` string form of every key.
    pub fn keys(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl FromIterator<ConflictKey> for ConflictSet {
    fn from_iter<I: IntoIterator<Item = ConflictKey>>(iter: I) -> Self {
        ConflictSet(iter.into_iter().collect())
    }
}

/// Find violating neighbour pairs among the given slots.
///
/// Disabled slots are ignored. Equal minutes keep their input order.
pub fn find_conflicts(slots: &[Slot], settings: &IntervalSettings) -> Vec<Conflict> {
    let mut sorted: Vec<&Slot> = slots.iter().filter(|slot| slot.enabled).collect();
    if sorted.len() < 2 {
        return Vec::new();
    }
    sorted.sort_by_key(|slot| slot.time);

    let mut conflicts = Vec::new();

    for pair in sorted.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let gap = b.time.minutes() - a.time.minutes();
        let required = settings.required_interval(b.time);
        if gap < required {
            conflicts.push(Conflict {
                earlier: a.clone(),
                later: b.clone(),
                gap_minutes: gap,
                required_minutes: required,
                wraps_midnight: false,
            });
        }
    }

    // Last slot of the day against the first slot of the next day.
    let (first, last) = (sorted[0], sorted[sorted.len() - 1]);
    let wrap_gap = first.time.minutes() + MINUTES_PER_DAY - last.time.minutes();
    let required = settings.required_interval(first.time);
    if wrap_gap < required {
        conflicts.push(Conflict {
            earlier: last.clone(),
            later: first.clone(),
            gap_minutes: wrap_gap,
            required_minutes: required,
            wraps_midnight: true,
        });
    }

    conflicts
}

/// Build the conflict set for all enabled slots of all channels.
///
/// Returns an empty set when conflict checking is switched off in `settings`.
pub fn detect_conflicts(channels: &[Channel], settings: &IntervalSettings) -> ConflictSet {
    if !settings.conflicts_check_enabled {
        return ConflictSet::default();
    }
    find_conflicts(&enabled_slots(channels), settings)
        .into_iter()
        .flat_map(|c| {
            [
                ConflictKey::new(c.earlier.channel_id, c.earlier.time),
                ConflictKey::new(c.later.channel_id, c.later.time),
            ]
        })
        .collect()
}
