//! # slot-engine
//!
//! Spacing, free-time and live-state computations for channels that publish at
//! recurring daily `HH:MM` slots.
//!
//! Every function is pure: it takes the channel list, the interval settings and
//! (where relevant) the current local instant, and returns fresh values. Nothing
//! is cached between calls, so snapshots can be shared across threads freely.
//!
//! ## Modules
//!
//! - [`time`] — `HH:MM` ⇄ minute-of-day on a circular day
//! - [`policy`] — Time-of-day banded minimum spacing
//! - [`channel`] — Channel records, slot flattening, input snapshots
//! - [`conflict`] — Slots spaced closer than the policy allows
//! - [`freerange`] — Parts of the day open for a new slot
//! - [`suggest`] — Candidate times inside free ranges
//! - [`automation`] — Current / next / previous channel at an instant
//! - [`clock`] — Injectable wall-clock sources and polling cadence
//! - [`error`] — Error types

pub mod automation;
pub mod channel;
pub mod clock;
pub mod conflict;
pub mod error;
pub mod freerange;
pub mod policy;
pub mod suggest;
pub mod time;

pub use automation::{evaluate, AutomationRole, AutomationState, ChannelStateInfo, Timer};
pub use channel::{flatten_slots, occupied_times, Channel, ScheduleEntry, Slot, Snapshot};
pub use conflict::{detect_conflicts, find_conflicts, Conflict, ConflictKey, ConflictSet};
pub use error::{EngineError, ParseTimeError};
pub use freerange::{find_free_ranges, FreeRange, Occupancy};
pub use policy::{required_interval, Band, IntervalSettings};
pub use suggest::{suggest_slots, SuggestedSlot, DEFAULT_SUGGESTION_CAP};
pub use time::{format_minutes, TimeOfDay, MINUTES_PER_DAY};

impl Snapshot {
    /// Conflict set for this snapshot.
    pub fn conflicts(&self) -> ConflictSet {
        detect_conflicts(&self.channels, &self.settings)
    }

    /// Free ranges left by every enabled slot in this snapshot.
    pub fn free_ranges(&self) -> Vec<FreeRange> {
        find_free_ranges(&occupied_times(&self.channels), &self.settings)
    }

    /// Suggested new slot times, at most `cap` of them.
    pub fn suggestions(&self, cap: usize) -> Vec<SuggestedSlot> {
        suggest_slots(&self.free_ranges(), &self.settings, cap)
    }

    /// Automation roles at the local instant `now`.
    pub fn automation(&self, now: chrono::NaiveDateTime) -> AutomationState {
        evaluate(&self.channels, &self.settings, now)
    }
}
