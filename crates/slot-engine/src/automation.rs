//! Live automation state: which channel is publishing now, which is next and
//! which finished most recently.
//!
//! A slot at `t` is active while `now` lies in the half-open window
//! `[t, t + interval)` taken modulo one day, so 23:58 with an 11-minute
//! interval is still active at 00:08. Each channel first gets a raw state on
//! its own; the channels are then arbitrated so that at most one holds each of
//! the `current`, `next` and `previous` roles, and neither `next` nor
//! `previous` is ever the `current` channel.
//!
//! Nothing is cached. Callers re-run [`evaluate`] on their own cadence
//! (see [`crate::clock::STATE_REFRESH_INTERVAL`]) and use
//! [`ChannelStateInfo::timer`] between evaluations for per-second countdowns.

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use tracing::debug;

use crate::channel::Channel;
use crate::policy::IntervalSettings;
use crate::time::{minutes_since, minutes_until, TimeOfDay, MINUTES_PER_DAY};

/// The role a channel plays relative to the present instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomationRole {
    Current,
    Next,
    Previous,
    Default,
}

/// A channel's state considered in isolation, before cross-channel arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawState {
    /// One of the channel's slots is inside its active window.
    Current { slot: TimeOfDay },
    /// Nothing active; `slot` is the next one to come (possibly tomorrow).
    Next { slot: TimeOfDay },
    /// Automation off or no usable slots.
    Default,
}

/// Final per-channel classification with the derived instants for its role.
///
/// All instants are local wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStateInfo {
    pub channel_id: String,
    pub channel_name: String,
    pub state: AutomationRole,
    /// The slot that earned the role, if any.
    pub time_slot: Option<TimeOfDay>,

    pub current_start: Option<NaiveDateTime>,
    pub current_end: Option<NaiveDateTime>,
    /// The current channel's own next slot after the active one.
    pub next_slot_time: Option<TimeOfDay>,
    pub next_slot_date: Option<NaiveDateTime>,
    /// The current channel's own most recently finished slot.
    pub previous_slot_time: Option<TimeOfDay>,
    pub previous_slot_date: Option<NaiveDateTime>,

    pub next_start: Option<NaiveDateTime>,

    pub previous_start: Option<NaiveDateTime>,
    pub previous_end: Option<NaiveDateTime>,
}

impl ChannelStateInfo {
    fn new(channel: &Channel, state: AutomationRole) -> Self {
        Self {
            channel_id: channel.id.clone(),
            channel_name: channel.name.clone(),
            state,
            time_slot: None,
            current_start: None,
            current_end: None,
            next_slot_time: None,
            next_slot_date: None,
            previous_slot_time: None,
            previous_slot_date: None,
            next_start: None,
            previous_start: None,
            previous_end: None,
        }
    }

    /// Countdown or elapsed seconds for this channel's role at `now`.
    ///
    /// Pure subtraction against the instants fixed by the last evaluation, so it
    /// is safe to call every second between evaluations. `None` for `default`.
    pub fn timer(&self, now: NaiveDateTime) -> Option<Timer> {
        let secs = |d: Duration| d.num_seconds().max(0);
        match self.state {
            AutomationRole::Current => {
                let (start, end) = (self.current_start?, self.current_end?);
                Some(Timer::Running {
                    elapsed_secs: secs(now - start),
                    remaining_secs: secs(end - now),
                })
            }
            AutomationRole::Next => Some(Timer::StartsIn {
                secs: secs(self.next_start? - now),
            }),
            AutomationRole::Previous => Some(Timer::EndedAgo {
                secs: secs(now - self.previous_end?),
            }),
            AutomationRole::Default => None,
        }
    }
}

/// Seconds-level countdown for one role, clamped at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Timer {
    Running { elapsed_secs: i64, remaining_secs: i64 },
    StartsIn { secs: i64 },
    EndedAgo { secs: i64 },
}

/// Result of one evaluation: one entry per input channel, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationState {
    pub evaluated_at: NaiveDateTime,
    /// Copied from the settings; the engine does not act on it.
    pub paused: bool,
    pub channels: Vec<ChannelStateInfo>,
}

impl AutomationState {
    pub fn get(&self, channel_id: &str) -> Option<&ChannelStateInfo> {
        self.channels.iter().find(|c| c.channel_id == channel_id)
    }

    pub fn current(&self) -> Option<&ChannelStateInfo> {
        self.with_role(AutomationRole::Current)
    }

    pub fn next(&self) -> Option<&ChannelStateInfo> {
        self.with_role(AutomationRole::Next)
    }

    pub fn previous(&self) -> Option<&ChannelStateInfo> {
        self.with_role(AutomationRole::Previous)
    }

    fn with_role(&self, role: AutomationRole) -> Option<&ChannelStateInfo> {
        self.channels.iter().find(|c| c.state == role)
    }
}

/// The slot of `times` whose active window contains `now`.
///
/// When several are active the most recently started one wins.
pub fn active_slot(
    times: &[TimeOfDay],
    now: TimeOfDay,
    settings: &IntervalSettings,
) -> Option<TimeOfDay> {
    times
        .iter()
        .copied()
        .filter(|&t| is_active(t, now, settings))
        .min_by_key(|&t| minutes_since(now, t))
}

/// Whether a slot at `t` is publishing at `now`.
pub fn is_active(t: TimeOfDay, now: TimeOfDay, settings: &IntervalSettings) -> bool {
    minutes_since(now, t) < settings.required_interval(t)
}

/// First slot strictly after `now`, else the earliest slot (tomorrow).
///
/// `times` must be sorted ascending.
pub fn next_slot(times: &[TimeOfDay], now: TimeOfDay) -> Option<TimeOfDay> {
    times
        .iter()
        .copied()
        .find(|&t| t > now)
        .or_else(|| times.first().copied())
}

/// Classify one channel without looking at the others.
pub fn raw_state(channel: &Channel, settings: &IntervalSettings, now: TimeOfDay) -> RawState {
    if !channel.auto_send_enabled {
        return RawState::Default;
    }
    let times = channel.enabled_times();
    if let Some(slot) = active_slot(&times, now, settings) {
        return RawState::Current { slot };
    }
    match next_slot(&times, now) {
        Some(slot) => RawState::Next { slot },
        None => RawState::Default,
    }
}

/// Per-channel working data for one evaluation.
struct Candidate<'a> {
    channel: &'a Channel,
    times: Vec<TimeOfDay>,
    active: Option<TimeOfDay>,
}

impl Candidate<'_> {
    fn eligible(&self) -> bool {
        self.channel.auto_send_enabled && !self.times.is_empty()
    }
}

/// Classify every channel at `now` and derive the instants for each role.
pub fn evaluate(
    channels: &[Channel],
    settings: &IntervalSettings,
    now: NaiveDateTime,
) -> AutomationState {
    let minute = TimeOfDay::of(now);

    let candidates: Vec<Candidate<'_>> = channels
        .iter()
        .map(|channel| {
            let times = if channel.auto_send_enabled {
                channel.enabled_times()
            } else {
                Vec::new()
            };
            let active = active_slot(&times, minute, settings);
            Candidate {
                channel,
                times,
                active,
            }
        })
        .collect();

    // Current: the active slot that started most recently across all channels.
    let current = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.eligible())
        .filter_map(|(i, c)| c.active.map(|slot| (i, slot)))
        .min_by_key(|&(_, slot)| minutes_since(minute, slot));

    let others = || {
        candidates
            .iter()
            .enumerate()
            .filter(move |&(i, c)| c.eligible() && Some(i) != current.map(|(ci, _)| ci))
    };

    // Next: earliest upcoming slot, anything at or before now counts as tomorrow.
    let next = others()
        .filter_map(|(i, c)| next_slot(&c.times, minute).map(|slot| (i, slot)))
        .min_by_key(|&(_, slot)| normalized_upcoming(slot, minute));

    // Previous: the fully elapsed slot that started most recently, from a
    // channel that did not already take the next role.
    let next_index = next.map(|(ni, _)| ni);
    let previous = others()
        .filter(|&(i, _)| Some(i) != next_index)
        .flat_map(|(i, c)| {
            c.times
                .iter()
                .copied()
                .filter(move |&t| !is_active(t, minute, settings))
                .map(move |t| (i, t))
        })
        .min_by_key(|&(_, slot)| minutes_since(minute, slot));

    debug!(
        now = %now,
        current = ?current.map(|(i, slot)| (&channels[i].id, slot.to_string())),
        next = ?next.map(|(i, slot)| (&channels[i].id, slot.to_string())),
        previous = ?previous.map(|(i, slot)| (&channels[i].id, slot.to_string())),
        "arbitrated automation roles"
    );

    let floor = floor_to_minute(now);
    let midnight = now.date().and_time(NaiveTime::MIN);

    let states = candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            if let Some((_, slot)) = current.filter(|&(ci, _)| ci == i) {
                current_info(candidate, slot, minute, floor, settings)
            } else if let Some((_, slot)) = next.filter(|&(ni, _)| ni == i) {
                let mut info = ChannelStateInfo::new(candidate.channel, AutomationRole::Next);
                info.time_slot = Some(slot);
                info.next_start =
                    Some(midnight + Duration::minutes(i64::from(normalized_upcoming(slot, minute))));
                info
            } else if let Some((_, slot)) = previous.filter(|&(pi, _)| pi == i) {
                let mut info = ChannelStateInfo::new(candidate.channel, AutomationRole::Previous);
                let mut start = midnight + Duration::minutes(i64::from(slot.minutes()));
                if slot > minute {
                    start -= Duration::days(1);
                }
                info.time_slot = Some(slot);
                info.previous_start = Some(start);
                info.previous_end = Some(start + interval(slot, settings));
                info
            } else {
                ChannelStateInfo::new(candidate.channel, AutomationRole::Default)
            }
        })
        .collect();

    AutomationState {
        evaluated_at: now,
        paused: settings.automation_paused,
        channels: states,
    }
}

fn current_info(
    candidate: &Candidate<'_>,
    slot: TimeOfDay,
    minute: TimeOfDay,
    floor: NaiveDateTime,
    settings: &IntervalSettings,
) -> ChannelStateInfo {
    let mut info = ChannelStateInfo::new(candidate.channel, AutomationRole::Current);
    let start = floor - Duration::minutes(i64::from(minutes_since(minute, slot)));
    info.time_slot = Some(slot);
    info.current_start = Some(start);
    info.current_end = Some(start + interval(slot, settings));

    let siblings = || candidate.times.iter().copied().filter(move |&t| t != slot);

    if let Some(next) = siblings().min_by_key(|&t| minutes_until(minute, t)) {
        info.next_slot_time = Some(next);
        info.next_slot_date =
            Some(floor + Duration::minutes(i64::from(minutes_until(minute, next))));
    }
    if let Some(prev) = siblings()
        .filter(|&t| !is_active(t, minute, settings))
        .min_by_key(|&t| minutes_since(minute, t))
    {
        info.previous_slot_time = Some(prev);
        info.previous_slot_date =
            Some(floor - Duration::minutes(i64::from(minutes_since(minute, prev))));
    }

    info
}

/// Sort key for "next": slots at or before now move to tomorrow.
fn normalized_upcoming(slot: TimeOfDay, now: TimeOfDay) -> i32 {
    if slot <= now {
        slot.minutes() + MINUTES_PER_DAY
    } else {
        slot.minutes()
    }
}

fn interval(slot: TimeOfDay, settings: &IntervalSettings) -> Duration {
    Duration::minutes(i64::from(settings.required_interval(slot)))
}

fn floor_to_minute(instant: NaiveDateTime) -> NaiveDateTime {
    instant
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(instant)
}
