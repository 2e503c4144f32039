//! Plain-text rendering for terminal output.

use std::fmt::Write;

use chrono::NaiveDateTime;
use slot_engine::{
    AutomationRole, AutomationState, ChannelStateInfo, Conflict, ConflictSet, FreeRange,
    SuggestedSlot, Timer,
};

pub fn conflicts(set: &ConflictSet) -> String {
    if set.is_empty() {
        return "No conflicts\n".to_string();
    }
    let mut out = String::new();
    for key in set.iter() {
        let _ = writeln!(out, "{}", key);
    }
    out
}

pub fn conflict_pairs(pairs: &[Conflict]) -> String {
    let mut out = String::new();
    for c in pairs {
        let _ = writeln!(
            out,
            "{} {} -> {} {}: {} min apart, {} required{}",
            c.earlier.channel_id,
            c.earlier.time,
            c.later.channel_id,
            c.later.time,
            c.gap_minutes,
            c.required_minutes,
            if c.wraps_midnight { " (across midnight)" } else { "" }
        );
    }
    out
}

pub fn free_ranges(ranges: &[FreeRange], suggestions: Option<&[SuggestedSlot]>) -> String {
    let mut out = String::new();
    for range in ranges {
        let _ = write!(out, "{}-{} ({} min)", range.start, range.end, range.len());
        if let Some(suggestions) = suggestions {
            let inside: Vec<String> = suggestions
                .iter()
                .filter(|s| range.contains(s.time))
                .map(|s| s.time.to_string())
                .collect();
            if !inside.is_empty() {
                let _ = write!(out, ": {}", inside.join(" "));
            }
        }
        out.push('\n');
    }
    out
}

pub fn suggestions(slots: &[SuggestedSlot]) -> String {
    let mut out = String::new();
    for slot in slots {
        let _ = writeln!(out, "{}", slot.time);
    }
    out
}

pub fn automation(state: &AutomationState, now: NaiveDateTime) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Evaluated at {}{}",
        state.evaluated_at.format("%Y-%m-%d %H:%M:%S"),
        if state.paused { " (automation paused)" } else { "" }
    );
    for info in &state.channels {
        let _ = writeln!(out, "{}", channel_line(info, now));
    }
    out
}

/// One status line for a channel, including its countdown if it has a role.
pub fn channel_line(info: &ChannelStateInfo, now: NaiveDateTime) -> String {
    let role = match info.state {
        AutomationRole::Current => "current",
        AutomationRole::Next => "next",
        AutomationRole::Previous => "previous",
        AutomationRole::Default => "-",
    };
    let slot = info
        .time_slot
        .map(|t| t.to_string())
        .unwrap_or_else(|| "--:--".to_string());
    let timer = match info.timer(now) {
        Some(Timer::Running {
            elapsed_secs,
            remaining_secs,
        }) => format!(
            "running {} / {} left",
            clock(elapsed_secs),
            clock(remaining_secs)
        ),
        Some(Timer::StartsIn { secs }) => format!("starts in {}", clock(secs)),
        Some(Timer::EndedAgo { secs }) => format!("ended {} ago", clock(secs)),
        None => String::new(),
    };
    format!("{:<9} {:<5} {:<24} {}", role, slot, info.channel_name, timer)
        .trim_end()
        .to_string()
}

/// `H:MM:SS` for a non-negative second count.
fn clock(secs: i64) -> String {
    format!("{}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
}
