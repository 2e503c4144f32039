//! Compute the parts of the day still open for a new slot.
//!
//! Each occupied time blocks a radius of `interval - 1` minutes on both sides.
//! The radius is clipped at 00:00 and 23:59 rather than wrapping, so a slot just
//! after midnight never blocks minutes late the previous evening. The remaining
//! free runs are kept only if they are long enough to host one slot under the
//! interval required at their own start.

use serde::Serialize;

use crate::policy::IntervalSettings;
use crate::time::{TimeOfDay, MINUTES_PER_DAY};

const DAY_LEN: usize = MINUTES_PER_DAY as usize;

/// A maximal run of unblocked minutes, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FreeRange {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl FreeRange {
    /// Number of minutes in the range.
    pub fn len(&self) -> i32 {
        self.end.minutes() - self.start.minutes() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }

    pub fn contains(&self, time: TimeOfDay) -> bool {
        self.start <= time && time <= self.end
    }

    /// The whole day.
    pub fn full_day() -> Self {
        Self {
            start: TimeOfDay::MIDNIGHT,
            end: TimeOfDay::LAST_MINUTE,
        }
    }
}

/// Per-minute blocked map of one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    blocked: Vec<bool>,
}

impl Occupancy {
    /// Mark the spacing radius around every occupied time as blocked.
    pub fn from_times(occupied: &[TimeOfDay], settings: &IntervalSettings) -> Self {
        let mut blocked = vec![false; DAY_LEN];
        for &time in occupied {
            let radius = settings.required_interval(time) - 1;
            let t = time.minutes();
            let from = (t - radius).max(0) as usize;
            let to = (t + radius).min(MINUTES_PER_DAY - 1) as usize;
            blocked[from..=to].fill(true);
        }
        Self { blocked }
    }

    pub fn is_blocked(&self, time: TimeOfDay) -> bool {
        self.blocked[time.minutes() as usize]
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|&&b| b).count()
    }

    /// Every maximal run of unblocked minutes, regardless of length.
    pub fn free_runs(&self) -> Vec<FreeRange> {
        let mut runs = Vec::new();
        let mut run_start: Option<usize> = None;

        for (minute, &blocked) in self.blocked.iter().enumerate() {
            match (blocked, run_start) {
                (false, None) => run_start = Some(minute),
                (true, Some(start)) => {
                    runs.push(range(start, minute - 1));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            runs.push(range(start, DAY_LEN - 1));
        }

        runs
    }
}

fn range(start: usize, end: usize) -> FreeRange {
    FreeRange {
        start: TimeOfDay::from_minutes(start as i32),
        end: TimeOfDay::from_minutes(end as i32),
    }
}

/// Free ranges of the day given the occupied slot times, sorted by start.
///
/// With nothing occupied the whole day is one range.
pub fn find_free_ranges(occupied: &[TimeOfDay], settings: &IntervalSettings) -> Vec<FreeRange> {
    if occupied.is_empty() {
        return vec![FreeRange::full_day()];
    }

    Occupancy::from_times(occupied, settings)
        .free_runs()
        .into_iter()
        .filter(|run| run.len() >= settings.required_interval(run.start))
        .collect()
}
