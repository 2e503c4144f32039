//! Greedy placement of candidate slot times inside free ranges.

use serde::Serialize;

use crate::freerange::FreeRange;
use crate::policy::IntervalSettings;
use crate::time::TimeOfDay;

/// Upper bound on suggestions returned when the caller has no preference.
pub const DEFAULT_SUGGESTION_CAP: usize = 200;

/// A candidate time for a new slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SuggestedSlot {
    pub time: TimeOfDay,
}

/// Walk each range from its start, stepping by the interval required at the
/// current candidate, until the range ends or `cap` suggestions exist.
pub fn suggest_slots(
    ranges: &[FreeRange],
    settings: &IntervalSettings,
    cap: usize,
) -> Vec<SuggestedSlot> {
    let mut suggestions = Vec::new();

    'ranges: for range in ranges {
        let mut current = range.start.minutes();
        while current <= range.end.minutes() {
            if suggestions.len() >= cap {
                break 'ranges;
            }
            let time = TimeOfDay::from_minutes(current);
            suggestions.push(SuggestedSlot { time });
            current += settings.required_interval(time);
        }
    }

    suggestions.sort();
    suggestions
}
