//! Tests for live automation state arbitration and countdowns.

use chrono::{NaiveDate, NaiveDateTime};
use slot_engine::automation::{is_active, raw_state, RawState};
use slot_engine::{evaluate, AutomationRole, Channel, IntervalSettings, TimeOfDay, Timer};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn t(text: &str) -> TimeOfDay {
    TimeOfDay::parse(text).unwrap()
}

fn channel(id: &str, times: &[&str]) -> Channel {
    times
        .iter()
        .fold(Channel::new(id, format!("Channel {id}")), |c, time| c.with_slot(time))
}

fn eleven() -> IntervalSettings {
    IntervalSettings::uniform(11)
}

// ── Active window ───────────────────────────────────────────────────────────

#[test]
fn slot_is_current_inside_its_window() {
    // 10:00 ≤ 10:05 < 10:11
    let channels = vec![channel("A", &["10:00"])];
    let state = evaluate(&channels, &eleven(), at(1, 10, 5));

    let a = state.get("A").unwrap();
    assert_eq!(a.state, AutomationRole::Current);
    assert_eq!(a.time_slot, Some(t("10:00")));
    assert_eq!(a.current_start, Some(at(1, 10, 0)));
    assert_eq!(a.current_end, Some(at(1, 10, 11)));
}

#[test]
fn window_wraps_past_midnight() {
    let settings = eleven();
    let slot = t("23:58");
    for now in [1438, 1439, 0, 1, 2, 3, 4, 5, 6, 7, 8] {
        assert!(is_active(slot, TimeOfDay::from_minutes(now), &settings), "inactive at {now}");
    }
    assert!(!is_active(slot, TimeOfDay::from_minutes(9), &settings));
    assert!(!is_active(slot, TimeOfDay::from_minutes(1437), &settings));
}

#[test]
fn wrapped_current_starts_yesterday() {
    let channels = vec![channel("A", &["23:58"])];
    let state = evaluate(&channels, &eleven(), at(2, 0, 3));

    let a = state.current().unwrap();
    assert_eq!(a.channel_id, "A");
    assert_eq!(a.current_start, Some(at(1, 23, 58)));
    assert_eq!(a.current_end, Some(at(2, 0, 9)));
}

#[test]
fn window_end_is_exclusive() {
    let channels = vec![channel("A", &["10:00"])];
    let state = evaluate(&channels, &eleven(), at(1, 10, 11));
    assert_ne!(state.get("A").unwrap().state, AutomationRole::Current);
}

// ── Raw per-channel state ───────────────────────────────────────────────────

#[test]
fn raw_state_classification() {
    let settings = eleven();
    let now = t("10:05");

    assert_eq!(
        raw_state(&channel("A", &["10:00"]), &settings, now),
        RawState::Current { slot: t("10:00") }
    );
    assert_eq!(
        raw_state(&channel("A", &["08:00", "12:00"]), &settings, now),
        RawState::Next { slot: t("12:00") }
    );
    assert_eq!(
        raw_state(&channel("A", &["08:00"]), &settings, now),
        RawState::Next { slot: t("08:00") }
    );
    assert_eq!(
        raw_state(&channel("A", &["10:00"]).with_auto_send(false), &settings, now),
        RawState::Default
    );
    assert_eq!(raw_state(&channel("A", &[]), &settings, now), RawState::Default);
}

#[test]
fn latest_active_slot_of_a_channel_wins() {
    let settings = IntervalSettings::uniform(30);
    assert_eq!(
        raw_state(&channel("A", &["10:00", "10:10"]), &settings, t("10:15")),
        RawState::Current { slot: t("10:10") }
    );
}

// ── Arbitration ─────────────────────────────────────────────────────────────

#[test]
fn one_current_when_two_channels_are_active() {
    let channels = vec![channel("A", &["10:00"]), channel("B", &["10:03"])];
    let state = evaluate(&channels, &eleven(), at(1, 10, 5));

    assert_eq!(state.current().unwrap().channel_id, "B");

    // A's only slot is still running, so its next occurrence is tomorrow.
    let a = state.get("A").unwrap();
    assert_eq!(a.state, AutomationRole::Next);
    assert_eq!(a.next_start, Some(at(2, 10, 0)));
    assert!(state.previous().is_none());
}

#[test]
fn most_recent_start_wins_current_across_midnight() {
    // Both are active at 00:03; 00:00 started after 23:58 even though its
    // minute-of-day is smaller.
    let channels = vec![channel("A", &["23:58"]), channel("B", &["00:00"])];
    let state = evaluate(&channels, &eleven(), at(2, 0, 3));

    let current = state.current().unwrap();
    assert_eq!(current.channel_id, "B");
    assert_eq!(current.current_start, Some(at(2, 0, 0)));
    assert_ne!(state.get("A").unwrap().state, AutomationRole::Current);
}

#[test]
fn next_and_previous_picked_across_channels() {
    let channels = vec![
        channel("A", &["12:00"]),
        channel("B", &["11:00"]),
        channel("C", &["08:00"]),
    ];
    let state = evaluate(&channels, &eleven(), at(1, 10, 0));

    assert!(state.current().is_none());

    let next = state.next().unwrap();
    assert_eq!(next.channel_id, "B");
    assert_eq!(next.next_start, Some(at(1, 11, 0)));

    let previous = state.previous().unwrap();
    assert_eq!(previous.channel_id, "C");
    assert_eq!(previous.previous_start, Some(at(1, 8, 0)));
    assert_eq!(previous.previous_end, Some(at(1, 8, 11)));

    assert_eq!(state.get("A").unwrap().state, AutomationRole::Default);
}

#[test]
fn next_wraps_to_tomorrow() {
    let channels = vec![channel("A", &["08:00"]), channel("B", &["07:00"])];
    let state = evaluate(&channels, &eleven(), at(1, 20, 0));

    let next = state.next().unwrap();
    assert_eq!(next.channel_id, "B");
    assert_eq!(next.next_start, Some(at(2, 7, 0)));

    let previous = state.previous().unwrap();
    assert_eq!(previous.channel_id, "A");
    assert_eq!(previous.previous_start, Some(at(1, 8, 0)));
}

#[test]
fn previous_goes_to_another_channel_when_next_also_elapsed() {
    // A's 09:00 has finished and its 12:00 is the next slot; B's 08:00 is the
    // only other finished slot and must take the previous role.
    let channels = vec![channel("A", &["09:00", "12:00"]), channel("B", &["08:00"])];
    let state = evaluate(&channels, &eleven(), at(1, 10, 0));

    let a = state.get("A").unwrap();
    assert_eq!(a.state, AutomationRole::Next);
    assert_eq!(a.next_start, Some(at(1, 12, 0)));

    let b = state.get("B").unwrap();
    assert_eq!(b.state, AutomationRole::Previous);
    assert_eq!(b.time_slot, Some(t("08:00")));
    assert_eq!(b.previous_start, Some(at(1, 8, 0)));
    assert_eq!(b.previous_end, Some(at(1, 8, 11)));
}

#[test]
fn lone_channel_takes_next_and_leaves_previous_empty() {
    let channels = vec![channel("A", &["08:00"])];
    let state = evaluate(&channels, &eleven(), at(1, 20, 0));

    let a = state.get("A").unwrap();
    assert_eq!(a.state, AutomationRole::Next);
    assert_eq!(a.next_start, Some(at(2, 8, 0)));
    assert!(state.previous().is_none());
}

#[test]
fn previous_falls_back_to_yesterday() {
    let channels = vec![
        channel("A", &["22:00"]),
        channel("B", &["23:00"]),
        channel("C", &["07:00"]),
    ];
    let state = evaluate(&channels, &eleven(), at(2, 6, 0));

    assert_eq!(state.next().unwrap().channel_id, "C");
    let previous = state.previous().unwrap();
    assert_eq!(previous.channel_id, "B");
    assert_eq!(previous.previous_start, Some(at(1, 23, 0)));
    assert_eq!(previous.previous_end, Some(at(1, 23, 11)));
}

#[test]
fn previous_prefers_today_over_yesterday() {
    let channels = vec![channel("A", &["23:00"]), channel("B", &["05:00"]), channel("C", &["09:00"])];
    let state = evaluate(&channels, &eleven(), at(2, 6, 0));
    assert_eq!(state.previous().unwrap().channel_id, "B");
}

#[test]
fn next_tie_goes_to_first_channel() {
    let channels = vec![channel("A", &["11:00"]), channel("B", &["11:00"])];
    let state = evaluate(&channels, &eleven(), at(1, 10, 0));
    assert_eq!(state.next().unwrap().channel_id, "A");
}

#[test]
fn disabled_channels_stay_default() {
    let channels = vec![
        channel("A", &["10:00"]).with_auto_send(false),
        channel("B", &["12:00"]),
        Channel::new("C", "C").with_disabled_slot("10:01"),
    ];
    let state = evaluate(&channels, &eleven(), at(1, 10, 5));

    assert!(state.current().is_none());
    assert_eq!(state.get("A").unwrap().state, AutomationRole::Default);
    assert_eq!(state.get("B").unwrap().state, AutomationRole::Next);
    assert_eq!(state.get("C").unwrap().state, AutomationRole::Default);
}

#[test]
fn every_channel_reported_once_in_input_order() {
    let channels = vec![channel("z", &["01:00"]), channel("a", &[]), channel("m", &["13:00"])];
    let state = evaluate(&channels, &eleven(), at(1, 12, 0));
    let ids: Vec<&str> = state.channels.iter().map(|c| c.channel_id.as_str()).collect();
    assert_eq!(ids, vec!["z", "a", "m"]);
}

#[test]
fn no_channels_nothing_to_report() {
    let state = evaluate(&[], &eleven(), at(1, 12, 0));
    assert!(state.channels.is_empty());
    assert!(state.current().is_none());
}

#[test]
fn paused_flag_is_surfaced_without_changing_roles() {
    let channels = vec![channel("A", &["10:00"])];
    let mut settings = eleven();
    settings.automation_paused = true;

    let state = evaluate(&channels, &settings, at(1, 10, 5));
    assert!(state.paused);
    assert_eq!(state.current().unwrap().channel_id, "A");
}

// ── Current channel's own neighbours ────────────────────────────────────────

#[test]
fn current_channel_reports_its_own_neighbour_slots() {
    let channels = vec![channel("A", &["08:00", "10:00", "12:00"])];
    let state = evaluate(&channels, &eleven(), at(1, 10, 5));

    let a = state.current().unwrap();
    assert_eq!(a.next_slot_time, Some(t("12:00")));
    assert_eq!(a.next_slot_date, Some(at(1, 12, 0)));
    assert_eq!(a.previous_slot_time, Some(t("08:00")));
    assert_eq!(a.previous_slot_date, Some(at(1, 8, 0)));
}

#[test]
fn current_channel_neighbours_cross_midnight() {
    let channels = vec![channel("A", &["00:30", "23:58"])];
    let state = evaluate(&channels, &eleven(), at(1, 23, 59));

    let a = state.current().unwrap();
    assert_eq!(a.time_slot, Some(t("23:58")));
    assert_eq!(a.next_slot_date, Some(at(2, 0, 30)));
    assert_eq!(a.previous_slot_date, Some(at(1, 0, 30)));
}

#[test]
fn current_channel_previous_skips_still_running_slots() {
    // With a 30-minute interval 10:00 is still running at 10:15, so the most
    // recently finished sibling is 09:00.
    let channels = vec![channel("A", &["09:00", "10:00", "10:10"])];
    let state = evaluate(&channels, &IntervalSettings::uniform(30), at(1, 10, 15));

    let a = state.current().unwrap();
    assert_eq!(a.time_slot, Some(t("10:10")));
    assert_eq!(a.previous_slot_time, Some(t("09:00")));
    assert_eq!(a.previous_slot_date, Some(at(1, 9, 0)));
    assert_eq!(a.next_slot_time, Some(t("09:00")));
    assert_eq!(a.next_slot_date, Some(at(2, 9, 0)));
}

#[test]
fn single_slot_current_channel_has_no_neighbours() {
    let channels = vec![channel("A", &["10:00"])];
    let state = evaluate(&channels, &eleven(), at(1, 10, 5));
    let a = state.current().unwrap();
    assert_eq!(a.next_slot_time, None);
    assert_eq!(a.previous_slot_time, None);
}

// ── Timers ──────────────────────────────────────────────────────────────────

#[test]
fn timers_are_plain_subtraction() {
    let channels = vec![
        channel("A", &["10:00"]),
        channel("B", &["11:00"]),
        channel("C", &["08:00"]),
    ];
    let state = evaluate(&channels, &eleven(), at(1, 10, 5));
    let later = at(1, 10, 5) + chrono::Duration::seconds(30);

    assert_eq!(
        state.get("A").unwrap().timer(later),
        Some(Timer::Running {
            elapsed_secs: 330,
            remaining_secs: 330
        })
    );
    assert_eq!(
        state.get("B").unwrap().timer(later),
        Some(Timer::StartsIn { secs: 54 * 60 + 30 })
    );
    assert_eq!(
        state.get("C").unwrap().timer(later),
        Some(Timer::EndedAgo {
            secs: (10 * 60 + 5 - (8 * 60 + 11)) * 60 + 30
        })
    );
}

#[test]
fn timers_clamp_at_zero() {
    let channels = vec![channel("A", &["10:00"])];
    let state = evaluate(&channels, &eleven(), at(1, 10, 5));
    assert_eq!(
        state.current().unwrap().timer(at(1, 11, 0)),
        Some(Timer::Running {
            elapsed_secs: 3600,
            remaining_secs: 0
        })
    );
}

#[test]
fn seconds_in_now_do_not_shift_instants() {
    let channels = vec![channel("A", &["10:00"])];
    let now = at(1, 10, 5) + chrono::Duration::seconds(42);
    let state = evaluate(&channels, &eleven(), now);
    assert_eq!(state.current().unwrap().current_start, Some(at(1, 10, 0)));
}
