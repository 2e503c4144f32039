//! Polling loop: re-arbitrate roles on the refresh tick, print countdowns on
//! the fast tick from the last arbitration.

use std::time::Duration;

use anyhow::Result;
use slot_engine::clock::Clock;
use slot_engine::{AutomationRole, AutomationState, Snapshot};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::render;

pub struct WatchOptions {
    pub refresh: Duration,
    pub tick: Duration,
    pub max_ticks: Option<u64>,
    pub json: bool,
}

pub async fn run(snapshot: &Snapshot, clock: &dyn Clock, options: WatchOptions) -> Result<()> {
    let mut refresh = interval(options.refresh);
    let mut tick = interval(options.tick);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Both intervals fire immediately; evaluate first so the first tick has data.
    refresh.tick().await;
    let mut state = evaluate(snapshot, clock, None);
    let mut ticks = 0u64;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = refresh.tick() => {
                state = evaluate(snapshot, clock, Some(&state));
            }
            _ = tick.tick() => {
                print_tick(&state, clock, options.json)?;
                ticks += 1;
                if options.max_ticks.is_some_and(|max| ticks >= max) {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                info!("interrupted, stopping");
                break;
            }
        }
    }

    Ok(())
}

fn evaluate(snapshot: &Snapshot, clock: &dyn Clock, previous: Option<&AutomationState>) -> AutomationState {
    let state = snapshot.automation(clock.now());
    let holder = |s: &AutomationState, role: AutomationRole| {
        s.channels
            .iter()
            .find(|c| c.state == role)
            .map(|c| c.channel_id.clone())
    };
    let current = holder(&state, AutomationRole::Current);
    if previous.map(|p| holder(p, AutomationRole::Current)) != Some(current.clone()) {
        info!(
            current = current.as_deref().unwrap_or("none"),
            next = holder(&state, AutomationRole::Next).as_deref().unwrap_or("none"),
            paused = state.paused,
            "automation roles changed"
        );
    }
    state
}

fn print_tick(state: &AutomationState, clock: &dyn Clock, json: bool) -> Result<()> {
    let now = clock.now();
    let active = state
        .channels
        .iter()
        .filter(|c| c.state != AutomationRole::Default);
    if json {
        let timers: Vec<_> = active
            .map(|c| {
                serde_json::json!({
                    "channelId": c.channel_id,
                    "state": c.state,
                    "timer": c.timer(now),
                })
            })
            .collect();
        println!("{}", serde_json::to_string(&timers)?);
    } else {
        let lines: Vec<String> = active.map(|c| render::channel_line(c, now)).collect();
        println!("[{}] {}", now.format("%H:%M:%S"), lines.join(" | "));
    }
    Ok(())
}
