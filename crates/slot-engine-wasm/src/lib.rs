//! WASM bindings for slot-engine.
//!
//! Exposes conflict detection, free ranges, slot suggestions and automation
//! state to JavaScript via `wasm-bindgen`. Inputs and outputs cross the
//! boundary as JSON strings. The UI owns the polling timer and passes the
//! local wall-clock instant on every call.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::NaiveDateTime;
use serde::Serialize;
use slot_engine::{IntervalSettings, Snapshot, DEFAULT_SUGGESTION_CAP};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_snapshot(json: &str) -> Result<Snapshot, String> {
    Snapshot::from_json(json).map_err(|e| e.to_string())
}

/// Parse a local datetime such as `2026-03-01T10:05:00`.
///
/// A trailing `Z` or UTC offset is not accepted: the engine works on the
/// caller's local wall clock and must not be handed UTC.
fn parse_local(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|e| format!("Invalid local datetime '{}': {}", s, e))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// Plain-Rust entry points (shared by the exports and by native tests)
// ---------------------------------------------------------------------------

pub fn conflicts_json(snapshot_json: &str) -> Result<String, String> {
    let snapshot = parse_snapshot(snapshot_json)?;
    to_json(&snapshot.conflicts().keys())
}

pub fn free_ranges_json(snapshot_json: &str) -> Result<String, String> {
    let snapshot = parse_snapshot(snapshot_json)?;
    to_json(&snapshot.free_ranges())
}

pub fn suggestions_json(snapshot_json: &str, cap: Option<u32>) -> Result<String, String> {
    let snapshot = parse_snapshot(snapshot_json)?;
    let cap = cap.map_or(DEFAULT_SUGGESTION_CAP, |c| c as usize);
    to_json(&snapshot.suggestions(cap))
}

pub fn automation_json(snapshot_json: &str, now: &str) -> Result<String, String> {
    let snapshot = parse_snapshot(snapshot_json)?;
    let now = parse_local(now)?;
    to_json(&snapshot.automation(now))
}

pub fn required_interval_for(minutes: i32, settings_json: &str) -> Result<i32, String> {
    let settings: IntervalSettings =
        serde_json::from_str(settings_json).map_err(|e| format!("Invalid settings JSON: {}", e))?;
    Ok(slot_engine::required_interval(minutes, &settings))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Conflict keys (`"{channelId}-{HH:MM}"`) as a JSON array.
#[wasm_bindgen(js_name = "detectConflicts")]
pub fn detect_conflicts(snapshot_json: &str) -> Result<String, JsValue> {
    conflicts_json(snapshot_json).map_err(|e| JsValue::from_str(&e))
}

/// Free ranges as a JSON array of `{start, end}` `HH:MM` pairs.
#[wasm_bindgen(js_name = "findFreeRanges")]
pub fn find_free_ranges(snapshot_json: &str) -> Result<String, JsValue> {
    free_ranges_json(snapshot_json).map_err(|e| JsValue::from_str(&e))
}

/// Suggested slot times as a JSON array of `{time}` objects.
#[wasm_bindgen(js_name = "suggestSlots")]
pub fn suggest_slots(snapshot_json: &str, cap: Option<u32>) -> Result<String, JsValue> {
    suggestions_json(snapshot_json, cap).map_err(|e| JsValue::from_str(&e))
}

/// Automation roles at the given local instant.
#[wasm_bindgen(js_name = "automationState")]
pub fn automation_state(snapshot_json: &str, now_local: &str) -> Result<String, JsValue> {
    automation_json(snapshot_json, now_local).map_err(|e| JsValue::from_str(&e))
}

/// Required spacing in minutes at `minutes` past midnight.
#[wasm_bindgen(js_name = "requiredInterval")]
pub fn required_interval(minutes: i32, settings_json: &str) -> Result<i32, JsValue> {
    required_interval_for(minutes, settings_json).map_err(|e| JsValue::from_str(&e))
}
