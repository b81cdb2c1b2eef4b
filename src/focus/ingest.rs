//! Response Ingest
//!
//! Merges a raw reply from the focus batch endpoint back into the local
//! mirror. The endpoint is undocumented and loosely typed, so every field
//! is checked before it is copied; anything malformed is absorbed without
//! touching the store.

use log::debug;
use serde_json::Value;

use super::state::FocusStateStore;

/// Lifecycle codes that end a session on the remote side. Empirically
/// derived from observed replies, not a documented contract; best effort.
pub const TERMINAL_STATUSES: [i64; 2] = [2, 3];

/// Loose truthiness for the `exited` flag, which has been observed
/// as a bool, a number, and a string.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
    }
}

/// Apply a remote reply to the store. Takes the store lock exactly once;
/// replies that carry no usable state (including `{"error": ...}` bodies)
/// leave the mirror unchanged.
pub fn apply_response(store: &FocusStateStore, response: &Value) {
    let Some(body) = response.as_object() else {
        debug!("[ingest] non-object reply ignored");
        return;
    };

    let point = body.get("point").and_then(Value::as_i64);
    let current = body
        .get("current")
        .and_then(Value::as_object)
        .filter(|c| !c.is_empty());

    store.with_state(|state| {
        if let Some(point) = point {
            state.last_point = point;
        }

        let Some(current) = current else {
            return;
        };

        state.raw_current = Value::Object(current.clone());

        if let Some(status) = current.get("status").and_then(Value::as_i64) {
            state.status = Some(status);
        }

        if let Some(id) = current.get("id").and_then(Value::as_str) {
            if !id.is_empty() {
                state.focus_id = Some(id.to_string());
            }
        }

        // The chain id shows up under several spellings depending on the
        // client that wrote the log entry.
        let first_id = ["firstId", "firstID", "firstFocusId"].iter().find_map(|key| {
            current
                .get(*key)
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
        });
        if let Some(first_id) = first_id {
            state.first_focus_id = Some(first_id.to_string());
        }

        if let Some(duration) = current.get("duration").and_then(Value::as_i64) {
            state.duration = duration;
        }
        if let Some(left) = current.get("autoPomoLeft").and_then(Value::as_i64) {
            state.auto_pomo_left = left;
        }
        if let Some(count) = current.get("pomoCount").and_then(Value::as_i64) {
            state.pomo_count = count;
        }
        if let Some(note) = current.get("note").and_then(Value::as_str) {
            state.note = note.to_string();
        }

        if let Some(logs) = current.get("focusOnLogs").and_then(Value::as_array) {
            if let Some(last) = logs.last() {
                state.focus_on_id = last
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string();
            }
        }

        if let Some(tasks) = current.get("focusTasks").and_then(Value::as_array) {
            if let Some(last) = tasks.last() {
                if let Some(task_type) = last.get("type") {
                    state.focus_on_type = coerce_i64(task_type);
                }
                if let Some(title) = last.get("title").and_then(Value::as_str) {
                    state.focus_on_title = Some(title.to_string());
                }
            }
        }

        let exited = current.get("exited").map(is_truthy).unwrap_or(false);
        let terminal = state
            .status
            .map(|s| TERMINAL_STATUSES.contains(&s))
            .unwrap_or(false);
        if exited || terminal {
            debug!("[ingest] session ended remotely, clearing mirror");
            state.clear_session();
        }
    });
}

/// The task `type` field arrives as a number or a numeric string;
/// anything else is discarded.
fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
