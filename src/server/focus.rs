//! Focus Verb Endpoints
//!
//! Thin handlers over [`FocusSyncService`]: validate the query options,
//! require an auth session, delegate, and hand the raw upstream body (or
//! the stable error shape) back to the caller.

use axum::extract::{Path, Query, State};
use axum::Json;
use log::{debug, info};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::focus::types::{ControlOptions, StartOptions, StopOptions, MAX_NOTE_LEN};

use super::{error_body, require_session, respond, AppState};

fn validate_note(note: Option<&str>) -> Result<(), Json<Value>> {
    match note {
        Some(note) if note.chars().count() > MAX_NOTE_LEN => Err(error_body(
            "invalid_note",
            format!("note exceeds {} characters", MAX_NOTE_LEN),
        )),
        _ => Ok(()),
    }
}

fn validate_point(point: Option<i64>) -> Result<(), Json<Value>> {
    match point {
        Some(point) if point < 0 => Err(error_body(
            "invalid_point",
            "lastPoint must be a non-negative integer",
        )),
        _ => Ok(()),
    }
}

pub async fn start_focus(
    State(state): State<AppState>,
    Query(options): Query<StartOptions>,
) -> Json<Value> {
    info!(
        "focus start requested: duration={} autoPomoLeft={} pomoCount={}",
        options.duration, options.auto_pomo_left, options.pomo_count
    );
    if let Err(body) = validate_note(Some(&options.note)) {
        return body;
    }
    if let Err(body) = validate_point(options.last_point) {
        return body;
    }
    if options.duration < 1 || options.duration > 360 {
        return error_body("invalid_duration", "duration must be between 1 and 360 minutes");
    }

    let auth = match require_session(&state) {
        Ok(auth) => auth,
        Err(body) => return body,
    };
    respond(state.focus.start(&auth, options).await)
}

fn validate_control(options: &ControlOptions) -> Result<(), Json<Value>> {
    validate_note(options.note.as_deref())?;
    validate_point(options.last_point)
}

pub async fn pause_focus(
    State(state): State<AppState>,
    Query(options): Query<ControlOptions>,
) -> Json<Value> {
    info!("focus pause requested");
    if let Err(body) = validate_control(&options) {
        return body;
    }

    let auth = match require_session(&state) {
        Ok(auth) => auth,
        Err(body) => return body,
    };
    respond(state.focus.pause(&auth, options).await)
}

pub async fn continue_focus(
    State(state): State<AppState>,
    Query(options): Query<ControlOptions>,
) -> Json<Value> {
    info!("focus continue requested");
    if let Err(body) = validate_control(&options) {
        return body;
    }

    let auth = match require_session(&state) {
        Ok(auth) => auth,
        Err(body) => return body,
    };
    respond(state.focus.resume(&auth, options).await)
}

pub async fn finish_focus(
    State(state): State<AppState>,
    Query(options): Query<ControlOptions>,
) -> Json<Value> {
    info!("focus finish requested");
    if let Err(body) = validate_control(&options) {
        return body;
    }

    let auth = match require_session(&state) {
        Ok(auth) => auth,
        Err(body) => return body,
    };
    respond(state.focus.finish(&auth, options).await)
}

pub async fn stop_focus(
    State(state): State<AppState>,
    Query(options): Query<StopOptions>,
) -> Json<Value> {
    info!("focus stop requested, includeExit={}", options.include_exit);
    if let Err(body) = validate_note(options.note.as_deref()) {
        return body;
    }
    if let Err(body) = validate_point(options.last_point) {
        return body;
    }

    let auth = match require_session(&state) {
        Ok(auth) => auth,
        Err(body) => return body,
    };
    respond(state.focus.stop(&auth, options).await)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentParams {
    pub last_point: Option<i64>,
}

/// State-only sync against the remote; submits no operations.
pub async fn current_focus(
    State(state): State<AppState>,
    Query(params): Query<CurrentParams>,
) -> Json<Value> {
    debug!("focus current requested, lastPoint={:?}", params.last_point);
    if let Err(body) = validate_point(params.last_point) {
        return body;
    }

    let auth = match require_session(&state) {
        Ok(auth) => auth,
        Err(body) => return body,
    };
    respond(state.focus.query(&auth, params.last_point).await)
}

/// Local mirror snapshot, for inspecting lastPoint / firstFocusId without
/// touching the remote.
pub async fn local_state(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.focus.store().snapshot();
    Json(json!({
        "lastPoint": snapshot.last_point,
        "focusId": snapshot.focus_id,
        "firstFocusId": snapshot.first_focus_id,
        "duration": snapshot.duration,
        "autoPomoLeft": snapshot.auto_pomo_left,
        "pomoCount": snapshot.pomo_count,
        "manual": snapshot.manual,
        "note": snapshot.note,
        "focusOnId": snapshot.focus_on_id,
        "focusOnType": snapshot.focus_on_type,
        "focusOnTitle": snapshot.focus_on_title,
        "status": snapshot.status,
        "rawCurrent": snapshot.raw_current,
    }))
}

/// Manually override the cached sync pointer.
pub async fn set_point(State(state): State<AppState>, Path(point): Path<i64>) -> Json<Value> {
    if point < 0 {
        return error_body("invalid_point", "point must be a non-negative integer");
    }

    state.focus.store().set_point(point);
    info!("focus sync pointer overridden: {}", point);
    Json(json!({"lastPoint": point}))
}

/// Drop the cached session record, keeping only the pointer.
pub async fn reset_state(State(state): State<AppState>) -> Json<Value> {
    state.focus.store().reset(true);
    info!("local focus state reset");
    Json(json!({"message": "focus_state_reset"}))
}
