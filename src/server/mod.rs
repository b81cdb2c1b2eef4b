//! HTTP Surface
//!
//! Axum router and shared handler plumbing. Every endpoint answers 200
//! with either the upstream's raw body or a stable `{error, message}`
//! object; failures never become bare 5xx responses.

pub mod auth;
pub mod focus;
pub mod stats;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::focus::{FocusError, FocusResult, FocusSyncService};
use crate::remote::{AuthTokens, DidaClient};

/// Shared handler state, assembled once at the composition root.
#[derive(Clone)]
pub struct AppState {
    pub focus: Arc<FocusSyncService>,
    pub client: Arc<DidaClient>,
    /// Remote web session; set through `/auth/session`, absent until then.
    pub session: Arc<RwLock<Option<AuthTokens>>>,
}

impl AppState {
    pub fn new(focus: Arc<FocusSyncService>, client: Arc<DidaClient>) -> Self {
        Self {
            focus,
            client,
            session: Arc::new(RwLock::new(None)),
        }
    }
}

/// Stable error body shape shared by every endpoint.
pub(crate) fn error_body(code: &str, message: impl Into<String>) -> Json<Value> {
    Json(json!({"error": code, "message": message.into()}))
}

/// Current session tokens, or the `no_auth_session` body.
pub(crate) fn require_session(state: &AppState) -> Result<AuthTokens, Json<Value>> {
    state.session.read().clone().ok_or_else(|| {
        error_body(
            "no_auth_session",
            "no auth session configured, set one via POST /auth/session",
        )
    })
}

/// Collapse a service result into the wire shape.
pub(crate) fn respond(result: FocusResult<Value>) -> Json<Value> {
    match result {
        Ok(body) => Json(body),
        Err(FocusError::NoActiveSession) => {
            error_body("no_active_focus", "no focus session is currently running")
        }
        Err(FocusError::Transport(message)) => error_body("transport_failure", message),
        Err(FocusError::MalformedResponse(message)) => error_body("malformed_response", message),
        Err(FocusError::InvalidConfig(message)) => error_body("invalid_config", message),
    }
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "tickrelay",
        "health": "/health",
        "api_modules": {
            "auth": "/auth/",
            "pomodoros": "/pomodoros/",
        }
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "hasSession": state.session.read().is_some(),
    }))
}

/// Build the full router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // Auth session management
        .route(
            "/auth/session",
            post(auth::set_session).delete(auth::clear_session),
        )
        .route("/auth/status", get(auth::session_status))
        // Focus verbs
        .route("/pomodoros/focus/start", get(focus::start_focus))
        .route("/pomodoros/focus/pause", get(focus::pause_focus))
        .route("/pomodoros/focus/continue", get(focus::continue_focus))
        .route("/pomodoros/focus/finish", get(focus::finish_focus))
        .route("/pomodoros/focus/stop", get(focus::stop_focus))
        .route("/pomodoros/focus/current", get(focus::current_focus))
        // Local state management
        .route("/pomodoros/focus/state", get(focus::local_state))
        .route("/pomodoros/focus/point/{point}", post(focus::set_point))
        .route("/pomodoros/focus/reset", post(focus::reset_state))
        // Statistics pass-throughs
        .route("/pomodoros/general", get(stats::general))
        .route("/pomodoros/distribution", get(stats::distribution))
        .route("/pomodoros/timeline", get(stats::timeline))
        .route("/pomodoros/heatmap", get(stats::heatmap))
        .route("/pomodoros/time-distribution", get(stats::time_distribution))
        .route("/pomodoros/hour-distribution", get(stats::hour_distribution))
        .layer(cors)
        .with_state(state)
}
