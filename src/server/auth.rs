//! Auth Session Endpoints
//!
//! The proxy never acquires tokens itself; callers obtain them from a web
//! login and park them here for the focus and statistics handlers.

use axum::extract::State;
use axum::Json;
use log::info;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::remote::AuthTokens;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionBody {
    pub auth_token: String,
    pub csrf_token: String,
}

pub async fn set_session(
    State(state): State<AppState>,
    Json(body): Json<SessionBody>,
) -> Json<Value> {
    if body.auth_token.is_empty() || body.csrf_token.is_empty() {
        return super::error_body("invalid_session", "auth_token and csrf_token are required");
    }

    *state.session.write() = Some(AuthTokens::new(body.auth_token, body.csrf_token));
    info!("auth session updated");
    Json(json!({"message": "session_set"}))
}

pub async fn clear_session(State(state): State<AppState>) -> Json<Value> {
    *state.session.write() = None;
    info!("auth session cleared");
    Json(json!({"message": "session_cleared"}))
}

pub async fn session_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({"hasSession": state.session.read().is_some()}))
}
