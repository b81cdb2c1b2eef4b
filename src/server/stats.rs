//! Focus Statistics Pass-Throughs
//!
//! Stateless proxies for upstream statistics endpoints; the body goes back
//! to the caller untouched. The only local work is parameter validation.

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::remote::time_to_millis;

use super::{error_body, require_session, respond, AppState};

/// Date range in the upstream's `YYYYMMDD` path format
#[derive(Debug, Deserialize)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl DateRange {
    fn validate(&self) -> Result<(), Json<Value>> {
        for date in [&self.start_date, &self.end_date] {
            if NaiveDate::parse_from_str(date, "%Y%m%d").is_err() {
                return Err(error_body(
                    "invalid_date_format",
                    "dates must use the YYYYMMDD format",
                ));
            }
        }
        Ok(())
    }
}

pub async fn general(State(state): State<AppState>) -> Json<Value> {
    let auth = match require_session(&state) {
        Ok(auth) => auth,
        Err(body) => return body,
    };
    respond(state.client.general_for_desktop(&auth).await)
}

pub async fn distribution(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Json<Value> {
    if let Err(body) = range.validate() {
        return body;
    }
    let auth = match require_session(&state) {
        Ok(auth) => auth,
        Err(body) => return body,
    };
    respond(
        state
            .client
            .focus_distribution(&auth, &range.start_date, &range.end_date)
            .await,
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TimelineParams {
    /// Start time of the previous page's last record, e.g.
    /// `2025-04-22T08:43:31.000+0000`; omitted for the first page.
    pub to: Option<String>,
}

pub async fn timeline(
    State(state): State<AppState>,
    Query(params): Query<TimelineParams>,
) -> Json<Value> {
    let to_millis = match params.to.as_deref() {
        Some(to) => match time_to_millis(to) {
            Ok(millis) => Some(millis),
            Err(err) => return error_body("invalid_time_format", err.to_string()),
        },
        None => None,
    };

    let auth = match require_session(&state) {
        Ok(auth) => auth,
        Err(body) => return body,
    };
    respond(state.client.focus_timeline(&auth, to_millis).await)
}

pub async fn heatmap(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Json<Value> {
    if let Err(body) = range.validate() {
        return body;
    }
    let auth = match require_session(&state) {
        Ok(auth) => auth,
        Err(body) => return body,
    };
    respond(
        state
            .client
            .focus_heatmap(&auth, &range.start_date, &range.end_date)
            .await,
    )
}

pub async fn time_distribution(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Json<Value> {
    if let Err(body) = range.validate() {
        return body;
    }
    let auth = match require_session(&state) {
        Ok(auth) => auth,
        Err(body) => return body,
    };
    respond(
        state
            .client
            .focus_time_distribution(&auth, &range.start_date, &range.end_date)
            .await,
    )
}

pub async fn hour_distribution(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Json<Value> {
    if let Err(body) = range.validate() {
        return body;
    }
    let auth = match require_session(&state) {
        Ok(auth) => auth,
        Err(body) => return body,
    };
    respond(
        state
            .client
            .focus_hour_distribution(&auth, &range.start_date, &range.end_date)
            .await,
    )
}
