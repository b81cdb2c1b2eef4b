//! Dida365 HTTP Client
//!
//! Implements the transport seam with `reqwest`. The upstream is the
//! unmodified web API, so requests carry the desktop web client's header
//! set; anything less gets rejected or, worse, silently answered with an
//! empty state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::focus::error::{FocusError, FocusResult};
use crate::focus::types::FocusBatchRequest;

use super::transport::{AuthTokens, FocusTransport};
use super::urls;

/// HTTP client for the Dida365 v2 API and focus microservice
pub struct DidaClient {
    client: Client,
    api_base: Url,
    ms_base: Url,
    web_origin: String,
    user_agent: String,
    timezone: String,
    device_info: String,
    language: String,
}

impl DidaClient {
    pub fn new(config: &Config) -> FocusResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request.timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| FocusError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_base: Url::parse(&config.remote.api_base)?,
            ms_base: Url::parse(&config.remote.ms_base)?,
            web_origin: config.remote.web_origin.clone(),
            user_agent: config.request.user_agent.clone(),
            timezone: config.request.timezone.clone(),
            device_info: config.request.device_info.clone(),
            language: config.request.language.clone(),
        })
    }

    /// Trace ids the web client attaches to focus operations: millisecond
    /// epoch in hex plus 8 random hex chars.
    fn trace_id() -> String {
        let simple = Uuid::new_v4().simple().to_string();
        format!("{:x}{}", Utc::now().timestamp_millis(), &simple[..8])
    }

    fn cookie_header(auth: &AuthTokens) -> String {
        format!("t={}; _csrf_token={}", auth.auth_token, auth.csrf_token)
    }

    fn api_url(&self, path: &str) -> FocusResult<Url> {
        Url::parse(&format!("{}{}", self.api_base.as_str().trim_end_matches('/'), path))
            .map_err(FocusError::from)
    }

    /// Shared GET against the v2 API, returning the parsed body.
    async fn get_api(&self, auth: &AuthTokens, url: Url) -> FocusResult<Value> {
        let response = self
            .client
            .get(url.clone())
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json, text/plain, */*")
            .header("Content-Type", "application/json")
            .header("X-Requested-With", "XMLHttpRequest")
            .header("X-Tz", &self.timezone)
            .header("Cookie", Self::cookie_header(auth))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            error!("GET {} failed: HTTP {} {}", url.path(), status, text);
            return Err(FocusError::Transport(format!("HTTP {}: {}", status, text)));
        }

        response.json().await.map_err(FocusError::from)
    }

    /// Pomodoro overview (desktop variant), returned verbatim.
    pub async fn general_for_desktop(&self, auth: &AuthTokens) -> FocusResult<Value> {
        self.get_api(auth, self.api_url(urls::POMODORO_GENERAL_FOR_DESKTOP)?)
            .await
    }

    /// Focus duration distribution for a YYYYMMDD date range.
    pub async fn focus_distribution(
        &self,
        auth: &AuthTokens,
        start_date: &str,
        end_date: &str,
    ) -> FocusResult<Value> {
        let url = self.api_url(&format!(
            "{}/{}/{}",
            urls::FOCUS_DISTRIBUTION,
            start_date,
            end_date
        ))?;
        self.get_api(auth, url).await
    }

    /// Focus record timeline, paged backwards with a millisecond cutoff.
    pub async fn focus_timeline(
        &self,
        auth: &AuthTokens,
        to_millis: Option<i64>,
    ) -> FocusResult<Value> {
        let mut url = self.api_url(urls::FOCUS_TIMELINE)?;
        if let Some(to) = to_millis {
            url.query_pairs_mut().append_pair("to", &to.to_string());
        }
        self.get_api(auth, url).await
    }

    /// Focus trend heatmap for a YYYYMMDD date range.
    pub async fn focus_heatmap(
        &self,
        auth: &AuthTokens,
        start_date: &str,
        end_date: &str,
    ) -> FocusResult<Value> {
        let url = self.api_url(&format!(
            "{}/{}/{}",
            urls::FOCUS_HEATMAP,
            start_date,
            end_date
        ))?;
        self.get_api(auth, url).await
    }

    /// Per-day clock distribution for a YYYYMMDD date range.
    pub async fn focus_time_distribution(
        &self,
        auth: &AuthTokens,
        start_date: &str,
        end_date: &str,
    ) -> FocusResult<Value> {
        let url = self.api_url(&format!(
            "{}/{}/{}",
            urls::FOCUS_TIME_DISTRIBUTION,
            start_date,
            end_date
        ))?;
        self.get_api(auth, url).await
    }

    /// Per-hour clock distribution for a YYYYMMDD date range.
    pub async fn focus_hour_distribution(
        &self,
        auth: &AuthTokens,
        start_date: &str,
        end_date: &str,
    ) -> FocusResult<Value> {
        let url = self.api_url(&format!(
            "{}/{}/{}",
            urls::FOCUS_HOUR_DISTRIBUTION,
            start_date,
            end_date
        ))?;
        self.get_api(auth, url).await
    }
}

#[async_trait]
impl FocusTransport for DidaClient {
    async fn submit(&self, auth: &AuthTokens, payload: &FocusBatchRequest) -> FocusResult<Value> {
        let url = Url::parse(&format!(
            "{}{}",
            self.ms_base.as_str().trim_end_matches('/'),
            urls::FOCUS_BATCH_OPERATION
        ))?;

        debug!(
            "submitting focus batch: lastPoint={} ops={}",
            payload.last_point,
            payload.op_list.len()
        );

        let response = self
            .client
            .post(url)
            .header("Accept", "application/json, text/plain, */*")
            .header("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8,zh-TW;q=0.7")
            .header("Cache-Control", "no-cache")
            .header("Content-Type", "application/json")
            .header("Origin", &self.web_origin)
            .header("Pragma", "no-cache")
            .header("Referer", format!("{}/", self.web_origin))
            .header("Traceid", Self::trace_id())
            .header("User-Agent", &self.user_agent)
            .header("X-Csrftoken", &auth.csrf_token)
            .header("X-Device", &self.device_info)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("X-Tz", &self.timezone)
            .header("Hl", &self.language)
            .header("Cookie", Self::cookie_header(auth))
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            error!("focus batch failed: HTTP {} {}", status, text);
            return Err(FocusError::Transport(format!("HTTP {}: {}", status, text)));
        }

        response.json().await.map_err(FocusError::from)
    }
}

impl std::fmt::Debug for DidaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DidaClient")
            .field("api_base", &self.api_base)
            .field("ms_base", &self.ms_base)
            .finish()
    }
}

/// Convert a timeline timestamp like `2025-04-22T08:43:31.000+0000` to
/// millisecond epoch for the `to` paging parameter.
pub fn time_to_millis(time_str: &str) -> FocusResult<i64> {
    let normalized = time_str.replace('Z', "+0000");
    DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%z")
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| FocusError::MalformedResponse(format!("invalid time {:?}: {}", time_str, e)))
}
