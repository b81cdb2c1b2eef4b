//! Focus Transport Abstraction
//!
//! The seam between the focus synchronizer and the network. The service
//! only ever submits a batch and reads back loosely-typed JSON, so the
//! trait stays narrow and tests swap in a recording mock.

use async_trait::async_trait;
use serde_json::Value;

use crate::focus::error::FocusResult;
use crate::focus::types::FocusBatchRequest;

/// Credentials for the remote web session.
///
/// Acquisition (QR / password login) is outside this service; callers hand
/// the tokens in with each request.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    /// Session cookie value (`t`)
    pub auth_token: String,
    /// CSRF cookie and `X-Csrftoken` header value
    pub csrf_token: String,
}

impl AuthTokens {
    pub fn new(auth_token: impl Into<String>, csrf_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            csrf_token: csrf_token.into(),
        }
    }
}

/// Transport for focus batch submissions
#[async_trait]
pub trait FocusTransport: Send + Sync {
    /// Submit one batch to the remote operation log and return the parsed
    /// reply body. Network and decode failures surface as
    /// [`FocusError::Transport`](crate::focus::error::FocusError); the
    /// reply itself is returned verbatim even when it carries an `error`
    /// key, which downstream ingest treats as "no state available".
    async fn submit(&self, auth: &AuthTokens, payload: &FocusBatchRequest) -> FocusResult<Value>;
}
