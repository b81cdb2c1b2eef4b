//! Focus Error Types
//!
//! Error handling for the focus-timer synchronizer and its transport.

use thiserror::Error;

/// Focus-subsystem errors
#[derive(Error, Debug)]
pub enum FocusError {
    /// No focus session is cached locally and none could be recovered
    /// from the remote log. Non-fatal; handlers map this to a stable
    /// `no_active_focus` body without contacting the remote again.
    #[error("no active focus session")]
    NoActiveSession,

    /// The remote submission itself failed (connect, timeout, non-200,
    /// unparseable body). The store is left untouched.
    #[error("transport failure: {0}")]
    Transport(String),

    /// A reply that could not be interpreted. Absorbed at the ingest
    /// boundary; surfaces only when a caller asked for strict parsing.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for FocusError {
    fn from(err: reqwest::Error) -> Self {
        FocusError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for FocusError {
    fn from(err: serde_json::Error) -> Self {
        FocusError::MalformedResponse(err.to_string())
    }
}

impl From<url::ParseError> for FocusError {
    fn from(err: url::ParseError) -> Self {
        FocusError::InvalidConfig(format!("Invalid URL: {}", err))
    }
}

/// Result type alias for focus operations
pub type FocusResult<T> = Result<T, FocusError>;
