//! Configuration
//!
//! TOML file with serde defaults; every field is optional and CLI flags
//! override the file. Defaults mirror the desktop web client closely enough
//! that the upstream accepts the traffic without a real browser.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::remote::urls;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub request: RequestConfig,
    pub remote: RemoteConfig,
}

/// Local bind address for the proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Outbound request shaping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Value for the `X-Tz` header
    pub timezone: String,
    /// JSON blob for the `X-Device` header
    pub device_info: String,
    /// Value for the `Hl` header
    pub language: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timezone: "Asia/Shanghai".to_string(),
            device_info: "{}".to_string(),
            language: "zh_CN".to_string(),
        }
    }
}

/// Upstream hosts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub api_base: String,
    pub ms_base: String,
    pub web_origin: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: urls::DEFAULT_API_BASE.to_string(),
            ms_base: urls::DEFAULT_MS_BASE.to_string(),
            web_origin: urls::DEFAULT_WEB_ORIGIN.to_string(),
        }
    }
}

impl Config {
    /// Load from a TOML file, or fall back to defaults when no path is
    /// given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.request.timeout_secs, 30);
        assert_eq!(config.request.timezone, "Asia/Shanghai");
        assert_eq!(config.remote.ms_base, "https://ms.dida365.com");
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [request]
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.request.timeout_secs, 5);
        assert_eq!(config.request.language, "zh_CN");
    }
}
