//! Server configuration from environment variables

use crate::llm::{GeminiModel, LlmConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_SESSION_IDLE_SECS: u64 = 3600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything read from the environment at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub llm: LlmConfig,
    /// Sessions untouched for this long are dropped
    pub session_idle: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; `from_env` passes the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host: IpAddr = parse_var("SQL_CHAT_BIND", get("SQL_CHAT_BIND"))?
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let port: u16 = parse_var("SQL_CHAT_PORT", get("SQL_CHAT_PORT"))?.unwrap_or(DEFAULT_PORT);
        let model: GeminiModel =
            parse_var("SQL_CHAT_MODEL", get("SQL_CHAT_MODEL"))?.unwrap_or(GeminiModel::GeminiPro);
        let timeout_secs: u64 = parse_var("SQL_CHAT_TIMEOUT_SECS", get("SQL_CHAT_TIMEOUT_SECS"))?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let max_output_tokens: Option<u32> =
            parse_var("SQL_CHAT_MAX_OUTPUT_TOKENS", get("SQL_CHAT_MAX_OUTPUT_TOKENS"))?;
        let idle_secs: u64 =
            parse_var("SQL_CHAT_SESSION_IDLE_SECS", get("SQL_CHAT_SESSION_IDLE_SECS"))?
                .unwrap_or(DEFAULT_SESSION_IDLE_SECS);

        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "SQL_CHAT_TIMEOUT_SECS",
                value: timeout_secs.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            bind: SocketAddr::new(host, port),
            llm: LlmConfig {
                model,
                gateway: get("LLM_GATEWAY"),
                timeout: Duration::from_secs(timeout_secs),
                max_output_tokens,
            },
            session_idle: Duration::from_secs(idle_secs),
        })
    }
}

fn parse_var<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value: v,
            })
        })
        .transpose()
}
