//! Server configuration read from the environment

use std::time::Duration;

use crate::interview::AgentConfig;
use crate::openai::DEFAULT_BASE_URL;
use crate::security::rate_limit::MAX_CAPACITY;

/// Default listen address (the web UI expects port 8000)
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Error raised while reading configuration
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// A required variable is unset or empty
    Missing(&'static str),
    /// A variable is set but cannot be parsed
    Invalid { key: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "Missing required environment variable {}", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "Invalid value for {}: '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything the server binary needs to start
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Provider API key (`OPENAI_API_KEY`)
    pub api_key: String,
    /// Provider API root (`OPENAI_BASE_URL`)
    pub base_url: String,
    /// Listen address (`INTERVIEWER_BIND`)
    pub bind: String,
    /// Agent tuning (`INTERVIEWER_MODEL`, `INTERVIEWER_TEMPERATURE`,
    /// `INTERVIEWER_POLL_INTERVAL_MS`, `INTERVIEWER_MAX_RUN_WAIT_SECS`)
    pub agent: AgentConfig,
    /// Burst size for provider-backed endpoints (`INTERVIEWER_RATE_LIMIT_BURST`)
    pub rate_limit_burst: u64,
    /// Sustained requests/sec (`INTERVIEWER_RATE_LIMIT_PER_SEC`)
    pub rate_limit_per_sec: f64,
    /// OTLP collector endpoint (`OTEL_EXPORTER_OTLP_ENDPOINT`); export is off when unset
    pub otlp_endpoint: Option<String>,
}

impl ServerConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        let mut agent = AgentConfig::default();
        if let Some(model) = get("INTERVIEWER_MODEL") {
            agent.model = model;
        }
        if let Some(t) = parse(&get, "INTERVIEWER_TEMPERATURE")? {
            agent.temperature = t;
        }
        if let Some(ms) = parse_checked::<u64>(&get, "INTERVIEWER_POLL_INTERVAL_MS", |ms| *ms > 0)? {
            agent.poll_interval = Duration::from_millis(ms);
        }
        agent.max_run_wait =
            parse::<u64>(&get, "INTERVIEWER_MAX_RUN_WAIT_SECS")?.map(Duration::from_secs);

        Ok(Self {
            api_key,
            base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            bind: get("INTERVIEWER_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            agent,
            rate_limit_burst: parse_checked(&get, "INTERVIEWER_RATE_LIMIT_BURST", |b: &u64| {
                (1..=MAX_CAPACITY).contains(b)
            })?
            .unwrap_or(20),
            rate_limit_per_sec: parse_checked(&get, "INTERVIEWER_RATE_LIMIT_PER_SEC", |r: &f64| {
                r.is_finite() && *r > 0.0
            })?
            .unwrap_or(2.0),
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

fn parse<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match get(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

/// Like `parse`, but also rejects values failing `valid`
fn parse_checked<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    valid: impl Fn(&T) -> bool,
) -> Result<Option<T>, ConfigError> {
    match parse::<T>(get, key)? {
        Some(value) if !valid(&value) => Err(ConfigError::Invalid {
            key,
            value: get(key).unwrap_or_default(),
        }),
        parsed => Ok(parsed),
    }
}
