//! Client configuration.
//!
//! Loaded from JSON (every field optional) or from `WORDGRID_*` environment
//! variables, then refined with [`ClientBuilder`](crate::ClientBuilder).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::protocol::DEFAULT_MAX_PAYLOAD_SIZE;
use crate::writer::DEFAULT_CHANNEL_CAPACITY;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 20_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout_ms: u64,
    /// `None` waits for responses indefinitely.
    pub request_timeout_ms: Option<u64>,
    /// `None` disables the background heartbeat.
    pub heartbeat_interval_ms: Option<u64>,
    pub max_payload_size: u32,
    pub writer_channel_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            request_timeout_ms: None,
            heartbeat_interval_ms: Some(DEFAULT_HEARTBEAT_INTERVAL_MS),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            writer_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Defaults overridden by `WORDGRID_HOST`, `WORDGRID_PORT`,
    /// `WORDGRID_CONNECT_TIMEOUT_MS`, `WORDGRID_REQUEST_TIMEOUT_MS` and
    /// `WORDGRID_HEARTBEAT_MS` (`0` disables the heartbeat).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("WORDGRID_HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var(&lookup, "WORDGRID_PORT")? {
            config.port = port;
        }
        if let Some(ms) = parse_var(&lookup, "WORDGRID_CONNECT_TIMEOUT_MS")? {
            config.connect_timeout_ms = ms;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "WORDGRID_REQUEST_TIMEOUT_MS")? {
            config.request_timeout_ms = (ms > 0).then_some(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "WORDGRID_HEARTBEAT_MS")? {
            config.heartbeat_interval_ms = (ms > 0).then_some(ms);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(ClientError::Config("host must not be empty".to_string()));
        }
        if self.max_payload_size == 0 {
            return Err(ClientError::Config(
                "max_payload_size must be positive".to_string(),
            ));
        }
        if self.writer_channel_capacity == 0 {
            return Err(ClientError::Config(
                "writer_channel_capacity must be positive".to_string(),
            ));
        }
        if self.heartbeat_interval_ms == Some(0) {
            return Err(ClientError::Config(
                "heartbeat_interval_ms must be positive; use null to disable".to_string(),
            ));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn heartbeat_interval(&self) -> Option<Duration> {
        self.heartbeat_interval_ms.map(Duration::from_millis)
    }

    /// `host:port` for `TcpStream::connect`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ClientError::Config(format!("{} has invalid value {:?}", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.heartbeat_interval(), Some(Duration::from_secs(20)));
        assert_eq!(config.request_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ClientConfig::from_json_str(r#"{"host": "game.local", "heartbeat_interval_ms": null}"#)
                .unwrap();
        assert_eq!(config.host, "game.local");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.heartbeat_interval_ms, None);
    }

    #[test]
    fn test_invalid_json_values() {
        assert!(matches!(
            ClientConfig::from_json_str(r#"{"port": "x"}"#),
            Err(ClientError::Json(_))
        ));
        assert!(matches!(
            ClientConfig::from_json_str(r#"{"max_payload_size": 0}"#),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("WORDGRID_HOST", "10.0.0.2"),
            ("WORDGRID_PORT", "9000"),
            ("WORDGRID_REQUEST_TIMEOUT_MS", "1500"),
            ("WORDGRID_HEARTBEAT_MS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.address(), "10.0.0.2:9000");
        assert_eq!(config.request_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.heartbeat_interval(), None);
    }

    #[test]
    fn test_env_bad_port() {
        let err = ClientConfig::from_lookup(lookup(&[("WORDGRID_PORT", "99999")])).unwrap_err();
        assert!(err.to_string().contains("WORDGRID_PORT"));
    }
}
