/// Process configuration.
///
/// Bind address and CORS origin are read from the environment at startup;
/// WebSocket heartbeat parameters are constants.
use std::env;
use std::time::Duration;

use thiserror::Error;

/// Default HTTP port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3001;

/// Default bind host when `HOST` is unset.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// How often a session pings its client.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// A client silent for this long is treated as disconnected.
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT value '{0}'")]
    InvalidPort(String),
    #[error("HOST must not be empty")]
    EmptyHost,
}

/// Settings for the HTTP/WebSocket listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Value of the `Access-Control-Allow-Origin` header.
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origin: "*".to_string(),
        }
    }
}

impl ServerConfig {
    /// Build the configuration from `HOST`, `PORT` and `CORS_ORIGIN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(host) = lookup("HOST") {
            if host.trim().is_empty() {
                return Err(ConfigError::EmptyHost);
            }
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(origin) = lookup("CORS_ORIGIN") {
            if !origin.is_empty() {
                config.cors_origin = origin;
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 3001);
    }

    #[test]
    fn test_reads_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("CORS_ORIGIN", "http://localhost:3000"),
        ]))
        .unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origin, "http://localhost:3000");
    }

    #[test]
    fn test_rejects_bad_port() {
        let err = ServerConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPort("eighty".to_string()));
    }

    #[test]
    fn test_rejects_blank_host() {
        let err = ServerConfig::from_lookup(lookup_from(&[("HOST", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::EmptyHost);
    }
}
