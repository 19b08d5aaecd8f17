//! Server configuration.
//!
//! Values come from built-in defaults, then an optional JSON file, then
//! command-line overrides. The result is validated once at startup and never
//! changes afterwards.

use std::{path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use crate::infrastructure::predictor::PredictorKind;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("outbound_capacity must be at least 1")]
    ZeroCapacity,

    #[error("{0} must be greater than 0")]
    ZeroTimeout(&'static str),
}

/// Process-wide configuration.
///
/// ```json
/// {"port": 8080, "ai_model_index": "sentiment", "outbound_capacity": 64}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(alias = "ai_model_index")]
    pub predictor: PredictorKind,
    /// Frames a connection may have queued before it is treated as too slow.
    pub outbound_capacity: usize,
    pub write_timeout_ms: u64,
    pub predict_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            predictor: PredictorKind::default(),
            outbound_capacity: 64,
            write_timeout_ms: 5_000,
            predict_timeout_ms: 3_000,
        }
    }
}

/// Values given on the command line; `None` keeps the file/default value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub predictor: Option<PredictorKind>,
}

impl ServerConfig {
    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Defaults, then the file at `path` (if any), then `overrides`; validated.
    pub fn resolve(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(host) = overrides.host {
            config.host = host;
        }
        if let Some(port) = overrides.port {
            config.port = port;
        }
        if let Some(predictor) = overrides.predictor {
            config.predictor = predictor;
        }

        config.validate()
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.outbound_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.write_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("write_timeout_ms"));
        }
        if self.predict_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("predict_timeout_ms"));
        }
        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn predict_timeout(&self) -> Duration {
        Duration::from_millis(self.predict_timeout_ms)
    }
}
