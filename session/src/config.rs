use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const MIN_SWEEP_INTERVAL_MS: u64 = 1000;
pub const MAX_SWEEP_INTERVAL_MS: u64 = 3000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Tunables of the match service, every field optional in the TOML file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Period of the background timeout sweep, clamped to 1-3 s.
    pub sweep_interval_ms: u64,
    /// How long finished matches stay readable before being purged. 0 keeps them forever.
    pub finished_retention_ms: u64,
    /// Largest board a client may create.
    pub max_board_cells: u32,
    /// Snapshots buffered per broadcast subscriber before it starts lagging.
    pub broadcast_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sweep_interval_ms: 1000,
            finished_retention_ms: 10 * 60 * 1000,
            max_board_cells: 10_000,
            broadcast_capacity: 256,
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Clamps the sweep interval and rejects values the service cannot run with.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let clamped = self
            .sweep_interval_ms
            .clamp(MIN_SWEEP_INTERVAL_MS, MAX_SWEEP_INTERVAL_MS);
        if clamped != self.sweep_interval_ms {
            log::warn!(
                "sweep_interval_ms {} out of range, using {}",
                self.sweep_interval_ms,
                clamped
            );
            self.sweep_interval_ms = clamped;
        }
        if self.max_board_cells == 0 {
            return Err(ConfigError::Invalid {
                field: "max_board_cells",
                reason: "must be positive",
            });
        }
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "broadcast_capacity",
                reason: "must be positive",
            });
        }
        Ok(self)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(
            self.sweep_interval_ms
                .clamp(MIN_SWEEP_INTERVAL_MS, MAX_SWEEP_INTERVAL_MS),
        )
    }

    /// `None` when purging is disabled.
    pub fn finished_retention_millis(&self) -> Option<u64> {
        (self.finished_retention_ms > 0).then_some(self.finished_retention_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(ServiceConfig::from_toml_str("").unwrap(), ServiceConfig::default());
    }

    #[test]
    fn partial_file_and_clamping() {
        let config = ServiceConfig::from_toml_str(
            "sweep_interval_ms = 10\nfinished_retention_ms = 0\n",
        )
        .unwrap();

        assert_eq!(config.sweep_interval_ms, 1000);
        assert_eq!(config.finished_retention_millis(), None);
        assert_eq!(config.max_board_cells, 10_000);

        let config = ServiceConfig::from_toml_str("sweep_interval_ms = 60000").unwrap();
        assert_eq!(config.sweep_interval(), Duration::from_secs(3));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ServiceConfig::from_toml_str("broadcast_capacity = 0"),
            Err(ConfigError::Invalid {
                field: "broadcast_capacity",
                ..
            })
        ));
        assert!(matches!(
            ServiceConfig::from_toml_str("max_board_cells = -3"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ServiceConfig::from_toml_str("sweep_every = 5"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file() {
        let err = ServiceConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
