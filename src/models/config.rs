use std::path::Path;

use dcp_engine::{DcpParams, EngineOptions};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::DEFAULT_FILTER;

/// Application configuration loaded from a YAML file.
///
/// Every section is optional; missing fields keep their defaults, so a
/// preset can name only the parameters it changes:
///
/// ```yaml
/// engine:
///   threads: 4
/// params:
///   omega: 0.8
///   edge_mode: smear
/// log_filter: "skyhaze=info,dcp_engine=debug"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Worker pool size and airlight sampling
    #[serde(default)]
    pub engine: EngineOptions,

    /// Initial dehazing parameters
    #[serde(default)]
    pub params: DcpParams,

    /// Tracing filter used when `RUST_LOG` is not set, installed by
    /// [`init_from_config`](crate::logging::init_from_config)
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_FILTER.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineOptions::default(),
            params: DcpParams::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.params.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load configuration from `path`, surfacing every failure.
    pub fn load_strict(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from `path`, falling back to defaults if the file
    /// is missing, unreadable or invalid.
    pub fn load(path: &Path) -> Self {
        match Self::load_strict(path) {
            Ok(config) => {
                tracing::info!(
                    path = %path.display(),
                    threads = config.engine.threads,
                    "Loaded configuration"
                );
                config
            }
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(%e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }
}
