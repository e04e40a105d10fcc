//! User configuration for the Front& CLI.
//!
//! The configuration is a small YAML document stored in the standard
//! configuration directory (`~/.config/frontand/config.yaml` on most
//! platforms). `FRONTAND_CONFIG_PATH` points the loader at another file. A
//! missing file yields defaults; a malformed file is reported with a warning
//! and also yields defaults so a typo never blocks a run.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs_next::{config_dir, home_dir};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable allowing callers to override the configuration file path.
pub const CONFIG_PATH_ENV: &str = "FRONTAND_CONFIG_PATH";

/// Default filename for the YAML payload.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Upstream inference calls may run for minutes; matches the backend's own proxy timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Rows handed to the backend per concurrent batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Error surfaced when the configuration file exists but cannot be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persisted configuration values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FrontandConfig {
    /// Timeout applied to workflow requests, in seconds.
    pub request_timeout_secs: u64,
    /// Batch size sent with row-processing requests.
    pub default_batch_size: usize,
    /// Extra workflow catalog (YAML) merged over the built-in workflows.
    pub catalog_path: Option<PathBuf>,
    /// Endpoint replacements keyed by workflow id.
    pub endpoint_overrides: IndexMap<String, String>,
}

impl Default for FrontandConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            default_batch_size: DEFAULT_BATCH_SIZE,
            catalog_path: None,
            endpoint_overrides: IndexMap::new(),
        }
    }
}

impl FrontandConfig {
    /// Load from the default location (or the `FRONTAND_CONFIG_PATH` override).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file; using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        match serde_yaml::from_str::<Self>(&content) {
            Ok(mut config) => {
                config.catalog_path = config.catalog_path.map(|catalog| expand_tilde(&catalog.to_string_lossy()));
                Ok(config)
            }
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse config file; using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Endpoint for `workflow_id`, honoring overrides.
    pub fn endpoint_for<'a>(&'a self, workflow_id: &str, default_endpoint: &'a str) -> &'a str {
        self.endpoint_overrides
            .get(workflow_id)
            .map(String::as_str)
            .unwrap_or(default_endpoint)
    }
}

/// Path of the configuration file, honoring [`CONFIG_PATH_ENV`].
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("frontand")
        .join(CONFIG_FILE_NAME)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    if let Some(rest) = trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        return home().join(rest);
    }
    PathBuf::from(trimmed)
}
