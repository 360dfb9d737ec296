//! Shared config utilities for loading/saving JSON config files
//! and resolving API keys from fields or environment variables.
//!
//! `AppConfig` is the single file the binary reads at startup.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::llm::llm_config::LlmConfig;
use crate::notifications::NotificationTimings;

const APP_DIR: &str = "serpent-bravo";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ── App Config ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Upper bound for a single generation call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            notifications: NotificationConfig::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// `<data dir>/serpent-bravo/config.json`, or `./serpent-bravo/config.json`
    /// when the platform has no data dir.
    pub fn default_path() -> PathBuf {
        dirs_next::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    pub fn load(path: &Path) -> Self {
        load_json_config(path, "Config")
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        save_json_config(path, self, "Config")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_fade_after_ms")]
    pub fade_after_ms: u64,
    #[serde(default = "default_remove_after_fade_ms")]
    pub remove_after_fade_ms: u64,
}

fn default_fade_after_ms() -> u64 {
    4000
}

fn default_remove_after_fade_ms() -> u64 {
    500
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            fade_after_ms: default_fade_after_ms(),
            remove_after_fade_ms: default_remove_after_fade_ms(),
        }
    }
}

impl NotificationConfig {
    pub fn timings(&self) -> NotificationTimings {
        NotificationTimings {
            fade_after: Duration::from_millis(self.fade_after_ms),
            remove_after_fade: Duration::from_millis(self.remove_after_fade_ms),
        }
    }
}

// ── Generic helpers ────────────────────────────────────────

/// Generic load for any Serde config type with a `Default` implementation.
/// Falls back to `T::default()` if the file is missing or unparsable.
pub fn load_json_config<T: DeserializeOwned + Default>(path: &Path, label: &str) -> T {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<T>(&content) {
            Ok(config) => {
                tracing::info!("[{}] Loaded config from {}", label, path.display());
                config
            }
            Err(e) => {
                tracing::warn!(
                    "[{}] Failed to parse config {}: {}, using defaults",
                    label,
                    path.display(),
                    e
                );
                T::default()
            }
        },
        Err(_) => {
            tracing::info!(
                "[{}] No config file at {}, using defaults",
                label,
                path.display()
            );
            T::default()
        }
    }
}

/// Generic save for any Serde config type. Parent directories are created.
pub fn save_json_config<T: Serialize>(
    path: &Path,
    config: &T,
    label: &str,
) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("[{}] Saved config to {}", label, path.display());
    Ok(())
}

/// Resolve an API key: check the direct `api_key` field first,
/// then fall back to reading the environment variable named in `api_key_env`.
pub fn resolve_api_key(api_key: &Option<String>, api_key_env: &Option<String>) -> Option<String> {
    if let Some(key) = api_key.as_deref().filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }
    api_key_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok())
        .filter(|key| !key.is_empty())
}
