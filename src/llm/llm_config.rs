//! Generation provider configuration, stored under the `llm` key of the app config.

use crate::config;
use serde::{Deserialize, Serialize};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmProviderConfig {
    pub id: String,
    /// "gemini" | "offline"
    pub provider_type: String,
    #[serde(default = "default_true")]
    pub enabled: bool,

    pub api_key: Option<String>,
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,

    /// Retries for 429/5xx and network errors.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl LlmProviderConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        config::resolve_api_key(&self.api_key, &self.api_key_env)
    }
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Matched against `providers[].id`; see [`LlmConfig::active`] for the fallback.
    #[serde(default = "default_active_provider")]
    pub active_provider: String,

    #[serde(default = "default_providers")]
    pub providers: Vec<LlmProviderConfig>,
}

impl LlmConfig {
    /// The named provider if it is enabled, else the first enabled one.
    /// `None` when every provider is disabled.
    pub fn active(&self) -> Option<&LlmProviderConfig> {
        self.providers
            .iter()
            .find(|p| p.enabled && p.id == self.active_provider)
            .or_else(|| self.providers.iter().find(|p| p.enabled))
    }
}

fn default_active_provider() -> String {
    "gemini".to_string()
}

fn default_providers() -> Vec<LlmProviderConfig> {
    vec![
        LlmProviderConfig {
            id: "gemini".to_string(),
            provider_type: "gemini".to_string(),
            enabled: true,
            api_key: None,
            api_key_env: Some("GEMINI_API_KEY".to_string()),
            base_url: Some(GEMINI_BASE_URL.to_string()),
            model: Some(GEMINI_DEFAULT_MODEL.to_string()),
            max_retries: default_max_retries(),
        },
        LlmProviderConfig {
            id: "offline".to_string(),
            provider_type: "offline".to_string(),
            enabled: true,
            api_key: None,
            api_key_env: None,
            base_url: None,
            model: None,
            max_retries: 0,
        },
    ]
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            active_provider: default_active_provider(),
            providers: default_providers(),
        }
    }
}
