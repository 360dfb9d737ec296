//! Generation service: owns the active provider and the conversation session slot.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::llm::gemini::GeminiProvider;
use crate::llm::llm_config::{LlmConfig, LlmProviderConfig};
use crate::llm::offline::OfflineProvider;
use crate::llm::provider::{GenerationError, GenerationProvider, GenerationSession, ImageAttachment};

/// Holds at most one open session. The session is opened lazily on the first
/// call and discarded when the service reports it as invalid, so the next
/// call starts a fresh conversation.
pub struct GenerationService {
    provider: Arc<dyn GenerationProvider>,
    system_instruction: String,
    session: Mutex<Option<Box<dyn GenerationSession>>>,
}

impl GenerationService {
    pub fn new(provider: Arc<dyn GenerationProvider>, system_instruction: impl Into<String>) -> Self {
        Self {
            provider,
            system_instruction: system_instruction.into(),
            session: Mutex::new(None),
        }
    }

    pub fn provider_id(&self) -> &str {
        self.provider.id()
    }

    pub async fn generate(
        &self,
        text: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<String, GenerationError> {
        let mut slot = self.session.lock().await;
        let session = slot.get_or_insert_with(|| {
            tracing::info!("[LLM] Opening new {} session", self.provider.id());
            self.provider.open_session(&self.system_instruction)
        });

        let result = session.send(text, image).await;
        if let Err(e) = &result {
            if e.is_invalid_session() {
                tracing::warn!("[LLM] Session invalidated ({}), resetting", e);
                *slot = None;
            }
        }
        result
    }

    /// Drop the current session; the next call opens a fresh one.
    pub async fn reset(&self) {
        *self.session.lock().await = None;
    }

    pub async fn has_session(&self) -> bool {
        self.session.lock().await.is_some()
    }
}

/// Factory: build the provider named by the config. A Gemini entry without a
/// usable API key degrades to the offline knowledge base.
pub fn build_provider(config: &LlmConfig) -> Arc<dyn GenerationProvider> {
    match config.active() {
        Some(cfg) => build_from_provider_config(cfg),
        None => {
            tracing::warn!("[LLM] No enabled provider configured, falling back to offline answers");
            Arc::new(OfflineProvider)
        }
    }
}

fn build_from_provider_config(cfg: &LlmProviderConfig) -> Arc<dyn GenerationProvider> {
    match cfg.provider_type.as_str() {
        "offline" => {
            tracing::info!("[LLM] Initializing offline provider");
            Arc::new(OfflineProvider)
        }
        "gemini" => match GeminiProvider::from_config(cfg) {
            Ok(provider) => {
                tracing::info!("[LLM] Initializing Gemini provider: model={}", provider.model());
                Arc::new(provider)
            }
            Err(e) => {
                tracing::warn!("[LLM] {}; falling back to offline answers", e);
                Arc::new(OfflineProvider)
            }
        },
        other => {
            tracing::warn!("[LLM] Unknown provider type '{}', falling back to offline answers", other);
            Arc::new(OfflineProvider)
        }
    }
}
