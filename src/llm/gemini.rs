//! Gemini REST backend (`models/{model}:generateContent`).
//!
//! The REST endpoint is stateless, so each session keeps its own `contents`
//! history and resends it with every turn. History only grows after a
//! successful reply, which keeps a failed or cancelled turn from leaving a
//! dangling user entry behind.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::llm_config::{LlmProviderConfig, GEMINI_BASE_URL, GEMINI_DEFAULT_MODEL};
use super::provider::{GenerationError, GenerationProvider, GenerationSession, ImageAttachment};
use crate::utils::http::{request_with_retry, RetryPolicy};

// ── Wire types ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        default,
        rename = "inline_data",
        alias = "inlineData",
        skip_serializing_if = "Option::is_none"
    )]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineData {
    #[serde(rename = "mime_type", alias = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    system_instruction: &'a Content,
    contents: &'a [Content],
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

// ── Provider ───────────────────────────────────────────────

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
    provider_id: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| GEMINI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| GEMINI_DEFAULT_MODEL.to_string()),
            retry: RetryPolicy::default(),
            provider_id: "gemini".to_string(),
        }
    }

    /// Build from a provider entry. Fails when no API key can be resolved.
    pub fn from_config(cfg: &LlmProviderConfig) -> Result<Self, GenerationError> {
        let api_key = cfg.resolve_api_key().ok_or_else(|| {
            GenerationError::Config(format!(
                "no API key for provider '{}' (set api_key or {})",
                cfg.id,
                cfg.api_key_env.as_deref().unwrap_or("api_key_env")
            ))
        })?;
        Ok(Self::new(api_key, cfg.base_url.clone(), cfg.model.clone())
            .with_id(cfg.id.clone())
            .with_retry(RetryPolicy::default().with_max_retries(cfg.max_retries)))
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.provider_id = id;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl GenerationProvider for GeminiProvider {
    fn id(&self) -> &str {
        &self.provider_id
    }

    fn open_session(&self, system_instruction: &str) -> Box<dyn GenerationSession> {
        tracing::debug!("[Gemini] Opening session on model {}", self.model);
        Box::new(GeminiSession {
            client: self.client.clone(),
            url: format!("{}/models/{}:generateContent", self.base_url, self.model),
            api_key: self.api_key.clone(),
            retry: self.retry,
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some(system_instruction.to_string()),
                    inline_data: None,
                }],
            },
            history: Vec::new(),
        })
    }
}

// ── Session ────────────────────────────────────────────────

pub struct GeminiSession {
    client: Client,
    url: String,
    api_key: String,
    retry: RetryPolicy,
    system_instruction: Content,
    history: Vec<Content>,
}

impl GeminiSession {
    pub fn history(&self) -> &[Content] {
        &self.history
    }
}

fn user_content(text: &str, image: Option<&ImageAttachment>) -> Content {
    let mut parts = Vec::with_capacity(2);
    if !text.trim().is_empty() {
        parts.push(Part {
            text: Some(text.to_string()),
            inline_data: None,
        });
    }
    if let Some(image) = image {
        parts.push(Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type().to_string(),
                data: image.to_base64(),
            }),
        });
    }
    Content {
        role: Some("user".to_string()),
        parts,
    }
}

/// Pull `error.message` out of a Gemini error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl GenerationSession for GeminiSession {
    async fn send(
        &mut self,
        text: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<String, GenerationError> {
        let turn = user_content(text, image);
        let mut contents = self.history.clone();
        contents.push(turn.clone());

        let body = serde_json::to_value(GenerateContentRequest {
            system_instruction: &self.system_instruction,
            contents: &contents,
        })?;

        let client = self.client.clone();
        let url = self.url.clone();
        let api_key = self.api_key.clone();

        let response = request_with_retry(
            move || {
                let client = client.clone();
                let url = url.clone();
                let body = body.clone();
                let api_key = api_key.clone();
                async move {
                    client
                        .post(&url)
                        .header("x-goog-api-key", api_key)
                        .header("Content-Type", "application/json")
                        .json(&body)
                        .send()
                        .await
                }
            },
            self.retry,
        )
        .await
        .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = error_message(&error_text);
            tracing::warn!("[Gemini] API error {}: {}", status, message);
            return Err(GenerationError::from_service(status.as_u16(), message));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Api {
                status: status.as_u16(),
                message: format!("failed to parse response: {}", e),
            })?;

        let reply = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or(GenerationError::EmptyResponse)?;
        let reply_text = reply.text();
        if reply_text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        self.history.push(turn);
        self.history.push(Content {
            role: Some("model".to_string()),
            parts: reply.parts,
        });
        Ok(reply_text)
    }
}
