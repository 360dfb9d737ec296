//! Generation provider traits: common interface for all text-generation backends.

use async_trait::async_trait;
use base64::Engine as _;
use std::time::Duration;
use thiserror::Error;

/// Substrings the generation service uses when a conversation handle is corrupted.
const INVALID_SESSION_MARKERS: &[&str] = &["history is not valid", "Please start a new conversation"];

// ── Errors ─────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid session: {0}")]
    InvalidSession(String),
    #[error("generation service returned no text")]
    EmptyResponse,
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("provider misconfigured: {0}")]
    Config(String),
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

impl GenerationError {
    /// Build an error from a service-reported failure, promoting it to
    /// `InvalidSession` when the message says the conversation is unusable.
    pub fn from_service(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if indicates_invalid_session(&message) {
            GenerationError::InvalidSession(message)
        } else {
            GenerationError::Api { status, message }
        }
    }

    pub fn is_invalid_session(&self) -> bool {
        match self {
            GenerationError::InvalidSession(_) => true,
            GenerationError::Network(message) | GenerationError::Api { message, .. } => {
                indicates_invalid_session(message)
            }
            _ => false,
        }
    }
}

pub fn indicates_invalid_session(message: &str) -> bool {
    INVALID_SESSION_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

// ── Image attachment ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    bytes: Vec<u8>,
    mime_type: String,
}

impl ImageAttachment {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Sniff the format from the leading bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, image::ImageError> {
        let format = image::guess_format(&bytes)?;
        Ok(Self::new(bytes, format.to_mime_type()))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

// ── Traits ─────────────────────────────────────────────────

/// A live conversation with the generation service. Holds whatever history
/// the backend needs; dropping it ends the conversation.
#[async_trait]
pub trait GenerationSession: Send {
    async fn send(
        &mut self,
        text: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<String, GenerationError>;
}

/// Factory for sessions (Gemini, offline knowledge base, test doubles).
pub trait GenerationProvider: Send + Sync {
    /// Provider identifier (e.g. "gemini", "offline").
    fn id(&self) -> &str;

    fn open_session(&self, system_instruction: &str) -> Box<dyn GenerationSession>;
}
