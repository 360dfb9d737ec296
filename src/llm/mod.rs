pub mod gemini;
pub mod llm_config;
pub mod offline;
pub mod provider;
pub mod service;

pub use gemini::GeminiProvider;
pub use llm_config::{LlmConfig, LlmProviderConfig};
pub use offline::OfflineProvider;
pub use provider::{GenerationError, GenerationProvider, GenerationSession, ImageAttachment};
pub use service::{build_provider, GenerationService};
