pub mod calculator;
pub mod chat;
pub mod config;
pub mod directives;
pub mod gamification;
pub mod llm;
pub mod notifications;
pub mod utils;

use crate::chat::ChatSession;
use crate::config::AppConfig;

/// Wire a chat session from the app config: provider, timeout, notification timings.
pub fn build_session(config: &AppConfig) -> ChatSession {
    let provider = llm::build_provider(&config.llm);
    tracing::info!(
        "[App] Session ready (provider={}, timeout={:?})",
        provider.id(),
        config.request_timeout()
    );
    ChatSession::new(provider)
        .with_request_timeout(config.request_timeout())
        .with_notification_timings(config.notifications.timings())
}
