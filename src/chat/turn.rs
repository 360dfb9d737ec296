//! Turn orchestration: user message → generation call → parse → store update → AI message.
//!
//! One turn may be in flight at a time. The guard is a flag, not a queue:
//! a submit while another turn is sending is rejected, never buffered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use super::message::Message;
use super::prompts::{ITEM_FOOTPRINT_SUGGESTION, SYSTEM_INSTRUCTION};
use super::reducer::{reduce, ChatAction, ChatEffect, ChatState};
use crate::directives;
use crate::gamification::{current_rank, RankTier};
use crate::llm::{GenerationError, GenerationProvider, GenerationService, ImageAttachment};
use crate::notifications::{ActiveNotification, NotificationQueue, NotificationTimings};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("nothing to send: text is blank and no image is staged")]
    Empty,
    #[error("a turn is already in flight")]
    Busy,
}

#[derive(Debug)]
pub enum TurnOutcome {
    /// The service answered; `notification_ids` are the queue entries it produced.
    Replied {
        reply: Message,
        notification_ids: Vec<String>,
    },
    /// The item suggestion was answered locally.
    Shortcut { reply: Message },
    /// The fallback message was appended.
    Failed {
        reply: Message,
        error: GenerationError,
    },
}

impl TurnOutcome {
    pub fn reply(&self) -> &Message {
        match self {
            TurnOutcome::Replied { reply, .. }
            | TurnOutcome::Shortcut { reply }
            | TurnOutcome::Failed { reply, .. } => reply,
        }
    }
}

/// What the rendering layer needs to draw one frame.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSnapshot {
    pub messages: Vec<Message>,
    pub points: u32,
    pub rank: &'static RankTier,
    pub unlocked_badges: Vec<String>,
    pub suggestions: Vec<String>,
    pub error: Option<String>,
    pub is_sending: bool,
}

// ── Sending guard ──────────────────────────────────────────

/// Claims the sending flag; releases it on drop, whichever way the turn ends.
struct SendingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SendingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ── Session ────────────────────────────────────────────────

pub struct ChatSession {
    generation: GenerationService,
    state: Mutex<ChatState>,
    staged_image: Mutex<Option<ImageAttachment>>,
    sending: AtomicBool,
    notifications: NotificationQueue,
    request_timeout: Duration,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            generation: GenerationService::new(provider, SYSTEM_INSTRUCTION),
            state: Mutex::new(ChatState::default()),
            staged_image: Mutex::new(None),
            sending: AtomicBool::new(false),
            notifications: NotificationQueue::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_notification_timings(mut self, timings: NotificationTimings) -> Self {
        self.notifications = NotificationQueue::new(timings);
        self
    }

    pub fn provider_id(&self) -> &str {
        self.generation.provider_id()
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Stage a photo for the next turn, replacing any previous one.
    pub fn stage_image(&self, image: ImageAttachment) {
        *lock(&self.staged_image) = Some(image);
    }

    pub fn clear_staged_image(&self) -> Option<ImageAttachment> {
        lock(&self.staged_image).take()
    }

    pub fn has_staged_image(&self) -> bool {
        lock(&self.staged_image).is_some()
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        let state = lock(&self.state);
        ChatSnapshot {
            messages: state.messages.clone(),
            points: state.gamification.points(),
            rank: current_rank(&state.gamification),
            unlocked_badges: state.gamification.unlocked_badge_ids().to_vec(),
            suggestions: state.suggestions.clone(),
            error: state.error.clone(),
            is_sending: self.is_sending(),
        }
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub async fn active_notifications(&self) -> Vec<ActiveNotification> {
        self.notifications.active().await
    }

    pub async fn dismiss_notification(&self, id: &str) -> bool {
        self.notifications.dismiss(id).await
    }

    /// Start a fresh conversation with the generation service. The visible
    /// log and progress are kept.
    pub async fn reset_conversation(&self) {
        self.generation.reset().await;
    }

    pub async fn submit_turn(&self, text: &str) -> Result<TurnOutcome, SubmitError> {
        let blank = text.trim().is_empty();
        if blank && !self.has_staged_image() {
            return Err(SubmitError::Empty);
        }
        let Some(_guard) = SendingGuard::acquire(&self.sending) else {
            tracing::debug!("[Chat] Rejected submit while a turn is in flight");
            return Err(SubmitError::Busy);
        };

        let image = self.claim_image(blank)?;

        if text == ITEM_FOOTPRINT_SUGGESTION && image.is_none() {
            let reply = self.dispatch(ChatAction::ShortcutReplied).await;
            return Ok(TurnOutcome::Shortcut { reply });
        }

        self.dispatch(ChatAction::UserMessageAppended {
            text: text.to_string(),
            image: image.clone(),
        })
        .await;

        tracing::info!(
            "[Chat] Sending turn via {} ({} chars, image: {})",
            self.provider_id(),
            text.len(),
            image.is_some()
        );
        let result = match tokio::time::timeout(
            self.request_timeout,
            self.generation.generate(text, image.as_ref()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.request_timeout)),
        };

        match result {
            Ok(raw) => {
                let unlocked = lock(&self.state).gamification.unlocked_badge_ids().to_vec();
                let parsed = directives::parse(&raw, &unlocked);
                tracing::debug!("[Chat] Parsed {} directive(s)", parsed.directives.len());

                let (reply, effects) = self.apply(ChatAction::DirectiveParsed(parsed));
                let notification_ids = self.run_effects(effects).await;
                Ok(TurnOutcome::Replied {
                    reply,
                    notification_ids,
                })
            }
            Err(error) => {
                let reply = self
                    .dispatch(ChatAction::GenerationFailed {
                        reason: error.to_string(),
                    })
                    .await;
                Ok(TurnOutcome::Failed { reply, error })
            }
        }
    }

    /// Take the staged image for this turn. The emptiness check runs on what
    /// was taken, since the slot may have been cleared since the caller looked.
    fn claim_image(&self, blank: bool) -> Result<Option<ImageAttachment>, SubmitError> {
        let image = self.clear_staged_image();
        if blank && image.is_none() {
            tracing::debug!("[Chat] Staged image cleared before the turn started");
            return Err(SubmitError::Empty);
        }
        Ok(image)
    }

    /// Reduce under the state lock and return the newest message with the effects.
    fn apply(&self, action: ChatAction) -> (Message, Vec<ChatEffect>) {
        let mut state = lock(&self.state);
        let effects = reduce(&mut state, action);
        let newest = state
            .messages
            .last()
            .cloned()
            .unwrap_or_else(|| Message::ai(String::new()));
        (newest, effects)
    }

    async fn dispatch(&self, action: ChatAction) -> Message {
        let (message, effects) = self.apply(action);
        self.run_effects(effects).await;
        message
    }

    async fn run_effects(&self, effects: Vec<ChatEffect>) -> Vec<String> {
        let mut ids = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                ChatEffect::Notify(request) => {
                    tracing::info!("[Chat] {}", request.message);
                    ids.push(self.notifications.push(request).await);
                }
            }
        }
        ids
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::OfflineProvider;

    fn png() -> ImageAttachment {
        ImageAttachment::new(vec![0x89, b'P', b'N', b'G'], "image/png")
    }

    #[test]
    fn blank_turn_whose_image_vanished_is_rejected_without_mutation() {
        let session = ChatSession::new(Arc::new(OfflineProvider));
        let before = session.snapshot().messages.len();

        assert_eq!(session.claim_image(true).unwrap_err(), SubmitError::Empty);
        assert_eq!(session.snapshot().messages.len(), before);
    }

    #[test]
    fn claimed_image_leaves_the_slot_empty() {
        let session = ChatSession::new(Arc::new(OfflineProvider));
        session.stage_image(png());

        let image = session.claim_image(true).unwrap();
        assert_eq!(image.map(|i| i.mime_type().to_string()).as_deref(), Some("image/png"));
        assert!(!session.has_staged_image());

        // Text turns go ahead with no image.
        assert!(session.claim_image(false).unwrap().is_none());
    }
}
