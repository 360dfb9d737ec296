//! Conversation store: one pure transition per event.
//!
//! `reduce` mutates the state it is handed and returns the side effects the
//! caller must run. Nothing here awaits, spawns, or touches the network.

use serde::Serialize;

use super::message::Message;
use super::prompts::{FALLBACK_REPLY, GREETING, INITIAL_SUGGESTIONS, ITEM_FOOTPRINT_REPLY};
use crate::directives::{ParsedResponse, DEFAULT_CHART_TITLE};
use crate::gamification::{apply_badge_award, catalog, GamificationState};
use crate::llm::ImageAttachment;
use crate::notifications::{self, NotificationRequest};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatState {
    pub messages: Vec<Message>,
    pub gamification: GamificationState,
    pub suggestions: Vec<String>,
    /// Set when the last turn failed; cleared when the next one starts.
    pub error: Option<String>,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            messages: vec![Message::ai(GREETING)],
            gamification: GamificationState::default(),
            suggestions: INITIAL_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatAction {
    /// A turn started: suggestions go away and the user's entry is logged.
    UserMessageAppended {
        text: String,
        image: Option<ImageAttachment>,
    },
    /// The generation call returned and its text was parsed.
    DirectiveParsed(ParsedResponse),
    BadgeAwarded(String),
    GenerationFailed { reason: String },
    /// The item-footprint suggestion was picked without a photo.
    ShortcutReplied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEffect {
    Notify(NotificationRequest),
}

pub fn reduce(state: &mut ChatState, action: ChatAction) -> Vec<ChatEffect> {
    match action {
        ChatAction::UserMessageAppended { text, image } => {
            state.suggestions.clear();
            state.error = None;
            state.messages.push(Message::user(text, image));
            Vec::new()
        }
        ChatAction::BadgeAwarded(badge_id) => award(state, &badge_id),
        ChatAction::DirectiveParsed(parsed) => {
            let mut effects = Vec::new();
            let mut awarded = None;
            if let Some(badge_id) = parsed.badge_award() {
                let was_unlocked = state.gamification.is_unlocked(badge_id);
                effects = award(state, badge_id);
                if !was_unlocked && state.gamification.is_unlocked(badge_id) {
                    awarded = catalog::badge(badge_id);
                }
            }

            let chart_data = parsed.chart_data().map(<[_]>::to_vec);
            let chart_title = match (parsed.chart_title(), &chart_data) {
                (Some(title), _) => Some(title.to_string()),
                (None, Some(_)) => Some(DEFAULT_CHART_TITLE.to_string()),
                (None, None) => None,
            };

            let mut message = Message::ai(parsed.cleaned_text.clone());
            message.badge = awarded;
            message.chart_title = chart_title;
            message.chart_data = chart_data;
            message.is_receipt = parsed.receipt().is_some();
            state.messages.push(message);
            effects
        }
        ChatAction::GenerationFailed { reason } => {
            tracing::warn!("[Chat] Turn failed: {}", reason);
            state.error = Some(FALLBACK_REPLY.to_string());
            state.messages.push(Message::ai(FALLBACK_REPLY));
            Vec::new()
        }
        ChatAction::ShortcutReplied => {
            state.messages.push(Message::ai(ITEM_FOOTPRINT_REPLY));
            Vec::new()
        }
    }
}

fn award(state: &mut ChatState, badge_id: &str) -> Vec<ChatEffect> {
    let before = state.gamification.clone();
    let after = apply_badge_award(&before, badge_id);
    if after == before {
        return Vec::new();
    }
    let effects = notifications::derive(&before, &after)
        .into_iter()
        .map(ChatEffect::Notify)
        .collect();
    state.gamification = after;
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives::parse;
    use crate::notifications::NotificationIcon;

    fn parsed(raw: &str, state: &ChatState) -> ChatAction {
        ChatAction::DirectiveParsed(parse(raw, state.gamification.unlocked_badge_ids()))
    }

    fn last(state: &ChatState) -> &Message {
        state.messages.last().unwrap()
    }

    #[test]
    fn starts_with_greeting_and_suggestions() {
        let state = ChatState::default();
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].text, GREETING);
        assert_eq!(state.suggestions.len(), 3);
        assert_eq!(state.gamification.points(), 0);
        assert!(state.error.is_none());
    }

    #[test]
    fn user_message_clears_suggestions_and_error() {
        let mut state = ChatState {
            error: Some("old".to_string()),
            ..ChatState::default()
        };
        let effects = reduce(
            &mut state,
            ChatAction::UserMessageAppended {
                text: "hi".to_string(),
                image: None,
            },
        );
        assert!(effects.is_empty());
        assert!(state.suggestions.is_empty());
        assert!(state.error.is_none());
        assert_eq!(last(&state).text, "hi");
    }

    #[test]
    fn badge_response_awards_and_notifies_once() {
        let mut state = ChatState::default();
        let action = parsed("[BADGE_AWARDED:TRANSPORT_TRACKER]\nGreat job!", &state);
        let effects = reduce(&mut state, action);

        assert_eq!(state.gamification.points(), 50);
        assert_eq!(state.gamification.unlocked_badge_ids(), ["TRANSPORT_TRACKER"]);
        assert_eq!(last(&state).text, "Great job!");
        assert_eq!(last(&state).badge.map(|b| b.id), Some("TRANSPORT_TRACKER"));
        assert_eq!(
            effects,
            vec![ChatEffect::Notify(NotificationRequest {
                message: "Badge Unlocked: Transport Tracker!".to_string(),
                icon: NotificationIcon::Badge("TRANSPORT_TRACKER"),
            })]
        );
    }

    #[test]
    fn repeated_award_is_idempotent() {
        let mut state = ChatState::default();
        assert_eq!(reduce(&mut state, ChatAction::BadgeAwarded("HOME_HERO".into())).len(), 1);
        let snapshot = state.gamification.clone();
        assert!(reduce(&mut state, ChatAction::BadgeAwarded("HOME_HERO".into())).is_empty());
        assert_eq!(state.gamification, snapshot);
    }

    #[test]
    fn second_badge_brings_rank_up() {
        let mut state = ChatState::default();
        reduce(&mut state, ChatAction::BadgeAwarded("ECO_EATER".into()));
        let effects = reduce(&mut state, ChatAction::BadgeAwarded("HOME_HERO".into()));
        let messages: Vec<&str> = effects
            .iter()
            .map(|ChatEffect::Notify(r)| r.message.as_str())
            .collect();
        assert_eq!(
            messages,
            vec!["Rank Up: You are now a Green Learner!", "Badge Unlocked: Home Hero!"]
        );
    }

    #[test]
    fn chart_without_title_gets_default_title() {
        let mut state = ChatState::default();
        let action = parsed("Here.\n[PIE_CHART_DATA:{\"diet\": 1700}]", &state);
        reduce(&mut state, action);
        assert_eq!(last(&state).chart_title.as_deref(), Some(DEFAULT_CHART_TITLE));
        assert!(last(&state).has_chart());
    }

    #[test]
    fn receipt_is_flagged() {
        let mut state = ChatState::default();
        let action = parsed("[CARBON_RECEIPT]\nITEM: Banana", &state);
        reduce(&mut state, action);
        assert!(last(&state).is_receipt);
        assert_eq!(last(&state).text, "ITEM: Banana");
        assert!(last(&state).chart_title.is_none());
    }

    #[test]
    fn failure_appends_fallback_and_keeps_progress() {
        let mut state = ChatState::default();
        reduce(&mut state, ChatAction::BadgeAwarded("ECO_EATER".into()));
        let before = state.gamification.clone();

        reduce(
            &mut state,
            ChatAction::GenerationFailed {
                reason: "network down".to_string(),
            },
        );
        assert_eq!(last(&state).text, FALLBACK_REPLY);
        assert_eq!(state.error.as_deref(), Some(FALLBACK_REPLY));
        assert_eq!(state.gamification, before);
    }

    #[test]
    fn shortcut_keeps_suggestions() {
        let mut state = ChatState::default();
        reduce(&mut state, ChatAction::ShortcutReplied);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(last(&state).text, ITEM_FOOTPRINT_REPLY);
        assert_eq!(state.suggestions.len(), 3);
    }
}
