//! Diffs gamification state into notification requests.

use serde::Serialize;

use crate::gamification::{catalog, current_rank, GamificationState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum NotificationIcon {
    /// Rank emoji from the rank table.
    Emoji(&'static str),
    /// Badge artwork, keyed by badge id.
    Badge(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequest {
    pub message: String,
    pub icon: NotificationIcon,
}

/// Rank-up first (if the rank name changed), then one request per newly
/// unlocked badge in unlock order.
pub fn derive(previous: &GamificationState, next: &GamificationState) -> Vec<NotificationRequest> {
    let mut requests = Vec::new();

    let before = current_rank(previous);
    let after = current_rank(next);
    if before.name != after.name {
        requests.push(NotificationRequest {
            message: format!(
                "Rank Up: You are now {} {}!",
                indefinite_article(after.name),
                after.name
            ),
            icon: NotificationIcon::Emoji(after.icon),
        });
    }

    if next.unlocked_badge_ids().len() > previous.unlocked_badge_ids().len() {
        for id in next
            .unlocked_badge_ids()
            .iter()
            .filter(|id| !previous.is_unlocked(id))
        {
            let Some(badge) = catalog::badge(id) else {
                continue;
            };
            requests.push(NotificationRequest {
                message: format!("Badge Unlocked: {}!", badge.name),
                icon: NotificationIcon::Badge(badge.id),
            });
        }
    }

    requests
}

fn indefinite_article(word: &str) -> &'static str {
    match word.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}
