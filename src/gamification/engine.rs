//! Points/badge state transitions and rank lookup.
//!
//! The engine is a pure transition function plus a pure query. It holds no
//! timers and performs no I/O; callers own the state value.

use serde::Serialize;

use super::catalog::{self, RankTier, RANKS};

/// Session progress. Points never decrease and badges are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GamificationState {
    points: u32,
    /// Unlock order is preserved so notifications can follow it.
    unlocked: Vec<String>,
}

impl GamificationState {
    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn unlocked_badge_ids(&self) -> &[String] {
        &self.unlocked
    }

    pub fn is_unlocked(&self, badge_id: &str) -> bool {
        self.unlocked.iter().any(|id| id == badge_id)
    }
}

/// Award a badge. Unknown or already-unlocked ids return the state unchanged;
/// otherwise the id and its points are added together.
pub fn apply_badge_award(state: &GamificationState, badge_id: &str) -> GamificationState {
    let Some(badge) = catalog::badge(badge_id) else {
        tracing::debug!("[Gamification] Ignoring unknown badge '{}'", badge_id);
        return state.clone();
    };
    if state.is_unlocked(badge.id) {
        tracing::debug!("[Gamification] Badge '{}' already unlocked", badge.id);
        return state.clone();
    }

    let mut unlocked = state.unlocked.clone();
    unlocked.push(badge.id.to_string());
    let next = GamificationState {
        points: state.points.saturating_add(badge.points),
        unlocked,
    };
    tracing::info!(
        "[Gamification] Unlocked '{}' (+{} pts, total {})",
        badge.id,
        badge.points,
        next.points
    );
    next
}

/// The tier with the greatest `min_points <= points`.
pub fn current_rank(state: &GamificationState) -> &'static RankTier {
    rank_for_points(state.points)
}

pub fn rank_for_points(points: u32) -> &'static RankTier {
    RANKS
        .iter()
        .rev()
        .find(|tier| tier.min_points <= points)
        .unwrap_or(&RANKS[0])
}
