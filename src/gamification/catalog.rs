//! Static badge and rank tables.
//!
//! Both catalogs are process-wide and never change at runtime. Badge ids are
//! the tokens the assistant emits inside `[BADGE_AWARDED:...]` tags.

use serde::Serialize;

// ── Badges ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub points: u32,
}

pub const BADGES: &[Badge] = &[
    Badge {
        id: "TRANSPORT_TRACKER",
        name: "Transport Tracker",
        description: "You calculated your transportation footprint. A journey of a thousand miles begins with a single step!",
        points: 50,
    },
    Badge {
        id: "HOME_HERO",
        name: "Home Hero",
        description: "You've calculated your home energy footprint! Knowledge is power - literally.",
        points: 50,
    },
    Badge {
        id: "ECO_EATER",
        name: "Eco Eater",
        description: "You've analyzed your diet's footprint. You are what you eat, and you're eating greener!",
        points: 50,
    },
];

/// Look up a badge by its tag id. Ids are case-sensitive.
pub fn badge(id: &str) -> Option<&'static Badge> {
    BADGES.iter().find(|b| b.id == id)
}

// ── Ranks ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankTier {
    pub name: &'static str,
    pub min_points: u32,
    pub icon: &'static str,
}

/// Ordered by ascending `min_points`. The first tier must start at 0.
pub const RANKS: &[RankTier] = &[
    RankTier {
        name: "Eco Novice",
        min_points: 0,
        icon: "🌱",
    },
    RankTier {
        name: "Green Learner",
        min_points: 100,
        icon: "🌳",
    },
    RankTier {
        name: "Planet Protector",
        min_points: 300,
        icon: "🌍",
    },
];
