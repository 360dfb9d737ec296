pub mod catalog;
pub mod engine;

pub use catalog::{Badge, RankTier, BADGES, RANKS};
pub use engine::{apply_badge_award, current_rank, rank_for_points, GamificationState};
