//! Scoring. Pure functions of the game state; safe to call after the game ends.

use chrono::{DateTime, Utc};

use crate::game::state::GameState;
use crate::game::world::World;

pub const POINTS_PER_MINUTE_LEFT: u64 = 100;
pub const POINTS_PER_ACHIEVEMENT: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub time: u64,
    pub treasures: u64,
    pub achievements: u64,
    pub multiplier_pct: u64,
    pub total: u64,
}

/// 100 points per minute left (floored), treasure values, 1000 per unlocked
/// achievement, then the difficulty multiplier. Without a deadline there is no
/// time component.
pub fn breakdown(state: &GameState, world: &World, now: DateTime<Utc>) -> ScoreBreakdown {
    let time = state
        .remaining_ms(now)
        .map(|left| left * POINTS_PER_MINUTE_LEFT / 60_000)
        .unwrap_or(0);
    let treasures = state.treasure_value(world);
    let achievements = state.unlocked_achievements() as u64 * POINTS_PER_ACHIEVEMENT;
    let multiplier = state.difficulty.multiplier();
    let total = ((time + treasures + achievements) as f64 * multiplier).floor() as u64;
    ScoreBreakdown {
        time,
        treasures,
        achievements,
        multiplier_pct: (multiplier * 100.0).round() as u64,
        total,
    }
}

pub fn score(state: &GameState, world: &World, now: DateTime<Utc>) -> u64 {
    breakdown(state, world, now).total
}
