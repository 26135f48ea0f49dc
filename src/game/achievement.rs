//! Achievement definitions and evaluation.
//!
//! Achievements are re-checked after every command that changes state. A
//! check only ever unlocks; an unlocked achievement stays unlocked and is not
//! reported twice.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::info;

use crate::game::state::GameState;
use crate::game::types::{Achievement, AchievementId};

/// Speed Runner unlocks while elapsed time is under this many seconds.
pub const SPEED_RUNNER_SECS: u64 = 900;
pub const TREASURE_HUNTER_COUNT: usize = 3;
pub const MASTER_EXPLORER_COUNT: usize = 15;

/// Fresh, all-locked achievement table.
pub fn starter_achievements() -> BTreeMap<AchievementId, Achievement> {
    AchievementId::ALL
        .iter()
        .map(|&id| (id, definition(id)))
        .collect()
}

fn definition(id: AchievementId) -> Achievement {
    match id {
        AchievementId::SpeedRunner => Achievement::new(
            "Speed Runner",
            "Make progress within the first 15 minutes",
        ),
        AchievementId::TreasureHunter => {
            Achievement::new("Treasure Hunter", "Find all three treasures")
        }
        AchievementId::MasterExplorer => {
            Achievement::new("Master Explorer", "Examine 15 different objects")
        }
    }
}

fn condition_met(state: &GameState, id: AchievementId, now: DateTime<Utc>) -> bool {
    match id {
        AchievementId::SpeedRunner => state.elapsed(now) < SPEED_RUNNER_SECS,
        AchievementId::TreasureHunter => state.treasure_collected.len() >= TREASURE_HUNTER_COUNT,
        AchievementId::MasterExplorer => state.examined_objects.len() >= MASTER_EXPLORER_COUNT,
    }
}

/// Unlock every achievement whose condition now holds. Returns only the ones
/// unlocked by this call.
pub fn achievements_check(state: &mut GameState, now: DateTime<Utc>) -> Vec<AchievementId> {
    let mut awarded = Vec::new();

    for id in AchievementId::ALL {
        let already = state
            .achievements
            .get(&id)
            .map(|a| a.unlocked)
            .unwrap_or(false);
        if already || !condition_met(state, id, now) {
            continue;
        }
        state
            .achievements
            .entry(id)
            .or_insert_with(|| definition(id))
            .mark_unlocked(now);
        info!(
            "Session {} unlocked achievement {}",
            state.session_id,
            id.as_str()
        );
        awarded.push(id);
    }

    awarded
}
