//! Per-playthrough progress: where the player is, what they carry, what has
//! been searched, and how the session ended.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use log::{debug, info};
use uuid::Uuid;

use crate::config::DifficultySettings;
use crate::game::achievement::starter_achievements;
use crate::game::timer::{elapsed_millis, elapsed_secs};
use crate::game::types::{Achievement, AchievementId, Collected, Difficulty, Item, ItemKind, SessionStatus};
use crate::game::world::World;

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub session_id: Uuid,
    pub difficulty: Difficulty,
    pub current_room: String,
    pub target_room: String,
    /// Keys and treasures in discovery order.
    pub inventory: Vec<String>,
    pub keys_collected: BTreeSet<String>,
    pub treasure_collected: BTreeSet<String>,
    pub examined_objects: BTreeSet<String>,
    /// Furniture whose hidden slot has been emptied this session.
    pub searched: BTreeSet<String>,
    pub start_time: DateTime<Utc>,
    /// Seconds; `None` means the deadline never passes.
    pub time_limit: Option<u64>,
    pub hints_remaining: u32,
    pub achievements: BTreeMap<AchievementId, Achievement>,
    pub status: SessionStatus,
}

impl GameState {
    pub fn new(
        world: &World,
        difficulty: Difficulty,
        settings: DifficultySettings,
        now: DateTime<Utc>,
    ) -> Self {
        let state = Self {
            session_id: Uuid::new_v4(),
            difficulty,
            current_room: world.start_room().to_string(),
            target_room: world.target_room().to_string(),
            inventory: Vec::new(),
            keys_collected: BTreeSet::new(),
            treasure_collected: BTreeSet::new(),
            examined_objects: BTreeSet::new(),
            searched: BTreeSet::new(),
            start_time: now,
            time_limit: settings.time_limit_secs,
            hints_remaining: settings.hints,
            achievements: starter_achievements(),
            status: SessionStatus::Playing,
        };
        info!(
            "Session {} started: difficulty={} room={} limit={:?}",
            state.session_id, difficulty, state.current_room, state.time_limit
        );
        state
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> u64 {
        elapsed_secs(self.start_time, now)
    }

    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        elapsed_millis(self.start_time, now)
    }

    /// Milliseconds left before the deadline, if there is one.
    pub fn remaining_ms(&self, now: DateTime<Utc>) -> Option<u64> {
        self.time_limit
            .map(|limit| (limit * 1000).saturating_sub(self.elapsed_ms(now)))
    }

    /// Whole seconds left before the deadline, if there is one.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<u64> {
        self.remaining_ms(now).map(|ms| ms / 1000)
    }

    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn time_up(&self) -> bool {
        self.status == SessionStatus::TimedOut
    }

    /// Leave `Playing`. Terminal states never change again.
    pub fn finish(&mut self, status: SessionStatus) -> bool {
        if self.is_over() || !status.is_terminal() {
            return false;
        }
        info!("Session {} ended: {:?}", self.session_id, status);
        self.status = status;
        true
    }

    /// Empty the hidden slot of `furniture`. Returns the item the first time,
    /// `None` afterwards or when nothing was hidden.
    pub fn take_contents<'w>(&mut self, world: &'w World, furniture: &str) -> Option<&'w Item> {
        let item = world.contents_of(furniture)?;
        if !self.searched.insert(furniture.to_string()) {
            return None;
        }
        debug!("{} emptied: {}", furniture, item.name);
        Some(item)
    }

    /// Whether the hidden slot of `furniture` is still full.
    pub fn has_unsearched_contents(&self, world: &World, furniture: &str) -> bool {
        world.contents_of(furniture).is_some() && !self.searched.contains(furniture)
    }

    /// Hand a key or treasure to the player, at most once per name.
    pub fn collect(&mut self, item: &Item) -> Collected {
        let fresh = match item.kind {
            ItemKind::Key { .. } => self.keys_collected.insert(item.name.clone()),
            ItemKind::Treasure { .. } => self.treasure_collected.insert(item.name.clone()),
            _ => false,
        };
        if !fresh {
            return Collected::AlreadyHeld;
        }
        self.inventory.push(item.name.clone());
        info!(
            "Session {} collected {} '{}'",
            self.session_id,
            item.kind_label(),
            item.name
        );
        Collected::Added
    }

    pub fn holds(&self, name: &str) -> bool {
        self.keys_collected.contains(name) || self.treasure_collected.contains(name)
    }

    /// Any collected key targets `door`.
    pub fn has_key_for(&self, world: &World, door: &str) -> bool {
        self.keys_collected.iter().any(|key| {
            matches!(
                world.item(key).map(|i| &i.kind),
                Some(ItemKind::Key { target, .. }) if target == door
            )
        })
    }

    pub fn inventory_items<'w>(&self, world: &'w World) -> Vec<&'w Item> {
        self.inventory
            .iter()
            .filter_map(|name| world.item(name))
            .collect()
    }

    pub fn treasure_value(&self, world: &World) -> u64 {
        self.treasure_collected
            .iter()
            .filter_map(|name| world.item(name))
            .map(|item| item.value() as u64)
            .sum()
    }

    pub fn unlocked_achievements(&self) -> usize {
        self.achievements.values().filter(|a| a.unlocked).count()
    }
}
