//! Save slots on disk.
//!
//! Persistence: JSON at `<data_dir>/saves/<slot>.json` using atomic write+rename
//! under an exclusive file lock. Rooms and items are stored by name and
//! re-resolved against the world when a snapshot is restored.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::{debug, info, warn};
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::errors::GameError;
use crate::game::state::GameState;
use crate::game::types::{
    Achievement, AchievementId, Difficulty, SessionStatus, SNAPSHOT_SCHEMA_VERSION,
};
use crate::game::world::World;

const MAX_SLOT_LEN: usize = 32;

/// Everything needed to resume a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub version: u8,
    pub saved_at: DateTime<Utc>,
    pub session_id: Uuid,
    pub difficulty: Difficulty,
    pub current_room: String,
    pub target_room: String,
    pub inventory: Vec<String>,
    pub keys_collected: BTreeSet<String>,
    pub treasure_collected: BTreeSet<String>,
    pub examined_objects: BTreeSet<String>,
    #[serde(default)]
    pub searched: BTreeSet<String>,
    /// Playing time at save; the clock does not run while the game is closed.
    pub elapsed_ms: u64,
    pub time_limit: Option<u64>,
    pub hints_remaining: u32,
    pub achievements: BTreeMap<AchievementId, Achievement>,
    #[serde(default)]
    pub status: SessionStatus,
}

impl Snapshot {
    pub fn capture(state: &GameState, now: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_SCHEMA_VERSION,
            saved_at: now,
            session_id: state.session_id,
            difficulty: state.difficulty,
            current_room: state.current_room.clone(),
            target_room: state.target_room.clone(),
            inventory: state.inventory.clone(),
            keys_collected: state.keys_collected.clone(),
            treasure_collected: state.treasure_collected.clone(),
            examined_objects: state.examined_objects.clone(),
            searched: state.searched.clone(),
            elapsed_ms: state.elapsed_ms(now),
            time_limit: state.time_limit,
            hints_remaining: state.hints_remaining,
            achievements: state.achievements.clone(),
            status: state.status,
        }
    }

    /// Rebuild a session against `world`. Fails if any room or item name no
    /// longer resolves.
    pub fn restore(self, world: &World, now: DateTime<Utc>) -> Result<GameState, GameError> {
        if self.version != SNAPSHOT_SCHEMA_VERSION {
            return Err(GameError::CorruptSave(format!(
                "schema version {} (expected {})",
                self.version, SNAPSHOT_SCHEMA_VERSION
            )));
        }
        for room in [&self.current_room, &self.target_room] {
            if world.room(room).is_none() {
                return Err(GameError::CorruptSave(format!("unknown room '{}'", room)));
            }
        }
        if self.target_room != world.target_room() {
            return Err(GameError::CorruptSave(format!(
                "saved for target '{}', world exits at '{}'",
                self.target_room,
                world.target_room()
            )));
        }
        for name in &self.keys_collected {
            if !world.item(name).is_some_and(|i| i.is_key()) {
                return Err(GameError::CorruptSave(format!("unknown key '{}'", name)));
            }
        }
        for name in &self.treasure_collected {
            if !world.item(name).is_some_and(|i| i.is_treasure()) {
                return Err(GameError::CorruptSave(format!("unknown treasure '{}'", name)));
            }
        }
        for name in self.inventory.iter().chain(&self.searched) {
            if world.item(name).is_none() {
                return Err(GameError::CorruptSave(format!("unknown item '{}'", name)));
            }
        }

        Ok(GameState {
            session_id: self.session_id,
            difficulty: self.difficulty,
            current_room: self.current_room,
            target_room: self.target_room,
            inventory: self.inventory,
            keys_collected: self.keys_collected,
            treasure_collected: self.treasure_collected,
            examined_objects: self.examined_objects,
            searched: self.searched,
            start_time: now - chrono::Duration::milliseconds(self.elapsed_ms as i64),
            time_limit: self.time_limit,
            hints_remaining: self.hints_remaining,
            achievements: self.achievements,
            status: self.status,
        })
    }
}

/// Summary of a stored slot for listings.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotInfo {
    pub slot: String,
    pub snapshot: Snapshot,
}

pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    /// Saves live under `<data_dir>/saves`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join("saves"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slot_filename(slot)))
    }

    pub fn exists(&self, slot: &str) -> bool {
        self.path_for(slot).exists()
    }

    pub fn save(&self, slot: &str, snapshot: &Snapshot) -> Result<PathBuf, GameError> {
        validate_slot(slot)?;
        let path = self.path_for(slot);
        let json = serde_json::to_string_pretty(snapshot)?;
        write_json_atomic(&path, &json)?;
        info!(
            "Saved session {} to slot '{}' ({})",
            snapshot.session_id,
            slot,
            path.display()
        );
        Ok(path)
    }

    pub fn load(&self, slot: &str) -> Result<Snapshot, GameError> {
        validate_slot(slot)?;
        let path = self.path_for(slot);
        if !path.exists() {
            debug!("No save at {}", path.display());
            return Err(GameError::NoSavedSession(slot.to_string()));
        }
        let text = fs::read_to_string(&path)?;
        serde_json::from_str(&text).map_err(|e| {
            warn!("Unreadable save {}: {}", path.display(), e);
            GameError::CorruptSave(format!("{}: {}", path.display(), e))
        })
    }

    /// All readable slots, sorted by name. Unreadable files are skipped.
    pub fn list(&self) -> Result<Vec<SlotInfo>, GameError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut slots = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let slot = percent_decode_str(stem).decode_utf8_lossy().to_string();
            match self.load(&slot) {
                Ok(snapshot) => slots.push(SlotInfo { slot, snapshot }),
                Err(e) => warn!("Skipping save {}: {}", path.display(), e),
            }
        }
        slots.sort_by(|a, b| a.slot.cmp(&b.slot));
        Ok(slots)
    }
}

/// Percent-encode a slot so any name maps to a safe filename.
pub fn slot_filename(slot: &str) -> String {
    utf8_percent_encode(slot, NON_ALPHANUMERIC).to_string()
}

fn validate_slot(slot: &str) -> Result<(), GameError> {
    let trimmed = slot.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_SLOT_LEN {
        return Err(GameError::InvalidCommand(format!(
            "save slot must be 1-{} characters",
            MAX_SLOT_LEN
        )));
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(GameError::InvalidCommand(
            "save slot contains control characters".to_string(),
        ));
    }
    Ok(())
}

fn write_json_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;
    // Lock a sidecar so concurrent writers serialize without truncating the live save.
    let lock_path = path.with_extension("lock");
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&lock_path)?;
    lock_file.lock_exclusive()?;
    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("save.json");
    let mut counter = 0u32;
    let tmp_path = loop {
        let cand = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&cand) {
            Ok(mut tmp) => {
                tmp.write_all(content.as_bytes())?;
                tmp.flush()?;
                let _ = tmp.sync_all();
                break cand;
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
                continue;
            }
            Err(e) => return Err(e),
        }
    };
    fs::rename(&tmp_path, path)?;
    if let Ok(dirf) = File::open(dir) {
        let _ = dirf.sync_all();
    }
    drop(lock_file);
    Ok(())
}
