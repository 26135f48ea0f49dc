use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::game::errors::GameError;

pub const SNAPSHOT_SCHEMA_VERSION: u8 = 2;

/// Anything a room can hold. Doors are listed in both rooms they connect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub kind: ItemKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Furniture {
        /// Name of the key or treasure hidden inside, if any.
        #[serde(default)]
        contents: Option<String>,
        /// Pushing reveals the hidden treasure.
        #[serde(default)]
        pushable: bool,
        #[serde(default)]
        interaction: Option<String>,
    },
    Door {
        rooms: [String; 2],
        mechanism: String,
    },
    Key {
        target: String,
        #[serde(default)]
        hint: String,
        #[serde(default)]
        story: String,
    },
    Treasure {
        power: String,
        value: u32,
    },
}

impl Item {
    pub fn furniture(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: ItemKind::Furniture {
                contents: None,
                pushable: false,
                interaction: None,
            },
        }
    }

    pub fn door(name: &str, description: &str, a: &str, b: &str, mechanism: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: ItemKind::Door {
                rooms: [a.to_string(), b.to_string()],
                mechanism: mechanism.to_string(),
            },
        }
    }

    pub fn key(name: &str, description: &str, target: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: ItemKind::Key {
                target: target.to_string(),
                hint: String::new(),
                story: String::new(),
            },
        }
    }

    pub fn treasure(name: &str, description: &str, power: &str, value: u32) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: ItemKind::Treasure {
                power: power.to_string(),
                value,
            },
        }
    }

    /// Hide `item` inside this furniture. No-op for other kinds.
    pub fn holding(mut self, item: &str) -> Self {
        if let ItemKind::Furniture { contents, .. } = &mut self.kind {
            *contents = Some(item.to_string());
        }
        self
    }

    pub fn pushable(mut self) -> Self {
        if let ItemKind::Furniture { pushable, .. } = &mut self.kind {
            *pushable = true;
        }
        self
    }

    pub fn with_interaction(mut self, text: &str) -> Self {
        if let ItemKind::Furniture { interaction, .. } = &mut self.kind {
            *interaction = Some(text.to_string());
        }
        self
    }

    pub fn with_lore(mut self, hint_text: &str, story_text: &str) -> Self {
        if let ItemKind::Key { hint, story, .. } = &mut self.kind {
            *hint = hint_text.to_string();
            *story = story_text.to_string();
        }
        self
    }

    pub fn is_door(&self) -> bool {
        matches!(self.kind, ItemKind::Door { .. })
    }

    pub fn is_furniture(&self) -> bool {
        matches!(self.kind, ItemKind::Furniture { .. })
    }

    pub fn is_key(&self) -> bool {
        matches!(self.kind, ItemKind::Key { .. })
    }

    pub fn is_treasure(&self) -> bool {
        matches!(self.kind, ItemKind::Treasure { .. })
    }

    /// Keys and treasures are the only things that end up in the inventory.
    pub fn is_collectible(&self) -> bool {
        self.is_key() || self.is_treasure()
    }

    /// Scoring value; zero for everything but treasures.
    pub fn value(&self) -> u32 {
        match self.kind {
            ItemKind::Treasure { value, .. } => value,
            _ => 0,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            ItemKind::Furniture { .. } => "furniture",
            ItemKind::Door { .. } => "door",
            ItemKind::Key { .. } => "key",
            ItemKind::Treasure { .. } => "treasure",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    pub name: String,
    pub description: String,
    /// Item names in authoring order.
    #[serde(default)]
    pub items: Vec<String>,
    /// Map cell as (column, row).
    #[serde(default)]
    pub layout: (u8, u8),
}

impl Room {
    pub fn new(name: &str, description: &str, layout: (u8, u8)) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            items: Vec::new(),
            layout,
        }
    }

    pub fn with_items(mut self, items: &[&str]) -> Self {
        self.items.extend(items.iter().map(|s| s.to_string()));
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Normal
    }
}

impl Difficulty {
    pub fn multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 2.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "e" => Ok(Difficulty::Easy),
            "normal" | "n" => Ok(Difficulty::Normal),
            "hard" | "h" => Ok(Difficulty::Hard),
            other => Err(GameError::InvalidCommand(format!(
                "unknown difficulty '{}': choose easy, normal or hard",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    SpeedRunner,
    TreasureHunter,
    MasterExplorer,
}

impl AchievementId {
    pub const ALL: [AchievementId; 3] = [
        AchievementId::SpeedRunner,
        AchievementId::TreasureHunter,
        AchievementId::MasterExplorer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AchievementId::SpeedRunner => "speed_runner",
            AchievementId::TreasureHunter => "treasure_hunter",
            AchievementId::MasterExplorer => "master_explorer",
        }
    }
}

/// Per-session achievement progress. `unlocked` never goes back to false.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Achievement {
    pub name: String,
    pub description: String,
    pub unlocked: bool,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            unlocked: false,
            unlocked_at: None,
        }
    }

    pub fn mark_unlocked(&mut self, at: DateTime<Utc>) {
        if !self.unlocked {
            self.unlocked = true;
            self.unlocked_at = Some(at);
        }
    }
}

/// Session lifecycle: `Playing` until one of the terminal states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Playing,
    Won,
    TimedOut,
    Quit,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::Playing)
    }
}

/// Result of handing an item to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collected {
    Added,
    AlreadyHeld,
}
