//! # Configuration Management Module
//!
//! TOML configuration for the escape-room binary, with defaults for every
//! section so a missing file section never blocks a game from starting.
//!
//! ## Configuration Structure
//!
//! - [`GameConfig`] - default difficulty, save slot and optional world file
//! - [`DifficultyTable`] - per-difficulty deadline, hint budget and watcher toggle
//! - [`StorageConfig`] - where saves live
//! - [`LoggingConfig`] - log level and file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use escaperoom::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("escaperoom.toml").await?;
//!     println!("Saves in: {}", config.storage.data_dir);
//!     Config::create_default("escaperoom.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [game]
//! default_difficulty = "normal"
//! save_slot = "default"
//!
//! [difficulty.hard]
//! time_limit_secs = 300
//! hints = 1
//! deadline_watcher = true
//!
//! [storage]
//! data_dir = "./data"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::game::types::Difficulty;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub difficulty: DifficultyTable,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    #[serde(default)]
    pub default_difficulty: Difficulty,
    /// Save slot used when `--slot` is not given.
    #[serde(default = "default_save_slot")]
    pub save_slot: String,
    /// Optional JSON world file; the built-in mansion is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_file: Option<String>,
    /// Seed for hint selection. Random when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
}

fn default_save_slot() -> String {
    "default".to_string()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            default_difficulty: Difficulty::Normal,
            save_slot: default_save_slot(),
            world_file: None,
            rng_seed: None,
        }
    }
}

/// Settings that distinguish one difficulty from another.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DifficultySettings {
    /// Seconds until time runs out; `None` disables the deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u64>,
    pub hints: u32,
    /// Run the background watcher so time-out is noticed while waiting for input.
    #[serde(default)]
    pub deadline_watcher: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DifficultyTable {
    pub easy: DifficultySettings,
    pub normal: DifficultySettings,
    pub hard: DifficultySettings,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: DifficultySettings {
                time_limit_secs: None,
                hints: 5,
                deadline_watcher: false,
            },
            normal: DifficultySettings {
                time_limit_secs: Some(1800),
                hints: 3,
                deadline_watcher: false,
            },
            hard: DifficultySettings {
                time_limit_secs: Some(300),
                hints: 1,
                deadline_watcher: true,
            },
        }
    }
}

impl DifficultyTable {
    pub fn for_difficulty(&self, difficulty: Difficulty) -> DifficultySettings {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Normal => self.normal,
            Difficulty::Hard => self.hard,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    /// Log file. The terminal belongs to the game, so logs go here by default.
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("escaperoom.log".to_string()),
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Load the file if it exists, defaults otherwise.
    pub async fn load_or_default(path: &str) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}
