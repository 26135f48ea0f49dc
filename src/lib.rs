//! # Escaperoom - a text escape room
//!
//! The player wakes up in a locked house and has to find the way out by
//! searching furniture for keys, opening doors, and collecting hidden
//! treasures along the way.
//!
//! ## Features
//!
//! - **Room graph**: rooms linked by doors; each door opens with exactly one key.
//! - **Hidden contents**: furniture hides at most one key or treasure, found once per playthrough.
//! - **Difficulty**: easy (no limit), normal (30 minutes) and hard (5 minutes, with a background deadline watcher).
//! - **Scoring and achievements**: time left, treasure values, Speed Runner, Treasure Hunter and Master Explorer.
//! - **Save slots**: JSON snapshots written atomically under a file lock.
//! - **Custom worlds**: worlds load from JSON and are validated before play.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use escaperoom::config::Config;
//! use escaperoom::game::{Difficulty, SaveStore, Session, SystemClock, World};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let settings = config.difficulty.for_difficulty(Difficulty::Normal);
//!     let mut session = Session::new(
//!         Arc::new(World::canonical()),
//!         Difficulty::Normal,
//!         settings,
//!         Arc::new(SystemClock),
//!         SaveStore::new(&config.storage.data_dir),
//!         "default",
//!         None,
//!     );
//!     print!("{}", session.handle_line("explore").text);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - world model, engine rules, sessions, scoring and saves
//! - [`config`] - configuration loading and difficulty settings
//! - [`logutil`] - log sanitizing for player input

pub mod config;
pub mod game;
pub mod logutil;
