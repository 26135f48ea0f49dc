//! Escape room engine: the world model, per-session state, interaction rules,
//! scoring, achievements, saves, and the line-oriented session on top.
//!
//! The world is immutable once validated and shared between sessions; each
//! session owns its own `GameState`.

pub mod achievement;
pub mod commands;
pub mod engine;
pub mod errors;
pub mod render;
pub mod score;
pub mod seed_loader;
pub mod session;
pub mod state;
pub mod storage;
pub mod timer;
pub mod types;
pub mod world;

pub use achievement::{achievements_check, starter_achievements};
pub use commands::{parse, GameCommand};
pub use engine::{
    check_deadline, check_victory, conclude, enter, examine, explore, hint, push, use_item,
    ExamineOutcome, Exploration, Hint, PushOutcome, UseOutcome,
};
pub use errors::{GameError, WorldError};
pub use score::{breakdown, score, ScoreBreakdown};
pub use seed_loader::{load_world_from_json, parse_world, world_to_json};
pub use session::{Prompt, Reply, Session};
pub use state::GameState;
pub use storage::{SaveStore, SlotInfo, Snapshot};
pub use timer::{Clock, DeadlineWatcher, ManualClock, SystemClock};
pub use types::*;
pub use world::{World, WorldSeed, CANONICAL_START_ROOM, CANONICAL_TARGET_ROOM};
