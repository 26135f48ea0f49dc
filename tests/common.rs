//! Test utilities & fixtures shared by the integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use escaperoom::config::{DifficultySettings, DifficultyTable};
use escaperoom::game::{Difficulty, ManualClock, Reply, SaveStore, Session, World};

/// Path to a world file shipped under `data/`.
#[allow(dead_code)]
pub fn data_file(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

/// A session on the built-in house with a hand-driven clock and a temp save dir.
/// Keep the returned `TempDir` alive for as long as the session saves.
#[allow(dead_code)]
pub fn new_session(difficulty: Difficulty) -> (Session, Arc<ManualClock>, tempfile::TempDir) {
    let settings = DifficultyTable::default().for_difficulty(difficulty);
    session_with(difficulty, settings)
}

#[allow(dead_code)]
pub fn session_with(
    difficulty: Difficulty,
    settings: DifficultySettings,
) -> (Session, Arc<ManualClock>, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let clock = Arc::new(ManualClock::starting_now());
    let session = Session::new(
        Arc::new(World::canonical()),
        difficulty,
        settings,
        clock.clone(),
        SaveStore::new(tmp.path()),
        "test",
        Some(7),
    );
    (session, clock, tmp)
}

/// Examine a door and accept the offer to walk through.
#[allow(dead_code)]
pub fn go_through(session: &mut Session, door: &str) -> Reply {
    let offer = session.handle_line(&format!("examine {}", door));
    assert!(offer.text.contains("(yes/no)"), "no offer for {}: {}", door, offer.text);
    session.handle_line("yes")
}
