//! One player's playthrough: routes input lines to the engine and turns the
//! results into text.
//!
//! The session owns its [`GameState`] and shares the immutable [`World`]. Time
//! comes from an injected [`Clock`] so deadline behavior can be driven in tests
//! without sleeping.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::DifficultySettings;
use crate::game::achievement::achievements_check;
use crate::game::commands::{is_affirmative, parse, GameCommand};
use crate::game::engine::{self, ExamineOutcome};
use crate::game::errors::GameError;
use crate::game::render;
use crate::game::state::GameState;
use crate::game::storage::{SaveStore, Snapshot};
use crate::game::timer::Clock;
use crate::game::types::{Difficulty, SessionStatus};
use crate::game::world::World;
use crate::logutil::escape_input;

/// A yes/no question waiting for the next line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    EnterRoom { room: String },
    ConfirmQuit,
}

/// Text for the player plus the session status after the line was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub status: SessionStatus,
}

impl Reply {
    pub fn is_final(&self) -> bool {
        self.status.is_terminal()
    }
}

pub struct Session {
    world: Arc<World>,
    state: GameState,
    clock: Arc<dyn Clock>,
    store: SaveStore,
    slot: String,
    rng: StdRng,
    prompt: Option<Prompt>,
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl Session {
    /// Start a fresh playthrough in the world's start room.
    pub fn new(
        world: Arc<World>,
        difficulty: Difficulty,
        settings: DifficultySettings,
        clock: Arc<dyn Clock>,
        store: SaveStore,
        slot: &str,
        rng_seed: Option<u64>,
    ) -> Self {
        let state = GameState::new(&world, difficulty, settings, clock.now());
        Self {
            world,
            state,
            clock,
            store,
            slot: slot.to_string(),
            rng: rng_from(rng_seed),
            prompt: None,
        }
    }

    /// Continue the playthrough saved in `slot`.
    pub fn resume(
        world: Arc<World>,
        clock: Arc<dyn Clock>,
        store: SaveStore,
        slot: &str,
        rng_seed: Option<u64>,
    ) -> Result<Self, GameError> {
        let snapshot = store.load(slot)?;
        let state = snapshot.restore(&world, clock.now())?;
        info!(
            "Session {} resumed from slot '{}' in {}",
            state.session_id, slot, state.current_room
        );
        Ok(Self {
            world,
            state,
            clock,
            store,
            slot: slot.to_string(),
            rng: rng_from(rng_seed),
            prompt: None,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn pending_prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn intro(&self) -> String {
        format!(
            "{}{}\n",
            render::intro(&self.state),
            render::location(&self.state)
        )
    }

    /// Wall time until the deadline passes, or `None` without a limit.
    pub fn deadline_in(&self) -> Option<Duration> {
        let limit_ms = self.state.time_limit? as i64 * 1000;
        let elapsed_ms = (self.clock.now() - self.state.start_time).num_milliseconds();
        // One past the limit, since the deadline is strict.
        Some(Duration::from_millis((limit_ms - elapsed_ms + 1).max(0) as u64))
    }

    /// Deadline check without a command, for the watcher task.
    pub fn tick(&mut self) -> Option<Reply> {
        let text = self.expire()?;
        Some(self.reply(text))
    }

    pub fn handle_line(&mut self, line: &str) -> Reply {
        if self.state.is_over() {
            return self.reply(render::error(&GameError::SessionOver));
        }
        if let Some(text) = self.expire() {
            return self.reply(text);
        }

        debug!(
            "Session {} input: {}",
            self.state.session_id,
            escape_input(line)
        );

        if let Some(prompt) = self.prompt.take() {
            let text = self.answer(prompt, line);
            return self.reply(text);
        }

        let command = match parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return self.reply(String::new()),
            Err(e) => return self.reply(render::error(&e)),
        };
        let mutating = command.is_mutating();
        let result = self.dispatch(command);
        // Failed commands leave the state untouched, achievements included.
        let changed = mutating && result.is_ok();
        let mut text = match result {
            Ok(text) => text,
            Err(e) => {
                if !e.is_recoverable() {
                    warn!("Session {} command failed: {}", self.state.session_id, e);
                }
                render::error(&e)
            }
        };
        if changed {
            text.push_str(&self.after_change());
        }
        self.reply(text)
    }

    fn reply(&self, text: String) -> Reply {
        Reply {
            text,
            status: self.state.status,
        }
    }

    /// End the session if the deadline has passed.
    fn expire(&mut self) -> Option<String> {
        let now = self.clock.now();
        if self.state.is_over() || !engine::check_deadline(&self.state, now) {
            return None;
        }
        self.prompt = None;
        self.state.finish(SessionStatus::TimedOut);
        Some(render::time_up(&self.state, &self.world, now))
    }

    /// Achievements, then victory, then the deadline.
    fn after_change(&mut self) -> String {
        let now = self.clock.now();
        let awarded = achievements_check(&mut self.state, now);
        let mut text = render::unlocked(&self.state, &awarded);
        match engine::conclude(&mut self.state, now) {
            Some(SessionStatus::Won) => {
                self.prompt = None;
                text.push_str(&render::victory(&self.state, &self.world, now));
            }
            Some(SessionStatus::TimedOut) => {
                self.prompt = None;
                text.push_str(&render::time_up(&self.state, &self.world, now));
            }
            _ => {}
        }
        text
    }

    fn answer(&mut self, prompt: Prompt, line: &str) -> String {
        let yes = is_affirmative(line);
        match prompt {
            Prompt::EnterRoom { room } if yes => {
                let world = Arc::clone(&self.world);
                match engine::enter(&mut self.state, &world, &room) {
                    Ok(next) => {
                        let mut text =
                            format!("You enter {}. {}\n", next.name, next.description);
                        text.push_str(&self.after_change());
                        text
                    }
                    Err(e) => render::error(&e),
                }
            }
            Prompt::EnterRoom { .. } => format!("You stay in {}.\n", self.state.current_room),
            Prompt::ConfirmQuit if yes => {
                self.state.finish(SessionStatus::Quit);
                render::goodbye().to_string()
            }
            Prompt::ConfirmQuit => "Back to the game.\n".to_string(),
        }
    }

    fn dispatch(&mut self, command: GameCommand) -> Result<String, GameError> {
        let world = Arc::clone(&self.world);
        let now = self.clock.now();
        match command {
            GameCommand::Explore => {
                let seen = engine::explore(&self.state, &world)?;
                Ok(render::exploration(&seen))
            }
            GameCommand::Examine(name) => {
                let outcome = engine::examine(&mut self.state, &world, &name)?;
                if let ExamineOutcome::DoorUnlocked { leads_to, .. } = &outcome {
                    self.prompt = Some(Prompt::EnterRoom {
                        room: leads_to.name.clone(),
                    });
                }
                Ok(render::examine_outcome(&outcome))
            }
            GameCommand::Push(name) => {
                let outcome = engine::push(&mut self.state, &world, &name)?;
                Ok(render::push_outcome(&outcome))
            }
            GameCommand::Use(name) => {
                let outcome = engine::use_item(&self.state, &world, &name)?;
                Ok(render::use_outcome(&outcome))
            }
            GameCommand::Inventory => Ok(render::inventory(&self.state, &world)),
            GameCommand::Map => Ok(render::map(&world, &self.state)),
            GameCommand::Status => Ok(render::status(&self.state, &world, now)),
            GameCommand::Hint => {
                let hint = engine::hint(&mut self.state, &world, &mut self.rng)?;
                Ok(render::hint(&hint))
            }
            GameCommand::Achievements => Ok(render::achievements(&self.state)),
            GameCommand::Save => self.save(),
            GameCommand::Load => self.load(),
            GameCommand::Help => Ok(render::help_text().to_string()),
            GameCommand::Quit => {
                self.prompt = Some(Prompt::ConfirmQuit);
                Ok("Are you sure you want to quit? (yes/no)\n".to_string())
            }
        }
    }

    pub fn save(&mut self) -> Result<String, GameError> {
        let snapshot = Snapshot::capture(&self.state, self.clock.now());
        let path = self.store.save(&self.slot, &snapshot)?;
        info!(
            "Session {} saved to {}",
            self.state.session_id,
            path.display()
        );
        Ok(format!("Game saved to slot '{}'.\n", self.slot))
    }

    /// Replace the current state with the saved one. On any failure the
    /// current state is kept.
    pub fn load(&mut self) -> Result<String, GameError> {
        let snapshot = self.store.load(&self.slot)?;
        let restored = snapshot.restore(&self.world, self.clock.now())?;
        info!(
            "Session {} replaced by saved session {} from slot '{}'",
            self.state.session_id, restored.session_id, self.slot
        );
        self.state = restored;
        self.prompt = None;
        Ok(format!(
            "Game loaded from slot '{}'.\n{}\n",
            self.slot,
            render::location(&self.state)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DifficultyTable;
    use crate::game::timer::ManualClock;
    use crate::game::types::AchievementId;
    use tempfile::TempDir;

    fn session(dir: &TempDir, difficulty: Difficulty) -> (Session, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let settings = DifficultyTable::default().for_difficulty(difficulty);
        let session = Session::new(
            Arc::new(World::canonical()),
            difficulty,
            settings,
            clock.clone(),
            SaveStore::new(dir.path()),
            "test",
            Some(42),
        );
        (session, clock)
    }

    #[test]
    fn door_prompt_declined_keeps_room() {
        let dir = TempDir::new().unwrap();
        let (mut s, _clock) = session(&dir, Difficulty::Easy);
        s.handle_line("examine dresser");
        let reply = s.handle_line("examine door_to_bedroom1");
        assert!(reply.text.contains("(yes/no)"));
        assert_eq!(
            s.pending_prompt(),
            Some(&Prompt::EnterRoom {
                room: "bedroom1".into()
            })
        );
        let reply = s.handle_line("nope");
        assert!(reply.text.contains("stay in game_room"));
        assert_eq!(s.state().current_room, "game_room");
        assert!(s.pending_prompt().is_none());
    }

    #[test]
    fn quit_needs_confirmation() {
        let dir = TempDir::new().unwrap();
        let (mut s, _clock) = session(&dir, Difficulty::Easy);
        s.handle_line("quit");
        assert_eq!(s.handle_line("no").status, SessionStatus::Playing);
        s.handle_line("quit");
        let reply = s.handle_line("yes");
        assert_eq!(reply.status, SessionStatus::Quit);
        assert!(reply.is_final());
        assert!(s.handle_line("explore").text.contains("over"));
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let dir = TempDir::new().unwrap();
        let (mut s, _clock) = session(&dir, Difficulty::Normal);
        for line in ["dance", "examine unicorn", "use", "push couch", ""] {
            let reply = s.handle_line(line);
            assert_eq!(reply.status, SessionStatus::Playing, "{}", line);
        }
    }

    #[test]
    fn failed_commands_change_nothing() {
        let dir = TempDir::new().unwrap();
        for line in ["load", "examine unicorn", "examine door_to_bedroom1", "push sofa"] {
            let (mut s, clock) = session(&dir, Difficulty::Normal);
            clock.advance_secs(60);
            let before = s.state().clone();
            let reply = s.handle_line(line);
            assert_eq!(s.state(), &before, "{}", line);
            assert!(!reply.text.contains("Achievement unlocked"), "{}", reply.text);
        }
    }

    #[test]
    fn first_success_after_a_typo_is_judged_on_its_own_time() {
        let dir = TempDir::new().unwrap();
        let (mut s, clock) = session(&dir, Difficulty::Normal);
        s.handle_line("examine unicorn");
        clock.advance_secs(16 * 60);
        s.handle_line("examine dresser");
        let speed = &s.state().achievements[&AchievementId::SpeedRunner];
        assert!(!speed.unlocked);
    }

    #[test]
    fn watcher_tick_times_out_without_input() {
        let dir = TempDir::new().unwrap();
        let (mut s, clock) = session(&dir, Difficulty::Hard);
        assert!(s.tick().is_none());
        clock.advance_secs(301);
        let reply = s.tick().expect("deadline passed");
        assert_eq!(reply.status, SessionStatus::TimedOut);
        assert!(s.tick().is_none());
    }

    #[test]
    fn deadline_in_counts_down() {
        let dir = TempDir::new().unwrap();
        let (s, clock) = session(&dir, Difficulty::Hard);
        assert_eq!(s.deadline_in(), Some(Duration::from_millis(300_001)));
        clock.advance_secs(100);
        assert_eq!(s.deadline_in(), Some(Duration::from_millis(200_001)));
        let (easy, _) = session(&dir, Difficulty::Easy);
        assert_eq!(easy.deadline_in(), None);
    }
}
