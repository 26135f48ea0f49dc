mod common;

use common::new_session;
use escaperoom::game::{AchievementId, Difficulty, SessionStatus};

fn assert_untouched(line: &str, expect: &str) {
    let (mut s, _clock, _tmp) = new_session(Difficulty::Normal);
    let before = s.state().clone();
    let reply = s.handle_line(line);
    assert!(reply.text.contains(expect), "{}: {}", line, reply.text);
    assert!(!reply.text.contains("Achievement unlocked"), "{}", reply.text);
    assert_eq!(reply.status, SessionStatus::Playing);
    assert_eq!(s.state(), &before, "{} changed the state", line);
}

#[test]
fn load_with_no_save_changes_nothing() {
    assert_untouched("load", "No saved game");
}

#[test]
fn examining_something_absent_changes_nothing() {
    assert_untouched("examine unicorn", "unicorn");
}

#[test]
fn locked_door_changes_nothing() {
    assert_untouched("examine door_to_bedroom1", "locked");
}

#[test]
fn speed_runner_needs_a_successful_command_in_time() {
    let (mut s, clock, _tmp) = new_session(Difficulty::Normal);
    s.handle_line("examine unicorn");
    s.handle_line("examine door_to_bedroom1");
    clock.advance_secs(20 * 60);
    s.handle_line("examine dresser");
    assert!(!s.state().achievements[&AchievementId::SpeedRunner].unlocked);
    assert_eq!(s.state().achievements[&AchievementId::SpeedRunner].unlocked_at, None);
}
