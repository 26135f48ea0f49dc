mod common;

use std::time::Duration;

use common::{new_session, session_with};
use escaperoom::config::DifficultySettings;
use escaperoom::game::{DeadlineWatcher, Difficulty, SessionStatus};

#[test]
fn hard_mode_times_out_before_the_command_runs() {
    let (mut s, clock, _tmp) = new_session(Difficulty::Hard);
    clock.advance_secs(299);
    assert_eq!(s.handle_line("explore").status, SessionStatus::Playing);

    clock.advance_secs(2);
    let reply = s.handle_line("examine dresser");
    assert_eq!(reply.status, SessionStatus::TimedOut);
    assert!(reply.text.contains("Time's up"), "{}", reply.text);
    assert!(s.state().inventory.is_empty());
    assert!(s.state().time_up());
}

#[test]
fn watcher_path_times_out_without_input() {
    let settings = DifficultySettings {
        time_limit_secs: Some(5),
        hints: 1,
        deadline_watcher: true,
    };
    let (mut s, clock, _tmp) = session_with(Difficulty::Hard, settings);
    clock.advance_secs(5);
    assert!(s.tick().is_none(), "deadline is strict");
    clock.advance_secs(1);
    let reply = s.tick().expect("timed out");
    assert_eq!(reply.status, SessionStatus::TimedOut);
    assert!(s.handle_line("explore").text.contains("over"));
}

#[test]
fn easy_mode_never_times_out() {
    let (mut s, clock, _tmp) = new_session(Difficulty::Easy);
    clock.advance_secs(7 * 24 * 3600);
    assert!(s.tick().is_none());
    assert_eq!(s.handle_line("explore").status, SessionStatus::Playing);
    assert!(!s.handle_line("status").text.contains("(left"));
}

#[test]
fn escaping_at_the_last_second_still_wins() {
    let (mut s, clock, _tmp) = new_session(Difficulty::Hard);
    s.handle_line("examine dresser");
    s.handle_line("examine door_to_bedroom1");
    clock.advance_secs(300);
    // Still inside the limit; the move itself does not end the game.
    assert_eq!(s.handle_line("yes").status, SessionStatus::Playing);
    assert_eq!(s.state().current_room, "bedroom1");
}

#[tokio::test]
async fn watcher_fires_after_its_duration() {
    let watcher = DeadlineWatcher::spawn(Duration::from_millis(30));
    assert!(!watcher.is_expired());
    tokio::time::timeout(Duration::from_secs(5), watcher.fired())
        .await
        .expect("watcher fired");
    assert!(watcher.is_expired());
}

#[tokio::test]
async fn dropped_watcher_never_fires() {
    let watcher = DeadlineWatcher::spawn(Duration::from_secs(3600));
    watcher.cancel();
    let waited = tokio::time::timeout(Duration::from_millis(50), watcher.fired()).await;
    assert!(waited.is_err());
    assert!(!watcher.is_expired());
}
