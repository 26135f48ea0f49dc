mod common;

use common::{go_through, new_session};
use escaperoom::game::{AchievementId, Difficulty};

#[test]
fn treasure_hunter_unlocks_on_the_third_treasure_only() {
    let (mut s, clock, _tmp) = new_session(Difficulty::Easy);
    // Too late for Speed Runner, so only Treasure Hunter can show up.
    clock.advance_secs(1000);

    let first = s.handle_line("examine piano");
    assert!(!first.text.contains("Achievement unlocked"), "{}", first.text);
    s.handle_line("examine dresser");
    go_through(&mut s, "door_to_bedroom1");
    let second = s.handle_line("examine nightstand");
    assert!(!second.text.contains("Treasure Hunter"));
    s.handle_line("examine queen bed");
    go_through(&mut s, "door_to_bedroom2");
    s.handle_line("examine double bed");
    go_through(&mut s, "door_to_bedroom2");
    go_through(&mut s, "door_to_livingroom");

    let third = s.handle_line("push dining table");
    assert!(third.text.contains("Achievement unlocked: Treasure Hunter!"), "{}", third.text);
    assert!(s.state().achievements[&AchievementId::TreasureHunter].unlocked);

    let later = s.handle_line("examine sofa");
    assert!(!later.text.contains("Achievement unlocked"), "{}", later.text);
    assert!(!s.state().achievements[&AchievementId::SpeedRunner].unlocked);
}

#[test]
fn master_explorer_after_fifteen_pieces() {
    let (mut s, clock, _tmp) = new_session(Difficulty::Easy);
    clock.advance_secs(1000);

    let mut unlocked_at = None;
    let mut examine = |s: &mut escaperoom::game::Session, name: &str| {
        let reply = s.handle_line(&format!("examine {}", name));
        if reply.text.contains("Master Explorer") {
            assert!(unlocked_at.is_none(), "reported twice");
            unlocked_at = Some(s.state().examined_objects.len());
        }
    };

    for name in ["couch", "piano", "dresser", "bookcase"] {
        examine(&mut s, name);
    }
    go_through(&mut s, "door_to_bedroom1");
    for name in ["queen bed", "nightstand", "desk", "armchair"] {
        examine(&mut s, name);
    }
    go_through(&mut s, "door_to_bedroom2");
    for name in ["double bed", "vanity", "wardrobe", "rocking chair"] {
        examine(&mut s, name);
    }
    go_through(&mut s, "door_to_bedroom2");
    go_through(&mut s, "door_to_livingroom");
    for name in ["dining table", "fireplace", "sofa", "grandfather clock"] {
        examine(&mut s, name);
    }

    assert_eq!(unlocked_at, Some(15));
    assert_eq!(s.state().examined_objects.len(), 16);
    let listing = s.handle_line("achievements").text;
    assert!(listing.contains("✓ Master Explorer"), "{}", listing);
    assert!(listing.contains("✗ Speed Runner"), "{}", listing);
}

#[test]
fn speed_runner_on_first_progress() {
    let (mut s, _clock, _tmp) = new_session(Difficulty::Normal);
    // Read-only commands do not trigger a check.
    assert!(!s.handle_line("explore").text.contains("Achievement"));
    let reply = s.handle_line("examine couch");
    assert!(reply.text.contains("Achievement unlocked: Speed Runner!"), "{}", reply.text);
}
