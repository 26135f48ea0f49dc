//! Plain-text presentation of engine results. Nothing here changes state.

use chrono::{DateTime, Utc};

use crate::game::engine::{ExamineOutcome, Exploration, Hint, PushOutcome, UseOutcome};
use crate::game::errors::GameError;
use crate::game::score::breakdown;
use crate::game::state::GameState;
use crate::game::timer::format_elapsed;
use crate::game::types::{AchievementId, Item, ItemKind};
use crate::game::world::World;

const CELL_WIDTH: usize = 14;

pub fn banner() -> &'static str {
    "==============================\n  ESCAPE ROOM\n==============================\n"
}

pub fn intro(state: &GameState) -> String {
    let mut out = String::new();
    out.push_str(banner());
    out.push_str("You wake up on a couch in a strange house with no windows.\n");
    out.push_str("You don't remember how you got here. Find a way out.\n");
    match state.time_limit {
        Some(limit) => out.push_str(&format!(
            "Difficulty: {}. You have {} to escape.\n",
            state.difficulty,
            format_elapsed(limit)
        )),
        None => out.push_str(&format!(
            "Difficulty: {}. Take your time, and look for treasure.\n",
            state.difficulty
        )),
    }
    out.push_str("Type 'help' for commands.\n");
    out
}

pub fn help_text() -> &'static str {
    "Commands:\n\
     explore            list what is in this room\n\
     examine <item>     look closely (search furniture, try doors)\n\
     push <item>        push something\n\
     use <item>         use something you carry\n\
     inventory          what you carry\n\
     map                where you are\n\
     status             time, score and progress\n\
     hint               spend a hint\n\
     achievements       your achievements\n\
     save / load        save or restore your game\n\
     help               this list\n\
     quit               give up\n"
}

pub fn location(state: &GameState) -> String {
    format!("You are in {}.", state.current_room)
}

pub fn exploration(seen: &Exploration<'_>) -> String {
    let mut out = format!("You explore {}. {}\n", seen.room.name, seen.room.description);
    if seen.items.is_empty() {
        out.push_str("There is nothing here.\n");
    } else {
        out.push_str(&format!("You find: {}\n", seen.item_names().join(", ")));
    }
    out
}

pub fn examine_outcome(outcome: &ExamineOutcome<'_>) -> String {
    match outcome {
        ExamineOutcome::DoorUnlocked { door, leads_to } => format!(
            "You examine {}. You unlock it with a key you have.\nGo through to {}? (yes/no)\n",
            door.name, leads_to.name
        ),
        ExamineOutcome::Found { furniture, item } => {
            let mut out = format!("You examine {}. {}\n", furniture.name, furniture.description);
            if let ItemKind::Furniture {
                interaction: Some(text),
                ..
            } = &furniture.kind
            {
                out.push_str(text);
                out.push('\n');
            }
            out.push_str(&found_item(item));
            out
        }
        ExamineOutcome::NothingInteresting { furniture } => format!(
            "You examine {}. {}\nThere isn't anything interesting about it.\n",
            furniture.name, furniture.description
        ),
        ExamineOutcome::PickedUp { item } => {
            format!("You pick up the {}.\n{}", item.name, found_item(item))
        }
    }
}

fn found_item(item: &Item) -> String {
    match &item.kind {
        ItemKind::Key { hint, story, .. } => {
            let mut out = format!("You find the {}!\n", item.name);
            for line in [hint, story] {
                if !line.is_empty() {
                    out.push_str(line);
                    out.push('\n');
                }
            }
            out
        }
        ItemKind::Treasure { power, value } => format!(
            "*** You found a treasure: {}! ***\n{}\nPower: {} ({} points)\n",
            item.name, item.description, power, value
        ),
        _ => format!("You find the {}.\n", item.name),
    }
}

pub fn push_outcome(outcome: &PushOutcome<'_>) -> String {
    match outcome {
        PushOutcome::Found {
            furniture,
            treasure,
        } => format!("You push the {}.\n{}", furniture.name, found_item(treasure)),
        PushOutcome::NothingHappens { item } => {
            format!("You push the {}. Nothing happens.\n", item.name)
        }
    }
}

pub fn use_outcome(outcome: &UseOutcome<'_>) -> String {
    match outcome {
        UseOutcome::SelectDoor { key, door } => match door {
            Some(door) => format!(
                "The {} belongs in a door. Examine {} to use it.\n",
                key.name, door.name
            ),
            None => format!("Select a door to use the {} on.\n", key.name),
        },
        UseOutcome::Power { treasure, power } => {
            format!("You use the power of the {}: {}\n", treasure.name, power)
        }
    }
}

pub fn hint(h: &Hint) -> String {
    format!("Hint: {}\nHints left: {}\n", h.text, h.remaining)
}

/// Player-facing text for an engine error.
pub fn error(err: &GameError) -> String {
    match err {
        GameError::InvalidCommand(msg) => format!("{}\n", msg),
        GameError::ItemNotFound(name) => {
            format!("There is no '{}' here.\n", name)
        }
        GameError::LockedDoor { door, mechanism } => {
            format!("You examine {}. It is locked and you don't have the key. {}\n", door, mechanism)
        }
        GameError::AlreadyCollected(name) => {
            format!("You already found the {} here.\n", name)
        }
        GameError::NoSavedSession(_) => "No saved game found.\n".to_string(),
        GameError::NoHintsLeft => "You have no hints left.\n".to_string(),
        GameError::CorruptSave(_) => "The saved game could not be read.\n".to_string(),
        GameError::SessionOver => "The game is over.\n".to_string(),
        other => format!("Something went wrong: {}\n", other),
    }
}

pub fn status(state: &GameState, world: &World, now: DateTime<Utc>) -> String {
    let score = breakdown(state, world, now);
    let mut out = String::from("=== STATUS ===\n");
    out.push_str(&format!("Room: {}\n", state.current_room));
    out.push_str(&format!("Time: {}", format_elapsed(state.elapsed(now))));
    if let Some(left) = state.remaining(now) {
        out.push_str(&format!(" (left {})", format_elapsed(left)));
    }
    out.push('\n');
    out.push_str(&format!("Score: {}\n", score.total));
    out.push_str(&format!("Inventory: {}\n", list_or(&state.inventory, "empty")));
    out.push_str(&format!(
        "Keys: {}\n",
        list_or(state.keys_collected.iter(), "none")
    ));
    out.push_str(&format!(
        "Treasures: {}/{}\n",
        state.treasure_collected.len(),
        world.treasure_count()
    ));
    out.push_str(&format!("Hints left: {}\n", state.hints_remaining));
    out
}

fn list_or<'a, I>(names: I, empty: &str) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let joined: Vec<&str> = names.into_iter().map(String::as_str).collect();
    if joined.is_empty() {
        empty.to_string()
    } else {
        joined.join(", ")
    }
}

pub fn inventory(state: &GameState, world: &World) -> String {
    let items = state.inventory_items(world);
    if items.is_empty() {
        return "Your inventory is empty.\n".to_string();
    }
    let mut out = String::from("=== INVENTORY ===\n");
    for (idx, item) in items.iter().enumerate() {
        out.push_str(&format!("{}. {} - {}\n", idx + 1, item.name, item.description));
        if let ItemKind::Treasure { power, .. } = &item.kind {
            out.push_str(&format!("   Power: {}\n", power));
        }
    }
    out
}

pub fn achievements(state: &GameState) -> String {
    let mut out = String::from("=== ACHIEVEMENTS ===\n");
    for achievement in state.achievements.values() {
        let mark = if achievement.unlocked { "✓" } else { "✗" };
        out.push_str(&format!(
            "{} {}: {}\n",
            mark, achievement.name, achievement.description
        ));
    }
    out
}

pub fn unlocked(state: &GameState, ids: &[AchievementId]) -> String {
    ids.iter()
        .filter_map(|id| state.achievements.get(id))
        .map(|a| format!("*** Achievement unlocked: {}! ***\n", a.name))
        .collect()
}

/// Grid of rooms by layout cell; the current room is marked with `@`.
pub fn map(world: &World, state: &GameState) -> String {
    let cols = world.rooms().iter().map(|r| r.layout.0).max().unwrap_or(0) as usize + 1;
    let rows = world.rooms().iter().map(|r| r.layout.1).max().unwrap_or(0) as usize + 1;
    let border = format!("+{}\n", format!("{}+", "-".repeat(CELL_WIDTH)).repeat(cols));

    let mut out = String::from("=== MAP ===\n");
    out.push_str(&border);
    for row in 0..rows {
        out.push('|');
        for col in 0..cols {
            let label = world
                .rooms()
                .iter()
                .find(|r| r.layout == (col as u8, row as u8))
                .map(|r| {
                    if r.name == state.current_room {
                        format!("@{}", r.name)
                    } else {
                        r.name.clone()
                    }
                })
                .unwrap_or_default();
            let label: String = label.chars().take(CELL_WIDTH).collect();
            out.push_str(&format!("{:<width$}|", label, width = CELL_WIDTH));
        }
        out.push('\n');
        out.push_str(&border);
    }
    out.push_str("@ = you\n");
    out
}

pub fn victory(state: &GameState, world: &World, now: DateTime<Utc>) -> String {
    let score = breakdown(state, world, now);
    let mut out = String::from(
        "==============================\n  CONGRATULATIONS!\n  YOU ESCAPED!\n==============================\n",
    );
    out.push_str(&format!("Total time: {}\n", format_elapsed(state.elapsed(now))));
    out.push_str(&format!(
        "Final score: {} (time {} + treasures {} + achievements {}, x{:.1})\n",
        score.total,
        score.time,
        score.treasures,
        score.achievements,
        score.multiplier_pct as f64 / 100.0
    ));
    out.push_str(&format!(
        "Treasures found: {}/{}\n",
        state.treasure_collected.len(),
        world.treasure_count()
    ));
    for name in &state.treasure_collected {
        if let Some(ItemKind::Treasure { power, .. }) = world.item(name).map(|i| &i.kind) {
            out.push_str(&format!("  - {}: {}\n", name, power));
        }
    }
    let unlocked: Vec<&str> = state
        .achievements
        .values()
        .filter(|a| a.unlocked)
        .map(|a| a.name.as_str())
        .collect();
    if !unlocked.is_empty() {
        out.push_str("Achievements:\n");
        for name in unlocked {
            out.push_str(&format!("  ✓ {}\n", name));
        }
    }
    out.push_str("Thanks for playing!\n");
    out
}

pub fn time_up(state: &GameState, world: &World, now: DateTime<Utc>) -> String {
    format!(
        "Time's up! You failed to escape in time.\n==============================\n  GAME OVER\n==============================\nScore: {}\n",
        breakdown(state, world, now).total
    )
}

pub fn goodbye() -> &'static str {
    "==============================\n  GAME OVER\n==============================\nThanks for playing!\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DifficultyTable;
    use crate::game::engine;
    use crate::game::types::Difficulty;

    fn setup() -> (World, GameState) {
        let world = World::canonical();
        let state = GameState::new(
            &world,
            Difficulty::Normal,
            DifficultyTable::default().normal,
            Utc::now(),
        );
        (world, state)
    }

    #[test]
    fn map_marks_current_room() {
        let (world, state) = setup();
        let drawn = map(&world, &state);
        assert!(drawn.contains("@game_room"));
        assert!(drawn.contains("livingroom"));
        assert!(!drawn.contains("@outside"));
        let widths: Vec<usize> = drawn
            .lines()
            .filter(|l| l.starts_with('|') || l.starts_with('+'))
            .map(|l| l.chars().count())
            .collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "ragged map:\n{}", drawn);
    }

    #[test]
    fn status_shows_progress() {
        let (world, mut state) = setup();
        engine::examine(&mut state, &world, "dresser").unwrap();
        let text = status(&state, &world, state.start_time);
        assert!(text.contains("Room: game_room"));
        assert!(text.contains("Keys: bedroom1 key"));
        assert!(text.contains("Treasures: 0/3"));
        assert!(text.contains("left 30:00"));
    }

    #[test]
    fn outside_still_shows_the_door() {
        let (world, mut state) = setup();
        state.current_room = "outside".into();
        let seen = engine::explore(&state, &world).unwrap();
        // The door is still visible from outside.
        assert!(exploration(&seen).contains("door_to_outside"));
    }

    #[test]
    fn locked_door_message_names_mechanism() {
        let (world, mut state) = setup();
        let err = engine::examine(&mut state, &world, "door_to_bedroom1").unwrap_err();
        let text = error(&err);
        assert!(text.contains("locked"));
        assert!(text.contains("keyhole"));
    }
}
