//! Interaction engine: the rules behind explore, examine, push and use.
//!
//! Every operation takes the session's [`GameState`] and the shared [`World`]
//! explicitly and reports its result as a value. Failures the player can cause
//! come back as [`GameError`] and leave the state untouched, except that
//! examining furniture always records it as examined.

use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::game::errors::GameError;
use crate::game::state::GameState;
use crate::game::types::{Collected, Item, ItemKind, Room, SessionStatus};
use crate::game::world::World;

#[derive(Debug, Clone, PartialEq)]
pub struct Exploration<'w> {
    pub room: &'w Room,
    pub items: Vec<&'w Item>,
}

impl Exploration<'_> {
    pub fn item_names(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExamineOutcome<'w> {
    /// The player holds the key; `leads_to` is offered as a transition.
    DoorUnlocked { door: &'w Item, leads_to: &'w Room },
    /// Searching the furniture turned up a key or treasure.
    Found { furniture: &'w Item, item: &'w Item },
    NothingInteresting { furniture: &'w Item },
    /// A key or treasure lying loose in the room.
    PickedUp { item: &'w Item },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PushOutcome<'w> {
    Found { furniture: &'w Item, treasure: &'w Item },
    NothingHappens { item: &'w Item },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UseOutcome<'w> {
    /// Keys are used on doors; the player picks one.
    SelectDoor { key: &'w Item, door: Option<&'w Item> },
    Power { treasure: &'w Item, power: &'w str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub text: String,
    pub remaining: u32,
}

fn in_room<'w>(state: &GameState, world: &'w World, name: &str) -> Result<&'w Item, GameError> {
    world
        .find_in_room(&state.current_room, name)
        .ok_or_else(|| GameError::ItemNotFound(name.to_string()))
}

/// List what is in the current room. Read-only.
pub fn explore<'w>(state: &GameState, world: &'w World) -> Result<Exploration<'w>, GameError> {
    let room = world
        .room(&state.current_room)
        .ok_or_else(|| GameError::CorruptSave(format!("unknown room {}", state.current_room)))?;
    Ok(Exploration {
        room,
        items: world.items_in(&room.name),
    })
}

/// Examine something in the current room.
pub fn examine<'w>(
    state: &mut GameState,
    world: &'w World,
    name: &str,
) -> Result<ExamineOutcome<'w>, GameError> {
    let item = in_room(state, world, name)?;
    match &item.kind {
        ItemKind::Door { mechanism, .. } => {
            if !state.has_key_for(world, &item.name) {
                debug!("{} is locked", item.name);
                return Err(GameError::LockedDoor {
                    door: item.name.clone(),
                    mechanism: mechanism.clone(),
                });
            }
            let leads_to = world
                .other_room(&item.name, &state.current_room)
                .ok_or_else(|| {
                    GameError::InvalidCommand(format!("{} leads nowhere", item.name))
                })?;
            Ok(ExamineOutcome::DoorUnlocked {
                door: item,
                leads_to,
            })
        }
        ItemKind::Furniture { .. } => {
            state.examined_objects.insert(item.name.clone());
            let Some(found) = state.take_contents(world, &item.name) else {
                return Ok(ExamineOutcome::NothingInteresting { furniture: item });
            };
            match state.collect(found) {
                Collected::Added => Ok(ExamineOutcome::Found {
                    furniture: item,
                    item: found,
                }),
                Collected::AlreadyHeld => Err(GameError::AlreadyCollected(found.name.clone())),
            }
        }
        ItemKind::Key { .. } | ItemKind::Treasure { .. } => {
            state.examined_objects.insert(item.name.clone());
            match state.collect(item) {
                Collected::Added => Ok(ExamineOutcome::PickedUp { item }),
                Collected::AlreadyHeld => Err(GameError::AlreadyCollected(item.name.clone())),
            }
        }
    }
}

/// Walk through an unlocked door of the current room into `room`.
pub fn enter<'w>(state: &mut GameState, world: &'w World, room: &str) -> Result<&'w Room, GameError> {
    let door = world
        .doors_of(&state.current_room)
        .into_iter()
        .find(|door| {
            world
                .other_room(&door.name, &state.current_room)
                .is_some_and(|r| r.name == room)
        })
        .ok_or_else(|| GameError::ItemNotFound(room.to_string()))?;

    if !state.has_key_for(world, &door.name) {
        let mechanism = match &door.kind {
            ItemKind::Door { mechanism, .. } => mechanism.clone(),
            _ => String::new(),
        };
        return Err(GameError::LockedDoor {
            door: door.name.clone(),
            mechanism,
        });
    }

    let next = world
        .other_room(&door.name, &state.current_room)
        .ok_or_else(|| GameError::ItemNotFound(room.to_string()))?;
    info!(
        "Session {} moved {} -> {} via {}",
        state.session_id, state.current_room, next.name, door.name
    );
    state.current_room = next.name.clone();
    Ok(next)
}

/// Push something in the current room. Only pushable furniture hiding a
/// treasure reacts; it empties the same slot `examine` would.
pub fn push<'w>(
    state: &mut GameState,
    world: &'w World,
    name: &str,
) -> Result<PushOutcome<'w>, GameError> {
    let item = in_room(state, world, name)?;
    let ItemKind::Furniture { pushable: true, .. } = item.kind else {
        return Ok(PushOutcome::NothingHappens { item });
    };
    let Some(treasure) = world.contents_of(&item.name).filter(|i| i.is_treasure()) else {
        return Ok(PushOutcome::NothingHappens { item });
    };

    if state.holds(&treasure.name) {
        return Err(GameError::AlreadyCollected(treasure.name.clone()));
    }
    if state.take_contents(world, &item.name).is_none() {
        return Err(GameError::AlreadyCollected(treasure.name.clone()));
    }
    match state.collect(treasure) {
        Collected::Added => Ok(PushOutcome::Found {
            furniture: item,
            treasure,
        }),
        Collected::AlreadyHeld => Err(GameError::AlreadyCollected(treasure.name.clone())),
    }
}

/// Use something from the inventory. Never changes state.
pub fn use_item<'w>(
    state: &GameState,
    world: &'w World,
    name: &str,
) -> Result<UseOutcome<'w>, GameError> {
    if !state.inventory.iter().any(|held| held == name) {
        return Err(GameError::ItemNotFound(name.to_string()));
    }
    let item = world
        .item(name)
        .ok_or_else(|| GameError::ItemNotFound(name.to_string()))?;
    match &item.kind {
        ItemKind::Key { target, .. } => Ok(UseOutcome::SelectDoor {
            key: item,
            door: world.item(target),
        }),
        ItemKind::Treasure { power, .. } => Ok(UseOutcome::Power {
            treasure: item,
            power: power.as_str(),
        }),
        _ => Err(GameError::ItemNotFound(name.to_string())),
    }
}

pub fn check_victory(state: &GameState) -> bool {
    state.current_room == state.target_room
}

/// True once elapsed time exceeds the limit. Always false without a limit.
pub fn check_deadline(state: &GameState, now: DateTime<Utc>) -> bool {
    match state.time_limit {
        Some(limit) => (now - state.start_time).num_milliseconds() > (limit as i64) * 1000,
        None => false,
    }
}

/// Apply victory or time-out, victory first. Returns the new terminal status.
pub fn conclude(state: &mut GameState, now: DateTime<Utc>) -> Option<SessionStatus> {
    if state.is_over() {
        return None;
    }
    let status = if check_victory(state) {
        SessionStatus::Won
    } else if check_deadline(state, now) {
        SessionStatus::TimedOut
    } else {
        return None;
    };
    state.finish(status);
    Some(status)
}

/// Spend one hint on a nudge about the current room or overall progress.
pub fn hint<R: Rng + ?Sized>(
    state: &mut GameState,
    world: &World,
    rng: &mut R,
) -> Result<Hint, GameError> {
    if state.hints_remaining == 0 {
        return Err(GameError::NoHintsLeft);
    }

    let mut hints: Vec<String> = world
        .items_in(&state.current_room)
        .into_iter()
        .filter(|item| item.is_furniture() && state.has_unsearched_contents(world, &item.name))
        .map(|item| format!("There is something interesting about the {}...", item.name))
        .collect();

    if state.keys_collected.is_empty() {
        hints.push("Search the furniture in this room for keys.".to_string());
    } else if state.treasure_collected.len() < world.treasure_count() {
        hints.push("There are still hidden treasures to discover.".to_string());
    }
    if hints.is_empty() {
        for door in world.doors_of(&state.current_room) {
            if state.has_key_for(world, &door.name) {
                hints.push(format!("You can open the {}.", door.name));
            }
        }
    }
    if hints.is_empty() {
        hints.push("Keep moving: the way out is through a door you can open.".to_string());
    }

    let text = hints
        .choose(rng)
        .cloned()
        .unwrap_or_default();
    state.hints_remaining -= 1;
    debug!(
        "Session {} used a hint ({} left)",
        state.session_id, state.hints_remaining
    );
    Ok(Hint {
        text,
        remaining: state.hints_remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DifficultyTable;
    use crate::game::types::Difficulty;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

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
    fn explore_lists_room_in_order() {
        let (world, state) = setup();
        let before = state.clone();
        let seen = explore(&state, &world).unwrap();
        assert_eq!(seen.room.name, "game_room");
        assert_eq!(seen.item_names()[0], "couch");
        assert_eq!(state, before);
    }

    #[test]
    fn examine_is_room_scoped() {
        let (world, mut state) = setup();
        assert!(matches!(
            examine(&mut state, &world, "queen bed"),
            Err(GameError::ItemNotFound(name)) if name == "queen bed"
        ));
        assert!(state.examined_objects.is_empty());
    }

    #[test]
    fn empty_furniture_is_still_recorded() {
        let (world, mut state) = setup();
        let out = examine(&mut state, &world, "bookcase").unwrap();
        assert!(matches!(out, ExamineOutcome::NothingInteresting { .. }));
        assert!(state.examined_objects.contains("bookcase"));
        let again = examine(&mut state, &world, "bookcase").unwrap();
        assert!(matches!(again, ExamineOutcome::NothingInteresting { .. }));
        assert_eq!(state.examined_objects.len(), 1);
    }

    #[test]
    fn second_search_finds_nothing() {
        let (world, mut state) = setup();
        assert!(matches!(
            examine(&mut state, &world, "dresser").unwrap(),
            ExamineOutcome::Found { item, .. } if item.name == "bedroom1 key"
        ));
        assert!(matches!(
            examine(&mut state, &world, "dresser").unwrap(),
            ExamineOutcome::NothingInteresting { .. }
        ));
        assert_eq!(state.inventory, vec!["bedroom1 key".to_string()]);
    }

    #[test]
    fn enter_requires_key_and_adjacency() {
        let (world, mut state) = setup();
        assert!(matches!(
            enter(&mut state, &world, "bedroom1"),
            Err(GameError::LockedDoor { .. })
        ));
        assert!(matches!(
            enter(&mut state, &world, "livingroom"),
            Err(GameError::ItemNotFound(_))
        ));
        examine(&mut state, &world, "dresser").unwrap();
        assert_eq!(enter(&mut state, &world, "bedroom1").unwrap().name, "bedroom1");
        assert_eq!(state.current_room, "bedroom1");
    }

    #[test]
    fn push_ignores_ordinary_furniture() {
        let (world, mut state) = setup();
        assert!(matches!(
            push(&mut state, &world, "couch").unwrap(),
            PushOutcome::NothingHappens { .. }
        ));
        assert!(matches!(
            push(&mut state, &world, "door_to_bedroom1").unwrap(),
            PushOutcome::NothingHappens { .. }
        ));
        // The piano hides a treasure but is not pushable.
        assert!(matches!(
            push(&mut state, &world, "piano").unwrap(),
            PushOutcome::NothingHappens { .. }
        ));
        assert!(matches!(
            push(&mut state, &world, "dining table"),
            Err(GameError::ItemNotFound(_))
        ));
        assert!(state.inventory.is_empty());
    }

    #[test]
    fn use_is_inventory_scoped() {
        let (world, mut state) = setup();
        assert!(matches!(
            use_item(&state, &world, "bedroom1 key"),
            Err(GameError::ItemNotFound(_))
        ));
        examine(&mut state, &world, "dresser").unwrap();
        examine(&mut state, &world, "piano").unwrap();
        match use_item(&state, &world, "bedroom1 key").unwrap() {
            UseOutcome::SelectDoor { key, door } => {
                assert_eq!(key.name, "bedroom1 key");
                assert_eq!(door.unwrap().name, "door_to_bedroom1");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            use_item(&state, &world, "golden compass").unwrap(),
            UseOutcome::Power { power, .. } if power.contains("exit")
        ));
    }

    #[test]
    fn deadline_is_strictly_after_limit() {
        let (_world, mut state) = setup();
        state.time_limit = Some(5);
        let start = state.start_time;
        assert!(!check_deadline(&state, start + chrono::Duration::seconds(5)));
        assert!(check_deadline(&state, start + chrono::Duration::milliseconds(5001)));
        state.time_limit = None;
        assert!(!check_deadline(&state, start + chrono::Duration::days(7)));
    }

    #[test]
    fn conclude_prefers_victory() {
        let (_world, mut state) = setup();
        state.time_limit = Some(1);
        state.current_room = state.target_room.clone();
        let late = state.start_time + chrono::Duration::seconds(10);
        assert_eq!(conclude(&mut state, late), Some(SessionStatus::Won));
        assert_eq!(conclude(&mut state, late), None);
    }

    #[test]
    fn hints_run_out() {
        let (world, mut state) = setup();
        let mut rng = StdRng::seed_from_u64(7);
        for left in (0..3).rev() {
            let h = hint(&mut state, &world, &mut rng).unwrap();
            assert_eq!(h.remaining, left);
            assert!(!h.text.is_empty());
        }
        assert!(matches!(
            hint(&mut state, &world, &mut rng),
            Err(GameError::NoHintsLeft)
        ));
    }

    #[test]
    fn hints_point_at_unsearched_furniture() {
        let (world, mut state) = setup();
        state.hints_remaining = 50;
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let h = hint(&mut state, &world, &mut rng).unwrap();
            assert!(
                h.text.contains("piano")
                    || h.text.contains("dresser")
                    || h.text.contains("keys"),
                "unexpected hint: {}",
                h.text
            );
        }
    }
}
