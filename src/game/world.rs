//! Static world graph: rooms, the doors between them, and the furniture that
//! hides keys and treasures.
//!
//! A [`World`] is immutable once built. Everything a playthrough consumes
//! (searched furniture, collected items) lives in
//! [`GameState`](crate::game::state::GameState), so one world can back any
//! number of sessions.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::game::errors::WorldError;
use crate::game::types::{Item, ItemKind, Room};

pub const CANONICAL_START_ROOM: &str = "game_room";
pub const CANONICAL_TARGET_ROOM: &str = "outside";

#[derive(Debug, Clone)]
pub struct World {
    rooms: Vec<Room>,
    room_index: HashMap<String, usize>,
    items: BTreeMap<String, Item>,
    start_room: String,
    target_room: String,
}

/// Serializable form of a world, used for JSON seeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorldSeed {
    pub start_room: String,
    pub target_room: String,
    pub rooms: Vec<Room>,
    pub items: Vec<Item>,
}

impl World {
    /// Build and validate a world.
    pub fn new(
        start_room: &str,
        target_room: &str,
        rooms: Vec<Room>,
        items: Vec<Item>,
    ) -> Result<Self, WorldError> {
        let mut room_index = HashMap::new();
        for (idx, room) in rooms.iter().enumerate() {
            if room_index.insert(room.name.clone(), idx).is_some() {
                return Err(WorldError::DuplicateRoom(room.name.clone()));
            }
        }
        let mut item_map = BTreeMap::new();
        for item in items {
            let name = item.name.clone();
            if item_map.insert(name.clone(), item).is_some() {
                return Err(WorldError::DuplicateItem(name));
            }
        }
        let world = Self {
            rooms,
            room_index,
            items: item_map,
            start_room: start_room.to_string(),
            target_room: target_room.to_string(),
        };
        world.validate()?;
        Ok(world)
    }

    pub fn from_seed(seed: WorldSeed) -> Result<Self, WorldError> {
        Self::new(&seed.start_room, &seed.target_room, seed.rooms, seed.items)
    }

    pub fn to_seed(&self) -> WorldSeed {
        WorldSeed {
            start_room: self.start_room.clone(),
            target_room: self.target_room.clone(),
            rooms: self.rooms.clone(),
            items: self.items.values().cloned().collect(),
        }
    }

    pub fn start_room(&self) -> &str {
        &self.start_room
    }

    pub fn target_room(&self) -> &str {
        &self.target_room
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, name: &str) -> Option<&Room> {
        self.room_index.get(name).map(|&idx| &self.rooms[idx])
    }

    pub fn item(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Items visible in `room`, in authoring order. Unknown rooms yield nothing.
    pub fn items_in(&self, room: &str) -> Vec<&Item> {
        self.room(room)
            .map(|r| r.items.iter().filter_map(|n| self.items.get(n)).collect())
            .unwrap_or_default()
    }

    /// Look up `name` among the items of `room` only.
    pub fn find_in_room(&self, room: &str, name: &str) -> Option<&Item> {
        let room = self.room(room)?;
        if room.items.iter().any(|n| n == name) {
            self.items.get(name)
        } else {
            None
        }
    }

    /// Both endpoints of a door.
    pub fn rooms_of(&self, door: &str) -> Option<(&Room, &Room)> {
        match &self.items.get(door)?.kind {
            ItemKind::Door { rooms, .. } => Some((self.room(&rooms[0])?, self.room(&rooms[1])?)),
            _ => None,
        }
    }

    /// The endpoint of `door` that is not `current`, or `None` when `current`
    /// is not one of its endpoints.
    pub fn other_room(&self, door: &str, current: &str) -> Option<&Room> {
        let (a, b) = self.rooms_of(door)?;
        if a.name == current {
            Some(b)
        } else if b.name == current {
            Some(a)
        } else {
            None
        }
    }

    /// What a piece of furniture hides, ignoring whether it was already searched.
    pub fn contents_of(&self, furniture: &str) -> Option<&Item> {
        match &self.items.get(furniture)?.kind {
            ItemKind::Furniture {
                contents: Some(inner),
                ..
            } => self.items.get(inner),
            _ => None,
        }
    }

    /// The key that opens `door`.
    pub fn door_key(&self, door: &str) -> Option<&Item> {
        self.items
            .values()
            .find(|item| matches!(&item.kind, ItemKind::Key { target, .. } if target == door))
    }

    /// Doors in `room` that lead somewhere.
    pub fn doors_of(&self, room: &str) -> Vec<&Item> {
        self.items_in(room)
            .into_iter()
            .filter(|item| item.is_door())
            .collect()
    }

    pub fn treasures(&self) -> impl Iterator<Item = &Item> {
        self.items.values().filter(|i| i.is_treasure())
    }

    pub fn treasure_count(&self) -> usize {
        self.treasures().count()
    }

    pub fn furniture_count(&self) -> usize {
        self.items.values().filter(|i| i.is_furniture()).count()
    }

    /// Check the authoring invariants. Called by [`World::new`].
    pub fn validate(&self) -> Result<(), WorldError> {
        for name in [&self.start_room, &self.target_room] {
            if self.room(name).is_none() {
                return Err(WorldError::UnknownRoom(name.clone()));
            }
        }
        if self.start_room == self.target_room {
            return Err(WorldError::StartIsTarget(self.start_room.clone()));
        }

        for room in &self.rooms {
            for item in &room.items {
                if !self.items.contains_key(item) {
                    return Err(WorldError::UnknownItem {
                        room: room.name.clone(),
                        item: item.clone(),
                    });
                }
            }
        }

        let mut hidden = BTreeSet::new();
        for item in self.items.values() {
            match &item.kind {
                ItemKind::Door { rooms, .. } => {
                    if rooms[0] == rooms[1] {
                        return Err(WorldError::DoorLoop(item.name.clone()));
                    }
                    for endpoint in rooms {
                        let room = self
                            .room(endpoint)
                            .ok_or_else(|| WorldError::UnknownRoom(endpoint.clone()))?;
                        if !room.items.contains(&item.name) {
                            return Err(WorldError::DoorNotListed {
                                door: item.name.clone(),
                                room: endpoint.clone(),
                            });
                        }
                    }
                }
                ItemKind::Furniture {
                    contents: Some(inner),
                    ..
                } => {
                    let ok = self.items.get(inner).is_some_and(Item::is_collectible);
                    if !ok {
                        return Err(WorldError::BadContents {
                            holder: item.name.clone(),
                            item: inner.clone(),
                        });
                    }
                    if !hidden.insert(inner.clone()) {
                        return Err(WorldError::HiddenTwice(inner.clone()));
                    }
                }
                ItemKind::Key { target, .. } => {
                    if !self.items.get(target).is_some_and(Item::is_door) {
                        return Err(WorldError::BadKeyTarget {
                            key: item.name.clone(),
                            target: target.clone(),
                        });
                    }
                }
                _ => {}
            }
        }

        if !self.target_reachable() {
            return Err(WorldError::Unreachable {
                start: self.start_room.clone(),
                target: self.target_room.clone(),
            });
        }
        Ok(())
    }

    /// Fixpoint over reachable rooms: collect every key findable in them,
    /// then walk through the doors those keys open.
    fn target_reachable(&self) -> bool {
        let mut reachable: BTreeSet<&str> = BTreeSet::new();
        reachable.insert(self.start_room.as_str());
        loop {
            let mut keys: BTreeSet<&str> = BTreeSet::new();
            for room in &reachable {
                for item in self.items_in(room) {
                    let found = match &item.kind {
                        ItemKind::Furniture { .. } => self.contents_of(&item.name),
                        ItemKind::Key { .. } => Some(item),
                        _ => None,
                    };
                    if let Some(Item {
                        kind: ItemKind::Key { target, .. },
                        ..
                    }) = found
                    {
                        keys.insert(target.as_str());
                    }
                }
            }

            let before = reachable.len();
            let current: Vec<&str> = reachable.iter().copied().collect();
            for room in current {
                for door in self.doors_of(room) {
                    if keys.contains(door.name.as_str()) {
                        if let Some(next) = self.other_room(&door.name, room) {
                            reachable.insert(next.name.as_str());
                        }
                    }
                }
            }
            if reachable.contains(self.target_room.as_str()) {
                return true;
            }
            if reachable.len() == before {
                return false;
            }
        }
    }

    /// The built-in mansion.
    pub fn canonical() -> Self {
        let (rooms, items) = canonical_world_seed();
        // The canonical layout is covered by tests; a failure here is a programming error.
        Self::new(CANONICAL_START_ROOM, CANONICAL_TARGET_ROOM, rooms, items)
            .unwrap_or_else(|e| panic!("canonical world is invalid: {}", e))
    }
}

/// Rooms and items of the built-in mansion.
pub fn canonical_world_seed() -> (Vec<Room>, Vec<Item>) {
    let rooms = vec![
        Room::new(
            "game_room",
            "A windowless game room. A worn couch faces an old piano; a dresser and a bookcase line the walls.",
            (0, 0),
        )
        .with_items(&["couch", "piano", "dresser", "bookcase", "door_to_bedroom1"]),
        Room::new(
            "bedroom1",
            "A tidy bedroom with a queen bed, a nightstand, a writing desk and a reading armchair.",
            (0, 1),
        )
        .with_items(&[
            "queen bed",
            "nightstand",
            "desk",
            "armchair",
            "door_to_bedroom1",
            "door_to_bedroom2",
            "door_to_livingroom",
        ]),
        Room::new(
            "bedroom2",
            "A dusty guest bedroom. A double bed, a vanity, a wardrobe and a rocking chair.",
            (0, 2),
        )
        .with_items(&[
            "double bed",
            "vanity",
            "wardrobe",
            "rocking chair",
            "door_to_bedroom2",
        ]),
        Room::new(
            "livingroom",
            "A grand living room. A long dining table sits before a cold fireplace; a grandfather clock ticks by the sofa.",
            (1, 1),
        )
        .with_items(&[
            "dining table",
            "fireplace",
            "sofa",
            "grandfather clock",
            "door_to_livingroom",
            "door_to_outside",
        ]),
        Room::new(
            "outside",
            "Fresh air and open sky. You made it out of the house.",
            (2, 1),
        )
        .with_items(&["door_to_outside"]),
    ];

    let items = vec![
        // game_room
        Item::furniture("couch", "A lumpy couch. You woke up on it.")
            .with_interaction("You run your hands between the cushions."),
        Item::furniture("piano", "An upright piano with yellowed keys.")
            .with_interaction("You lift the lid and peer inside.")
            .holding("golden compass"),
        Item::furniture("dresser", "A heavy oak dresser with three drawers.")
            .with_interaction("You pull open every drawer.")
            .holding("bedroom1 key"),
        Item::furniture("bookcase", "Shelves of mouldy paperbacks."),
        // bedroom1
        Item::furniture("queen bed", "A neatly made queen bed.")
            .with_interaction("You lift the mattress.")
            .holding("bedroom2 key"),
        Item::furniture("nightstand", "A nightstand with a single drawer.")
            .with_interaction("The drawer sticks, then slides open.")
            .holding("ruby pendant"),
        Item::furniture("desk", "A writing desk covered in ink stains."),
        Item::furniture("armchair", "A threadbare armchair."),
        // bedroom2
        Item::furniture("double bed", "A double bed with a faded quilt.")
            .with_interaction("You shake out the quilt.")
            .holding("livingroom key"),
        Item::furniture("vanity", "A vanity with a cracked mirror.")
            .with_interaction("You check behind the mirror.")
            .holding("front door key"),
        Item::furniture("wardrobe", "A tall wardrobe full of moth-eaten coats."),
        Item::furniture("rocking chair", "A rocking chair that creaks on its own."),
        // livingroom
        Item::furniture("dining table", "A long dining table, heavier than it looks.")
            .with_interaction("Something rattles underneath when you lean on it.")
            .holding("crystal hourglass")
            .pushable(),
        Item::furniture("fireplace", "A cold fireplace full of old ash."),
        Item::furniture("sofa", "A velvet sofa."),
        Item::furniture("grandfather clock", "A grandfather clock, stopped at midnight."),
        // doors
        Item::door(
            "door_to_bedroom1",
            "A white door between the game room and the first bedroom.",
            "game_room",
            "bedroom1",
            "A brass keyhole sits under the handle.",
        ),
        Item::door(
            "door_to_bedroom2",
            "A narrow door into the guest bedroom.",
            "bedroom1",
            "bedroom2",
            "The lock is stiff and old.",
        ),
        Item::door(
            "door_to_livingroom",
            "A double door leading to the living room.",
            "bedroom1",
            "livingroom",
            "An iron padlock hangs from the handles.",
        ),
        Item::door(
            "door_to_outside",
            "The front door. Daylight leaks under it.",
            "livingroom",
            "outside",
            "A deadbolt with an ornate keyhole.",
        ),
        // keys
        Item::key("bedroom1 key", "A small brass key.", "door_to_bedroom1").with_lore(
            "It looks like it fits a door nearby.",
            "Scratched into the bow: 'B1'.",
        ),
        Item::key("bedroom2 key", "A rusty iron key.", "door_to_bedroom2").with_lore(
            "The guest room has been locked for years.",
            "A paper tag reads 'guests'.",
        ),
        Item::key("livingroom key", "A padlock key on a red ribbon.", "door_to_livingroom")
            .with_lore(
                "A padlock somewhere is waiting for this.",
                "The ribbon smells of perfume.",
            ),
        Item::key("front door key", "A heavy ornate key.", "door_to_outside").with_lore(
            "This is the one. The front door awaits.",
            "Someone hid it well.",
        ),
        // treasures
        Item::treasure(
            "golden compass",
            "A compass whose needle ignores north.",
            "Always points toward the nearest exit",
            500,
        ),
        Item::treasure(
            "ruby pendant",
            "A pendant with a deep red stone, warm to the touch.",
            "Glows brighter near hidden things",
            750,
        ),
        Item::treasure(
            "crystal hourglass",
            "An hourglass whose sand flows upward.",
            "Bends time around its holder",
            1000,
        ),
    ];

    (rooms, items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_world_validates() {
        let world = World::canonical();
        assert_eq!(world.start_room(), "game_room");
        assert_eq!(world.target_room(), "outside");
        assert_eq!(world.treasure_count(), 3);
        assert!(world.furniture_count() >= 15);
    }

    #[test]
    fn other_room_resolves_both_directions() {
        let world = World::canonical();
        assert_eq!(
            world.other_room("door_to_bedroom1", "game_room").unwrap().name,
            "bedroom1"
        );
        assert_eq!(
            world.other_room("door_to_bedroom1", "bedroom1").unwrap().name,
            "game_room"
        );
        assert!(world.other_room("door_to_bedroom1", "livingroom").is_none());
        assert!(world.other_room("dresser", "game_room").is_none());
    }

    #[test]
    fn room_scoped_lookup() {
        let world = World::canonical();
        assert!(world.find_in_room("game_room", "dresser").is_some());
        assert!(world.find_in_room("game_room", "queen bed").is_none());
        let names: Vec<&str> = world
            .items_in("game_room")
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["couch", "piano", "dresser", "bookcase", "door_to_bedroom1"]
        );
    }

    #[test]
    fn dresser_key_opens_first_door() {
        let world = World::canonical();
        let key = world.contents_of("dresser").unwrap();
        assert!(matches!(&key.kind, ItemKind::Key { target, .. } if target == "door_to_bedroom1"));
        assert_eq!(world.door_key("door_to_bedroom1").unwrap().name, key.name);
        assert!(world.contents_of("bookcase").is_none());
    }

    #[test]
    fn rejects_self_loop_door() {
        let rooms = vec![
            Room::new("a", "A", (0, 0)).with_items(&["loop"]),
            Room::new("b", "B", (1, 0)),
        ];
        let items = vec![Item::door("loop", "", "a", "a", "")];
        assert_eq!(
            World::new("a", "b", rooms, items).unwrap_err(),
            WorldError::DoorLoop("loop".into())
        );
    }

    #[test]
    fn rejects_unreachable_target() {
        let rooms = vec![
            Room::new("a", "A", (0, 0)).with_items(&["door"]),
            Room::new("b", "B", (1, 0)).with_items(&["door", "chest"]),
        ];
        // The only key sits behind the door it opens.
        let items = vec![
            Item::door("door", "", "a", "b", ""),
            Item::furniture("chest", "").holding("key"),
            Item::key("key", "", "door"),
        ];
        assert!(matches!(
            World::new("a", "b", rooms, items),
            Err(WorldError::Unreachable { .. })
        ));
    }

    #[test]
    fn rejects_bad_key_target() {
        let rooms = vec![
            Room::new("a", "A", (0, 0)).with_items(&["door", "chest"]),
            Room::new("b", "B", (1, 0)).with_items(&["door"]),
        ];
        let items = vec![
            Item::door("door", "", "a", "b", ""),
            Item::furniture("chest", "").holding("key"),
            Item::key("key", "", "chest"),
        ];
        assert!(matches!(
            World::new("a", "b", rooms, items),
            Err(WorldError::BadKeyTarget { .. })
        ));
    }

    #[test]
    fn seed_round_trip_keeps_layout() {
        let world = World::canonical();
        let rebuilt = World::from_seed(world.to_seed()).unwrap();
        assert_eq!(rebuilt.rooms(), world.rooms());
        assert_eq!(rebuilt.item("dining table"), world.item("dining table"));
    }
}
