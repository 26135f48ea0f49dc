//! Seed data loaders for data-driven worlds.
//!
//! A world file is a JSON [`WorldSeed`]: start and target room names, the
//! rooms with their item lists, and every item tagged by `"type"`. Operators can
//! ship their own mansion without recompiling; the built-in one is available
//! through `escaperoom world --export`.

use std::fs;
use std::path::Path;

use log::info;

use crate::game::errors::GameError;
use crate::game::world::{World, WorldSeed};

/// Load and validate a world from a JSON file.
pub fn load_world_from_json<P: AsRef<Path>>(path: P) -> Result<World, GameError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let world = parse_world(&contents).map_err(|e| match e {
        GameError::Json(err) => GameError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Failed to parse {}: {}", path.display(), err),
        )),
        other => other,
    })?;
    info!(
        "Loaded world from {} ({} rooms, {} treasures)",
        path.display(),
        world.rooms().len(),
        world.treasure_count()
    );
    Ok(world)
}

/// Build a world from JSON text.
pub fn parse_world(json: &str) -> Result<World, GameError> {
    let seed: WorldSeed = serde_json::from_str(json)?;
    Ok(World::from_seed(seed)?)
}

/// Pretty JSON for a world, suitable for [`load_world_from_json`].
pub fn world_to_json(world: &World) -> Result<String, GameError> {
    Ok(serde_json::to_string_pretty(&world.to_seed())?)
}
