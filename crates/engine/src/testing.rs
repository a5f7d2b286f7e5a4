//! Shared test fixtures.

use crate::entity::BotObject;
use crate::{Config, World};
use protocol::{ObjectId, ObjectType, Position};
use std::sync::Arc;

/// Default configuration with fixed player seeds.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.seeds.player_seeds = Some(vec![11, 22, 33, 44]);
    config
}

/// Empty world on the default configuration.
pub fn test_world() -> World {
    world_with(test_config())
}

pub fn world_with(config: Config) -> World {
    let mut world = World::new(Arc::new(config));
    world.player_seeds = vec![11, 22, 33, 44];
    world
}

pub fn place(world: &mut World, object_type: ObjectType, position: Position, size: i32) -> ObjectId {
    world.spawn_object(object_type, position, size)
}

/// Bot at `position` with a size-derived speed and no seed.
pub fn place_bot(world: &mut World, position: Position, size: i32) -> ObjectId {
    let id = world.next_id();
    world.add_bot(BotObject::new(id, format!("bot{id}"), position, size));
    world.update_speed(id);
    id
}

/// Point a bot along `heading` so it travels this tick.
pub fn set_moving(world: &mut World, id: ObjectId, heading: i32) {
    if let Some(data) = world.data_mut(id) {
        data.heading = heading;
        data.is_moving = true;
    }
}

pub fn size_of(world: &World, id: ObjectId) -> Option<i32> {
    world.data(id).map(|d| d.size)
}

pub fn position_of(world: &World, id: ObjectId) -> Option<Position> {
    world.get(id).map(|e| e.data().position)
}
