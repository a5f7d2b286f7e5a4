//! Collision resolution.
//!
//! A handler is chosen by the encountered object's type (and, for bots, the
//! mover's type) from an ordered list. Every handler reports whether the
//! moving object survived. Objects already removed this tick make the
//! encounter a no-op.

use crate::entity::{Entity, ObjectEntry};
use crate::{geometry, EngineError, World};
use protocol::{Effect, ObjectId, ObjectType};
use tracing::{debug, info};

/// Collision handler variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionHandler {
    Player,
    /// A projectile running into a bot. Torpedo damage is resolved from the
    /// torpedo's side; other projectiles pass over bots.
    BotToProjectile,
    Food,
    Superfood,
    Wormhole,
    GasCloud,
    AsteroidField,
    TorpedoSalvo,
    SupernovaPickup,
    SupernovaBomb,
    Teleporter,
}

impl CollisionHandler {
    /// Resolution order.
    pub const ORDERED: [CollisionHandler; 11] = [
        CollisionHandler::Player,
        CollisionHandler::BotToProjectile,
        CollisionHandler::Food,
        CollisionHandler::Superfood,
        CollisionHandler::Wormhole,
        CollisionHandler::GasCloud,
        CollisionHandler::AsteroidField,
        CollisionHandler::TorpedoSalvo,
        CollisionHandler::SupernovaPickup,
        CollisionHandler::SupernovaBomb,
        CollisionHandler::Teleporter,
    ];

    pub fn is_applicable(self, encountered: ObjectType, mover: ObjectType) -> bool {
        use ObjectType as T;
        match self {
            CollisionHandler::Player => encountered == T::Player && mover == T::Player,
            CollisionHandler::BotToProjectile => encountered == T::Player && mover != T::Player,
            CollisionHandler::Food => encountered == T::Food,
            CollisionHandler::Superfood => encountered == T::Superfood,
            CollisionHandler::Wormhole => encountered == T::Wormhole,
            CollisionHandler::GasCloud => encountered == T::GasCloud,
            CollisionHandler::AsteroidField => encountered == T::AsteroidField,
            CollisionHandler::TorpedoSalvo => encountered == T::TorpedoSalvo,
            CollisionHandler::SupernovaPickup => encountered == T::SupernovaPickup,
            CollisionHandler::SupernovaBomb => encountered == T::SupernovaBomb,
            CollisionHandler::Teleporter => encountered == T::Teleporter,
        }
    }

    pub fn resolve(encountered: ObjectType, mover: ObjectType) -> Result<CollisionHandler, EngineError> {
        Self::ORDERED
            .into_iter()
            .find(|handler| handler.is_applicable(encountered, mover))
            .ok_or(EngineError::NoCollisionHandler { encountered, mover })
    }

    fn name(self) -> &'static str {
        match self {
            CollisionHandler::Player => "player",
            CollisionHandler::BotToProjectile => "bot-to-projectile",
            CollisionHandler::Food => "food",
            CollisionHandler::Superfood => "superfood",
            CollisionHandler::Wormhole => "wormhole",
            CollisionHandler::GasCloud => "gas cloud",
            CollisionHandler::AsteroidField => "asteroid field",
            CollisionHandler::TorpedoSalvo => "torpedo salvo",
            CollisionHandler::SupernovaPickup => "supernova pickup",
            CollisionHandler::SupernovaBomb => "supernova bomb",
            CollisionHandler::Teleporter => "teleporter",
        }
    }

    /// Apply the encounter. Returns whether the mover is still alive.
    pub fn apply(self, world: &mut World, encountered: ObjectId, mover: ObjectId) -> Result<bool, EngineError> {
        let (Some(enc), Some(mov)) = (world.data(encountered), world.data(mover)) else {
            return Ok(true);
        };
        if !self.is_applicable(enc.object_type, mov.object_type) {
            return Err(self.mismatch(enc.object_type, mov.object_type));
        }

        match self {
            CollisionHandler::Player => player(world, encountered, mover, self),
            CollisionHandler::Food => Ok(food(world, encountered, mover)),
            CollisionHandler::Superfood => Ok(superfood(world, encountered, mover)),
            CollisionHandler::Wormhole => wormhole(world, encountered, mover),
            CollisionHandler::GasCloud => Ok(gas_cloud(world, encountered, mover)),
            CollisionHandler::AsteroidField => Ok(asteroid_field(world, encountered, mover)),
            CollisionHandler::TorpedoSalvo => torpedo_salvo(world, encountered, mover, self),
            CollisionHandler::SupernovaPickup => Ok(supernova_pickup(world, encountered, mover)),
            CollisionHandler::BotToProjectile | CollisionHandler::SupernovaBomb | CollisionHandler::Teleporter => Ok(true),
        }
    }

    fn mismatch(self, encountered: ObjectType, mover: ObjectType) -> EngineError {
        EngineError::HandlerMismatch {
            handler: self.name(),
            encountered,
            mover,
        }
    }
}

/// Resolve one encounter between `mover` and the object it ran into.
pub fn resolve_collision(world: &mut World, encountered: ObjectId, mover: ObjectId) -> Result<bool, EngineError> {
    let (Some(enc), Some(mov)) = (world.data(encountered), world.data(mover)) else {
        return Ok(true);
    };
    let handler = CollisionHandler::resolve(enc.object_type, mov.object_type)?;
    handler.apply(world, encountered, mover)
}

/// Set an object's size, removing it once nothing is left.
fn set_size_or_remove(world: &mut World, id: ObjectId, size: i32) {
    let Some(data) = world.data_mut(id) else {
        return;
    };
    data.size = size.max(0);
    if size <= 0 {
        world.remove_by_id(id);
    }
}

/// Both sides lose the other's size. Returns whether the mover has any left.
fn mutual_reduction(world: &mut World, encountered: ObjectId, mover: ObjectId) -> bool {
    let (Some(obstacle_size), Some(mover_size)) = (
        world.data(encountered).map(|d| d.size),
        world.data(mover).map(|d| d.size),
    ) else {
        return true;
    };
    set_size_or_remove(world, encountered, obstacle_size - mover_size);
    set_size_or_remove(world, mover, mover_size - obstacle_size);
    mover_size - obstacle_size > 0
}

/// Reverse both bots and push each `spacing` along its new heading.
fn bounce(world: &mut World, ids: [ObjectId; 2], spacing: i32) {
    for id in ids {
        let Some(bot) = world.bot_mut(id) else {
            continue;
        };
        let data = bot.data_mut();
        data.heading = geometry::reverse_heading(data.heading);
        data.position = geometry::move_position(data.position, spacing, data.heading);
        let heading = data.heading;
        if let Some(action) = bot.current_action.as_mut() {
            action.heading = heading;
        }
    }
}

fn player(
    world: &mut World,
    encountered: ObjectId,
    mover: ObjectId,
    handler: CollisionHandler,
) -> Result<bool, EngineError> {
    let (Some(other), Some(bot)) = (world.bot(encountered), world.bot(mover)) else {
        return Err(handler.mismatch(ObjectType::Player, ObjectType::Player));
    };
    let (other_size, bot_size) = (other.data().size, bot.data().size);

    if other_size == bot_size {
        bounce(world, [encountered, mover], 1);
        return Ok(true);
    }

    let (consumer, consumee) = if bot_size > other_size {
        (mover, encountered)
    } else {
        (encountered, mover)
    };
    let consumer_size = bot_size.max(other_size);
    let consumee_size = bot_size.min(other_size);
    let ratio = world.config().consumption.player;
    let consumed = (consumer_size as f64 * ratio).max(consumee_size as f64).ceil() as i32;
    let score = world.config().scores.player;
    let minimum = world.config().game.minimum_player_size;

    let mut remaining = consumee_size - consumed;
    if let Some(bot) = world.bot_mut(consumer) {
        bot.data_mut().size += consumed;
        bot.score += score;
    }
    world.update_speed(consumer);

    bounce(world, [consumee, consumer], ((consumed as f64 + 1.0) / 2.0).ceil() as i32);

    // Too small to survive: the consumer takes what is left.
    let absorbed = remaining < minimum;
    if absorbed {
        if let Some(data) = world.data_mut(consumer) {
            data.size += remaining;
        }
        remaining = 0;
    }
    if let Some(data) = world.data_mut(consumee) {
        data.size = remaining;
    }
    world.update_speed(consumee);
    world.update_speed(consumer);
    if absorbed {
        world.remove_by_id(consumee);
        info!("Bot {} consumed by {}", consumee, consumer);
    }

    let mover_size = world.data(mover).map_or(0, |d| d.size);
    if mover_size > minimum {
        return Ok(true);
    }
    world.remove_by_id(mover);
    Ok(false)
}

fn food(world: &mut World, encountered: ObjectId, mover: ObjectId) -> bool {
    let config = world.config();
    let max_consumption = config.food.max_consumption_size;
    let multiplier = config.consumption.superfood;
    let score = config.scores.food;

    let Some(food_size) = world.data(encountered).map(|d| d.size) else {
        return true;
    };
    let boosted = world.has_effect(mover, Effect::Superfood);
    let Some(bot) = world.bot_mut(mover) else {
        return true;
    };
    if bot.data().size > max_consumption {
        return true;
    }

    bot.data_mut().size += if boosted { food_size * multiplier } else { food_size };
    bot.score += score;
    set_size_or_remove(world, encountered, 0);
    world.update_speed(mover);
    true
}

fn superfood(world: &mut World, encountered: ObjectId, mover: ObjectId) -> bool {
    let config = world.config();
    let max_consumption = config.food.max_consumption_size;
    let duration = config.food.superfood_effect_duration;
    let score = config.scores.superfood;

    if world.data(mover).is_some_and(|d| d.size > max_consumption) {
        return true;
    }
    let Some(food_size) = world.data(encountered).map(|d| d.size) else {
        return true;
    };
    let Some(bot) = world.bot_mut(mover) else {
        return mutual_reduction(world, encountered, mover);
    };

    bot.data_mut().size += food_size;
    bot.score += score;
    match world.active_effect_mut(mover, Effect::Superfood) {
        Some(active) => active.remaining += duration,
        None => {
            world.add_active_effect(mover, Effect::Superfood, duration);
        }
    }
    world.update_speed(mover);
    set_size_or_remove(world, encountered, 0);
    true
}

fn wormhole(world: &mut World, encountered: ObjectId, mover: ObjectId) -> Result<bool, EngineError> {
    let (Some(hole), Some(traveller)) = (world.data(encountered), world.data(mover)) else {
        return Ok(true);
    };
    if hole.size < traveller.size {
        return Ok(true);
    }
    let (traveller_size, heading) = (traveller.size, traveller.heading);

    let (first, second) = world.wormhole_pair(encountered)?;
    let counterpart = if first == encountered { second } else { first };
    let (Some(exit), Some(first_size)) = (world.data(counterpart), world.data(first).map(|d| d.size)) else {
        return Ok(true);
    };
    let destination = geometry::move_position(exit.position, exit.size + traveller_size, heading);

    let score = world.config().scores.wormhole;
    let ratio = world.config().consumption.wormhole;
    let min_size = world.config().wormholes.min_size;

    if let Some(entry) = world.get_mut(mover) {
        entry.data_mut().position = destination;
        // Traversal sets the score rather than adding to it.
        if let ObjectEntry::Bot(bot) = entry {
            bot.score = score;
        }
    }

    let size = ((first_size as f64 * ratio).ceil() as i32).max(min_size);
    for id in [first, second] {
        if let Some(data) = world.data_mut(id) {
            data.size = size;
        }
    }
    debug!("Object {} passed through wormhole {} to {}", mover, encountered, destination);
    Ok(true)
}

fn gas_cloud(world: &mut World, encountered: ObjectId, mover: ObjectId) -> bool {
    if world.bot(mover).is_none() {
        return mutual_reduction(world, encountered, mover);
    }
    let minimum = world.config().game.minimum_player_size;
    let damage = world.config().gas_clouds.affect_per_tick;

    if world.add_active_effect(mover, Effect::GasCloud, 0)
        && let Some(data) = world.data_mut(mover)
    {
        data.size -= damage;
        world.update_speed(mover);
    }

    let size = world.data(mover).map_or(0, |d| d.size);
    if size < minimum {
        info!("Bot {} dissolved in gas cloud {}", mover, encountered);
        world.remove_by_id(mover);
        return false;
    }
    true
}

fn asteroid_field(world: &mut World, encountered: ObjectId, mover: ObjectId) -> bool {
    if world.bot(mover).is_none() {
        return mutual_reduction(world, encountered, mover);
    }
    if world.add_active_effect(mover, Effect::AsteroidField, 0) {
        world.update_speed(mover);
    }
    true
}

fn torpedo_salvo(
    world: &mut World,
    encountered: ObjectId,
    mover: ObjectId,
    handler: CollisionHandler,
) -> Result<bool, EngineError> {
    let Some(salvo) = world.get(encountered).and_then(ObjectEntry::as_projectile) else {
        let mover_type = world.data(mover).map_or(ObjectType::Player, |d| d.object_type);
        return Err(handler.mismatch(ObjectType::TorpedoSalvo, mover_type));
    };
    let firing_player = salvo.firing_player_id;
    let salvo_size = salvo.data().size;
    let mover_is_bot = world.bot(mover).is_some();

    if mover_is_bot && world.has_effect(mover, Effect::Shield) {
        if let Some(data) = world.data_mut(encountered) {
            data.heading = geometry::reverse_heading(data.heading);
        }
        debug!("Bot {} deflected torpedo salvo {}", mover, encountered);
        return Ok(true);
    }

    let Some(mover_start) = world.data(mover).map(|d| d.size) else {
        return Ok(true);
    };
    let mover_size = mover_start - salvo_size;
    set_size_or_remove(world, encountered, salvo_size - mover_start.max(salvo_size));
    set_size_or_remove(world, mover, mover_size);

    if let Some(data) = world.data_mut(firing_player) {
        data.size += salvo_size;
    }
    world.update_speed(firing_player);
    world.update_speed(mover);

    if mover_is_bot {
        let minimum = world.config().game.minimum_player_size;
        if mover_size < minimum {
            info!("Bot {} destroyed by torpedo salvo {}", mover, encountered);
        }
        Ok(mover_size >= minimum)
    } else {
        Ok(mover_size > 0)
    }
}

fn supernova_pickup(world: &mut World, encountered: ObjectId, mover: ObjectId) -> bool {
    if !world.is_present(encountered) {
        return true;
    }
    if let Some(bot) = world.bot_mut(mover) {
        bot.supernova_available += 1;
        world.remove_by_id(encountered);
        info!("Bot {} picked up the supernova", mover);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{place, place_bot, position_of, size_of, test_world};
    use protocol::Position;

    #[test]
    fn test_handler_predicates_are_disjoint() {
        use ObjectType as T;
        let types = [
            T::Player,
            T::Food,
            T::Wormhole,
            T::GasCloud,
            T::AsteroidField,
            T::TorpedoSalvo,
            T::Superfood,
            T::SupernovaPickup,
            T::SupernovaBomb,
            T::Teleporter,
        ];
        for encountered in types {
            for mover in types.into_iter().filter(|t| t.is_movable()) {
                let claims = CollisionHandler::ORDERED
                    .iter()
                    .filter(|h| h.is_applicable(encountered, mover))
                    .count();
                assert_eq!(claims, 1, "{encountered:?} by {mover:?}");
            }
        }
        assert_eq!(
            CollisionHandler::resolve(T::Player, T::Teleporter).unwrap(),
            CollisionHandler::BotToProjectile
        );
        assert!(matches!(
            CollisionHandler::resolve(T::Player, T::Food),
            Err(EngineError::NoCollisionHandler { .. })
        ));
    }

    #[test]
    fn test_equal_bots_bounce() {
        let mut world = test_world();
        let a = place_bot(&mut world, Position::new(0, 0), 10);
        let b = place_bot(&mut world, Position::new(15, 0), 10);
        world.data_mut(b).unwrap().heading = 180;

        assert!(resolve_collision(&mut world, a, b).unwrap());
        let (da, db) = (world.data(a).unwrap(), world.data(b).unwrap());
        assert_eq!((da.size, db.size), (10, 10));
        assert_eq!((da.heading, db.heading), (180, 0));
        assert_eq!(da.position, Position::new(-1, 0));
        assert_eq!(db.position, Position::new(16, 0));
        assert_eq!(world.bot(a).unwrap().score, 0);
        assert_eq!(world.bot(b).unwrap().score, 0);
    }

    #[test]
    fn test_bigger_mover_absorbs_smaller() {
        let mut world = test_world();
        let prey = place_bot(&mut world, Position::new(20, 0), 10);
        let hunter = place_bot(&mut world, Position::new(0, 0), 30);

        assert!(resolve_collision(&mut world, prey, hunter).unwrap());
        assert!(!world.is_present(prey));
        // Gains exactly the prey's size.
        assert_eq!(size_of(&world, hunter), Some(40));
        assert_eq!(world.bot(hunter).unwrap().score, world.config().scores.player);
        assert_eq!(world.data(hunter).unwrap().speed, 5);
    }

    #[test]
    fn test_smaller_mover_dies() {
        let mut world = test_world();
        let hunter = place_bot(&mut world, Position::new(20, 0), 30);
        let prey = place_bot(&mut world, Position::new(0, 0), 10);

        assert!(!resolve_collision(&mut world, hunter, prey).unwrap());
        assert!(!world.is_present(prey));
        assert_eq!(size_of(&world, hunter), Some(40));
    }

    #[test]
    fn test_bot_eats_food() {
        let mut world = test_world();
        let bot = place_bot(&mut world, Position::ORIGIN, 10);
        let food = place(&mut world, ObjectType::Food, Position::new(5, 0), 1);
        let speed_before = world.data(bot).unwrap().speed;

        assert!(resolve_collision(&mut world, food, bot).unwrap());
        assert_eq!(size_of(&world, bot), Some(11));
        assert_eq!(world.bot(bot).unwrap().score, world.config().scores.food);
        assert!(!world.is_present(food));
        assert!(world.data(bot).unwrap().speed < speed_before);
    }

    #[test]
    fn test_food_is_doubled_by_superfood_effect() {
        let mut world = test_world();
        let bot = place_bot(&mut world, Position::ORIGIN, 10);
        let food = place(&mut world, ObjectType::Food, Position::new(5, 0), 3);
        world.add_active_effect(bot, Effect::Superfood, 5);

        resolve_collision(&mut world, food, bot).unwrap();
        assert_eq!(size_of(&world, bot), Some(16));
    }

    #[test]
    fn test_food_ignored_by_huge_bot_and_torpedo() {
        let mut world = test_world();
        let max = world.config().food.max_consumption_size;
        let bot = place_bot(&mut world, Position::ORIGIN, max + 1);
        let food = place(&mut world, ObjectType::Food, Position::new(5, 0), 3);
        assert!(resolve_collision(&mut world, food, bot).unwrap());
        assert!(world.is_present(food));

        let salvo = world.spawn_projectile(ObjectType::TorpedoSalvo, Position::new(5, 0), 10, 60, 0, bot);
        assert!(resolve_collision(&mut world, food, salvo).unwrap());
        assert!(world.is_present(food));
        assert_eq!(size_of(&world, salvo), Some(10));
    }

    #[test]
    fn test_superfood_extends_effect() {
        let mut world = test_world();
        let bot = place_bot(&mut world, Position::ORIGIN, 10);
        let first = place(&mut world, ObjectType::Superfood, Position::new(5, 0), 3);
        let second = place(&mut world, ObjectType::Superfood, Position::new(0, 5), 3);
        let duration = world.config().food.superfood_effect_duration;

        resolve_collision(&mut world, first, bot).unwrap();
        resolve_collision(&mut world, second, bot).unwrap();
        assert_eq!(size_of(&world, bot), Some(16));
        assert_eq!(world.bot(bot).unwrap().score, 2 * world.config().scores.superfood);
        assert_eq!(world.active_effect(bot, Effect::Superfood).unwrap().remaining, 2 * duration);
    }

    #[test]
    fn test_torpedo_wears_down_superfood() {
        let mut world = test_world();
        let owner = place_bot(&mut world, Position::new(0, 500), 10);
        let superfood = place(&mut world, ObjectType::Superfood, Position::ORIGIN, 3);
        let salvo = world.spawn_projectile(ObjectType::TorpedoSalvo, Position::new(5, 0), 10, 60, 180, owner);

        assert!(resolve_collision(&mut world, superfood, salvo).unwrap());
        assert!(!world.is_present(superfood));
        assert_eq!(size_of(&world, salvo), Some(7));
    }

    #[test]
    fn test_wormhole_moves_mover_and_overwrites_score() {
        let mut world = test_world();
        let entry = place(&mut world, ObjectType::Wormhole, Position::ORIGIN, 20);
        let exit = place(&mut world, ObjectType::Wormhole, Position::new(300, 0), 20);
        world.add_wormhole_pair(entry, exit);
        let bot = place_bot(&mut world, Position::new(10, 0), 10);
        world.data_mut(bot).unwrap().heading = 90;
        world.bot_mut(bot).unwrap().score = 50;

        assert!(resolve_collision(&mut world, entry, bot).unwrap());
        assert_eq!(position_of(&world, bot), Some(Position::new(300, 30)));
        // Traversal replaces the score.
        assert_eq!(world.bot(bot).unwrap().score, world.config().scores.wormhole);
        assert_eq!(size_of(&world, entry), Some(10));
        assert_eq!(size_of(&world, exit), Some(10));
    }

    #[test]
    fn test_wormhole_too_small_to_enter() {
        let mut world = test_world();
        let entry = place(&mut world, ObjectType::Wormhole, Position::ORIGIN, 20);
        let exit = place(&mut world, ObjectType::Wormhole, Position::new(300, 0), 20);
        world.add_wormhole_pair(entry, exit);
        let bot = place_bot(&mut world, Position::new(10, 0), 25);

        assert!(resolve_collision(&mut world, entry, bot).unwrap());
        assert_eq!(position_of(&world, bot), Some(Position::new(10, 0)));
        assert_eq!(size_of(&world, entry), Some(20));
    }

    #[test]
    fn test_unpaired_wormhole_aborts() {
        let mut world = test_world();
        let hole = place(&mut world, ObjectType::Wormhole, Position::ORIGIN, 20);
        let bot = place_bot(&mut world, Position::new(10, 0), 10);
        assert!(matches!(
            resolve_collision(&mut world, hole, bot),
            Err(EngineError::UnpairedWormhole(_))
        ));
    }

    #[test]
    fn test_gas_cloud_first_contact_drains_once() {
        let mut world = test_world();
        let cloud = place(&mut world, ObjectType::GasCloud, Position::ORIGIN, 40);
        let bot = place_bot(&mut world, Position::new(10, 0), 10);
        let damage = world.config().gas_clouds.affect_per_tick;

        assert!(resolve_collision(&mut world, cloud, bot).unwrap());
        assert!(resolve_collision(&mut world, cloud, bot).unwrap());
        assert_eq!(size_of(&world, bot), Some(10 - damage));
        assert!(world.has_effect(bot, Effect::GasCloud));
    }

    #[test]
    fn test_gas_cloud_kills_small_bot() {
        let mut world = test_world();
        let minimum = world.config().game.minimum_player_size;
        let cloud = place(&mut world, ObjectType::GasCloud, Position::ORIGIN, 40);
        let bot = place_bot(&mut world, Position::new(10, 0), minimum);

        assert!(!resolve_collision(&mut world, cloud, bot).unwrap());
        assert!(!world.is_present(bot));
    }

    #[test]
    fn test_asteroid_field_slows_bot() {
        let mut world = test_world();
        let field = place(&mut world, ObjectType::AsteroidField, Position::ORIGIN, 40);
        let bot = place_bot(&mut world, Position::new(10, 0), 10);

        assert!(resolve_collision(&mut world, field, bot).unwrap());
        assert_eq!(size_of(&world, bot), Some(10));
        assert_eq!(world.data(bot).unwrap().speed, 15);
    }

    #[test]
    fn test_asteroid_field_absorbs_torpedo() {
        let mut world = test_world();
        let owner = place_bot(&mut world, Position::new(0, 500), 10);
        let field = place(&mut world, ObjectType::AsteroidField, Position::ORIGIN, 40);
        let salvo = world.spawn_projectile(ObjectType::TorpedoSalvo, Position::new(30, 0), 10, 60, 180, owner);

        assert!(!resolve_collision(&mut world, field, salvo).unwrap());
        assert!(!world.is_present(salvo));
        assert_eq!(size_of(&world, field), Some(30));
    }

    #[test]
    fn test_torpedo_damages_bot_and_credits_shooter() {
        let mut world = test_world();
        let shooter = place_bot(&mut world, Position::new(0, 500), 20);
        let target = place_bot(&mut world, Position::ORIGIN, 30);
        let salvo = world.spawn_projectile(ObjectType::TorpedoSalvo, Position::new(15, 0), 10, 60, 180, shooter);

        assert!(resolve_collision(&mut world, salvo, target).unwrap());
        assert_eq!(size_of(&world, target), Some(20));
        assert!(!world.is_present(salvo));
        assert_eq!(size_of(&world, shooter), Some(30));
        assert_eq!(world.data(target).unwrap().speed, 10);
        assert_eq!(world.data(shooter).unwrap().speed, 7);
    }

    #[test]
    fn test_torpedo_kills_small_bot() {
        let mut world = test_world();
        let shooter = place_bot(&mut world, Position::new(0, 500), 20);
        let target = place_bot(&mut world, Position::ORIGIN, 12);
        let salvo = world.spawn_projectile(ObjectType::TorpedoSalvo, Position::new(15, 0), 10, 60, 180, shooter);

        assert!(!resolve_collision(&mut world, salvo, target).unwrap());
        assert_eq!(size_of(&world, target), Some(2));
    }

    #[test]
    fn test_shield_deflects_torpedo() {
        let mut world = test_world();
        let shooter = place_bot(&mut world, Position::new(0, 500), 20);
        let target = place_bot(&mut world, Position::ORIGIN, 30);
        world.add_active_effect(target, Effect::Shield, 10);
        let salvo = world.spawn_projectile(ObjectType::TorpedoSalvo, Position::new(15, 0), 10, 60, 180, shooter);

        assert!(resolve_collision(&mut world, salvo, target).unwrap());
        assert_eq!(size_of(&world, target), Some(30));
        assert_eq!(size_of(&world, salvo), Some(10));
        assert_eq!(world.data(salvo).unwrap().heading, 0);
        assert_eq!(size_of(&world, shooter), Some(20));
    }

    #[test]
    fn test_torpedo_moving_into_bot_is_noop() {
        let mut world = test_world();
        let shooter = place_bot(&mut world, Position::new(0, 500), 20);
        let target = place_bot(&mut world, Position::ORIGIN, 30);
        let salvo = world.spawn_projectile(ObjectType::TorpedoSalvo, Position::new(15, 0), 10, 60, 180, shooter);

        assert!(resolve_collision(&mut world, target, salvo).unwrap());
        assert_eq!(size_of(&world, target), Some(30));
        assert_eq!(size_of(&world, salvo), Some(10));
    }

    #[test]
    fn test_pickup_granted_once() {
        let mut world = test_world();
        let pickup = place(&mut world, ObjectType::SupernovaPickup, Position::ORIGIN, 5);
        let a = place_bot(&mut world, Position::new(8, 0), 10);
        let b = place_bot(&mut world, Position::new(-8, 0), 10);

        assert!(resolve_collision(&mut world, pickup, a).unwrap());
        assert!(resolve_collision(&mut world, pickup, b).unwrap());
        assert_eq!(world.bot(a).unwrap().supernova_available, 1);
        assert_eq!(world.bot(b).unwrap().supernova_available, 0);
        assert!(!world.is_present(pickup));
    }

    #[test]
    fn test_absent_participant_is_noop() {
        let mut world = test_world();
        let food = place(&mut world, ObjectType::Food, Position::new(5, 0), 3);
        let bot = place_bot(&mut world, Position::ORIGIN, 10);
        world.remove_by_id(food);

        assert!(resolve_collision(&mut world, food, bot).unwrap());
        assert_eq!(size_of(&world, bot), Some(10));
    }

    #[test]
    fn test_handler_mismatch_is_reported() {
        let mut world = test_world();
        let food = place(&mut world, ObjectType::Food, Position::new(5, 0), 3);
        let bot = place_bot(&mut world, Position::ORIGIN, 10);
        assert!(matches!(
            CollisionHandler::Wormhole.apply(&mut world, food, bot),
            Err(EngineError::HandlerMismatch { handler: "wormhole", .. })
        ));
    }
}
