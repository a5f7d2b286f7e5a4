//! World state management.
//!
//! Owns every object in the arena, the active effects, the wormhole pairs
//! and the per-tick removal queue. Removals are staged and only applied
//! by the end-of-tick flush, so handlers running earlier in the tick see
//! removed objects as absent without the collections changing under them.

mod evolution;

use crate::entity::{BotObject, Entity, ObjectData, ObjectEntry, Projectile};
use crate::{geometry, Config, EngineError};
use fixedbitset::FixedBitSet;
use protocol::{
    Effect, GameCompletePayload, GameStateDto, ObjectId, ObjectType, PlayerResult, Position,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// An effect applied to a bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEffect {
    pub bot_id: ObjectId,
    pub effect: Effect,
    /// Ticks left for duration-bound effects. Ignored for the others.
    pub remaining: i32,
}

/// Supernova lifecycle.
#[derive(Debug, Clone, Default)]
pub(crate) struct SupernovaState {
    /// Tick at which the pickup appears.
    pub spawn_tick: Option<u32>,
    pub pickup_position: Position,
    pub bomb_id: Option<ObjectId>,
    pub detonate: bool,
}

/// The arena.
#[derive(Debug)]
pub struct World {
    config: Arc<Config>,

    /// Next object ID to assign.
    next_object_id: ObjectId,

    /// All objects by ID, bots included.
    objects: HashMap<ObjectId, ObjectEntry>,
    /// Non-player objects in insertion order.
    object_ids: Vec<ObjectId>,
    /// Bots still in the roster, in registration order.
    bot_ids: Vec<ObjectId>,

    active_effects: Vec<ActiveEffect>,
    wormhole_pairs: Vec<(ObjectId, ObjectId)>,

    /// Removal queue, indexed by object ID for O(1) lookups.
    marked: FixedBitSet,
    /// Removal queue in the order objects were marked.
    marked_ids: Vec<ObjectId>,

    /// Removed bots, most recent last.
    lost_bots: Vec<BotObject>,

    pub(crate) player_seeds: Vec<i32>,
    pub(crate) world_seeds: Vec<i32>,
    pub(crate) supernova: SupernovaState,

    radius: i32,
    current_tick: u32,

    /// Reused between ticks.
    published: GameStateDto,
}

impl World {
    /// Create an empty world sized by `config`.
    pub fn new(config: Arc<Config>) -> Self {
        let radius = config.game.map_radius;
        let bots = config.game.bot_count as usize;
        Self {
            config,
            next_object_id: 1,
            objects: HashMap::with_capacity(1024),
            object_ids: Vec::with_capacity(1024),
            bot_ids: Vec::with_capacity(bots),
            active_effects: Vec::new(),
            wormhole_pairs: Vec::new(),
            marked: FixedBitSet::with_capacity(1024),
            marked_ids: Vec::new(),
            lost_bots: Vec::with_capacity(bots),
            player_seeds: Vec::new(),
            world_seeds: Vec::new(),
            supernova: SupernovaState::default(),
            radius,
            current_tick: 0,
            published: GameStateDto::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn radius(&self) -> i32 {
        self.radius
    }

    #[inline]
    pub fn current_tick(&self) -> u32 {
        self.current_tick
    }

    /// Get the next object ID. IDs are never reused.
    pub fn next_id(&mut self) -> ObjectId {
        let id = self.next_object_id;
        self.next_object_id += 1;
        id
    }

    /// Add an object under the ID it already carries.
    pub fn add_object(&mut self, entry: ObjectEntry) -> ObjectId {
        let id = entry.data().id;
        debug_assert!(!self.objects.contains_key(&id), "object {id} added twice");
        if entry.is_bot() {
            self.bot_ids.push(id);
        } else {
            self.object_ids.push(id);
        }
        self.objects.insert(id, entry);
        id
    }

    pub fn add_bot(&mut self, bot: BotObject) -> ObjectId {
        self.add_object(ObjectEntry::Bot(bot))
    }

    /// Place a static object (food, hazard, wormhole or pickup).
    pub fn spawn_object(&mut self, object_type: ObjectType, position: Position, size: i32) -> ObjectId {
        let id = self.next_id();
        self.add_object(ObjectEntry::Static(ObjectData::new(id, object_type, position, size)))
    }

    /// Place a moving object fired by `firing_player_id`.
    pub fn spawn_projectile(
        &mut self,
        object_type: ObjectType,
        position: Position,
        size: i32,
        speed: i32,
        heading: i32,
        firing_player_id: ObjectId,
    ) -> ObjectId {
        let id = self.next_id();
        let projectile = Projectile::new(id, object_type, position, size, speed, heading, firing_player_id);
        self.add_object(ObjectEntry::Projectile(projectile))
    }

    /// Register a new bot at the next free start position.
    pub fn create_bot(&mut self, nickname: impl Into<String>) -> ObjectId {
        let config = self.config.clone();
        let game = &config.game;
        let registered = (self.bot_ids.len() + self.lost_bots.len()) as u32;
        let position = geometry::start_position_for_player(registered, game.bot_count, game.start_radius);
        let id = self.next_id();

        let mut bot = BotObject::new(id, nickname, position, game.starting_player_size);
        bot.data_mut().speed = config.speeds.starting_speed;
        bot.seed = self.player_seeds.get(registered as usize).copied();
        bot.torpedo_salvo_count = config.torpedo.starting_count;
        bot.teleporter_count = config.teleport.starting_count;
        bot.shield_count = config.shield.starting_count;

        debug!("Registered bot {} '{}' at {}", id, bot.nickname, position);
        self.add_bot(bot)
    }

    /// Queue an object for removal at the end of the tick. Idempotent.
    pub fn remove_by_id(&mut self, id: ObjectId) {
        let index = id as usize;
        if index >= self.marked.len() {
            self.marked.grow(index + 1);
        }
        if !self.marked.put(index) {
            self.marked_ids.push(id);
        }
    }

    #[inline]
    fn is_marked(&self, id: ObjectId) -> bool {
        self.marked.contains(id as usize)
    }

    /// True if the object exists and is not queued for removal.
    #[inline]
    pub fn is_present(&self, id: ObjectId) -> bool {
        !self.is_marked(id) && self.objects.contains_key(&id)
    }

    /// Get a present object.
    #[inline]
    pub fn get(&self, id: ObjectId) -> Option<&ObjectEntry> {
        if self.is_marked(id) {
            return None;
        }
        self.objects.get(&id)
    }

    /// Get a present object mutably.
    #[inline]
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut ObjectEntry> {
        if self.is_marked(id) {
            return None;
        }
        self.objects.get_mut(&id)
    }

    #[inline]
    pub fn data(&self, id: ObjectId) -> Option<&ObjectData> {
        self.get(id).map(ObjectEntry::data)
    }

    #[inline]
    pub fn data_mut(&mut self, id: ObjectId) -> Option<&mut ObjectData> {
        self.get_mut(id).map(ObjectEntry::data_mut)
    }

    #[inline]
    pub fn bot(&self, id: ObjectId) -> Option<&BotObject> {
        self.get(id).and_then(ObjectEntry::as_bot)
    }

    #[inline]
    pub fn bot_mut(&mut self, id: ObjectId) -> Option<&mut BotObject> {
        self.get_mut(id).and_then(ObjectEntry::as_bot_mut)
    }

    /// Non-player objects, queued ones included.
    #[inline]
    pub fn object_ids(&self) -> &[ObjectId] {
        &self.object_ids
    }

    /// Bots in the roster that are not queued for removal.
    pub fn live_bot_ids(&self) -> Vec<ObjectId> {
        self.bot_ids.iter().copied().filter(|id| !self.is_marked(*id)).collect()
    }

    /// Number of bots not queued for removal.
    pub fn player_count(&self) -> usize {
        self.bot_ids.iter().filter(|id| !self.is_marked(**id)).count()
    }

    /// Present objects that travel this tick, bots first.
    pub fn moving_ids(&self) -> Vec<ObjectId> {
        self.bot_ids
            .iter()
            .chain(self.object_ids.iter())
            .copied()
            .filter(|id| {
                self.data(*id)
                    .is_some_and(|d| d.object_type.is_movable() && d.is_moving && d.speed > 0)
            })
            .collect()
    }

    /// Present objects overlapping `id`, bots first.
    pub fn overlapping(&self, id: ObjectId) -> Vec<ObjectId> {
        let Some(subject) = self.data(id) else {
            return Vec::new();
        };
        self.bot_ids
            .iter()
            .chain(self.object_ids.iter())
            .copied()
            .filter(|other| *other != id)
            .filter(|other| self.data(*other).is_some_and(|o| subject.overlaps(o)))
            .collect()
    }

    /// Whether `id` overlaps any present object of `object_type`.
    pub fn overlaps_type(&self, id: ObjectId, object_type: ObjectType) -> bool {
        let Some(subject) = self.data(id) else {
            return false;
        };
        self.object_ids.iter().any(|other| {
            self.data(*other)
                .is_some_and(|o| o.object_type == object_type && subject.overlaps(o))
        })
    }

    pub fn active_effect(&self, bot_id: ObjectId, effect: Effect) -> Option<&ActiveEffect> {
        self.active_effects
            .iter()
            .find(|a| a.bot_id == bot_id && a.effect == effect)
    }

    pub fn active_effect_mut(&mut self, bot_id: ObjectId, effect: Effect) -> Option<&mut ActiveEffect> {
        self.active_effects
            .iter_mut()
            .find(|a| a.bot_id == bot_id && a.effect == effect)
    }

    #[inline]
    pub fn has_effect(&self, bot_id: ObjectId, effect: Effect) -> bool {
        self.active_effect(bot_id, effect).is_some()
    }

    /// Register an effect and set its flag on the bot. Returns false if the
    /// bot already had it.
    pub fn add_active_effect(&mut self, bot_id: ObjectId, effect: Effect, duration: i32) -> bool {
        if self.has_effect(bot_id, effect) {
            return false;
        }
        if let Some(entry) = self.objects.get_mut(&bot_id) {
            entry.data_mut().effects.insert(effect.flag());
        }
        self.active_effects.push(ActiveEffect {
            bot_id,
            effect,
            remaining: duration,
        });
        true
    }

    /// Drop an effect and clear its flag. Returns false if it was not active.
    pub fn remove_active_effect(&mut self, bot_id: ObjectId, effect: Effect) -> bool {
        let before = self.active_effects.len();
        self.active_effects
            .retain(|a| !(a.bot_id == bot_id && a.effect == effect));
        if self.active_effects.len() == before {
            return false;
        }
        if let Some(entry) = self.objects.get_mut(&bot_id) {
            entry.data_mut().effects.remove(effect.flag());
        }
        true
    }

    /// Recompute a bot's speed from its size and effects. Other objects
    /// keep the speed they were fired with.
    pub fn update_speed(&mut self, id: ObjectId) {
        let afterburner = self.has_effect(id, Effect::Afterburner);
        let asteroid = self.has_effect(id, Effect::AsteroidField);
        let config = Arc::clone(&self.config);
        if let Some(ObjectEntry::Bot(bot)) = self.objects.get_mut(&id) {
            let data = bot.data_mut();
            data.speed = speed_for_size(&config, data.size, afterburner, asteroid);
        }
    }

    pub fn add_wormhole_pair(&mut self, first: ObjectId, second: ObjectId) {
        self.wormhole_pairs.push((first, second));
    }

    #[inline]
    pub fn wormhole_pairs(&self) -> &[(ObjectId, ObjectId)] {
        &self.wormhole_pairs
    }

    /// The pair containing `id`, in stored order.
    pub fn wormhole_pair(&self, id: ObjectId) -> Result<(ObjectId, ObjectId), EngineError> {
        self.wormhole_pairs
            .iter()
            .copied()
            .find(|(a, b)| *a == id || *b == id)
            .ok_or(EngineError::UnpairedWormhole(id))
    }

    /// Oldest present teleporter fired by `bot_id`.
    pub fn active_teleporter_for(&self, bot_id: ObjectId) -> Option<ObjectId> {
        self.object_ids.iter().copied().find(|id| {
            self.get(*id)
                .and_then(ObjectEntry::as_projectile)
                .is_some_and(|p| p.data().object_type == ObjectType::Teleporter && p.firing_player_id == bot_id)
        })
    }

    /// Present supernova bomb, if one is in flight.
    pub fn supernova_bomb(&self) -> Option<&Projectile> {
        self.supernova
            .bomb_id
            .and_then(|id| self.get(id))
            .and_then(ObjectEntry::as_projectile)
    }

    pub(crate) fn set_supernova_bomb(&mut self, bomb_id: ObjectId) {
        self.supernova.bomb_id = Some(bomb_id);
        self.supernova.detonate = false;
    }

    /// Arm the in-flight bomb; it goes off during end-of-tick evolution.
    pub(crate) fn mark_supernova_for_detonation(&mut self) {
        if self.supernova.bomb_id.is_some() {
            self.supernova.detonate = true;
        }
    }

    #[inline]
    pub fn lost_bots(&self) -> &[BotObject] {
        &self.lost_bots
    }

    /// Build the publishable snapshot, reusing the previous tick's maps.
    pub fn snapshot(&mut self) -> &GameStateDto {
        let published = &mut self.published;
        published.world.radius = self.radius;
        published.world.center_point = Position::ORIGIN;
        published.world.current_tick = self.current_tick;
        published.game_objects.clear();
        published.player_objects.clear();

        for id in &self.object_ids {
            if let Some(entry) = self.objects.get(id) {
                published.game_objects.insert(*id, entry.data().state());
            }
        }
        for id in &self.bot_ids {
            if let Some(ObjectEntry::Bot(bot)) = self.objects.get(id) {
                published.player_objects.insert(*id, bot.state());
            }
        }
        &self.published
    }

    /// Rank the bots still in the roster by size, then score.
    pub fn finalise_placements(&mut self) {
        let mut ranked: Vec<(ObjectId, i32, i32)> = self
            .bot_ids
            .iter()
            .filter_map(|id| self.objects.get(id).and_then(ObjectEntry::as_bot))
            .map(|bot| (bot.data().id, bot.data().size, bot.score))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)));

        for (index, (id, _, _)) in ranked.into_iter().enumerate() {
            if let Some(bot) = self.objects.get_mut(&id).and_then(ObjectEntry::as_bot_mut) {
                bot.placement = index as u32 + 1;
            }
        }
    }

    /// Final standings, best placement first.
    pub fn game_complete_payload(&self) -> Result<GameCompletePayload, EngineError> {
        let bot_count = self.config.game.bot_count as i32;
        let survivors = self
            .bot_ids
            .iter()
            .filter_map(|id| self.objects.get(id).and_then(ObjectEntry::as_bot));

        let mut players = survivors
            .chain(self.lost_bots.iter())
            .map(|bot| {
                let id = bot.data().id;
                Ok(PlayerResult {
                    placement: bot.placement,
                    seed: bot.seed.ok_or(EngineError::MissingSeed(id))?,
                    score: bot.score,
                    id,
                    nickname: bot.nickname.clone(),
                    match_points: (bot_count - bot.placement as i32 + 1) * 2,
                })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;
        players.sort_by_key(|p| p.placement);

        Ok(GameCompletePayload {
            total_ticks: self.current_tick,
            players,
            world_seeds: self.world_seeds.clone(),
        })
    }
}

/// `ceil(ratio / size)`, plus the afterburner bonus, minus the asteroid
/// penalty. Size 0 and below means speed 0.
pub fn speed_for_size(config: &Config, size: i32, afterburner: bool, asteroid: bool) -> i32 {
    if size <= 0 {
        return 0;
    }
    let mut speed = (config.speeds.ratio / size as f64).ceil() as i32;
    if afterburner {
        speed += config.afterburner.speed_bonus;
    }
    if asteroid && speed > config.speeds.minimum {
        speed = (speed - config.asteroid_fields.affect_per_tick).max(config.speeds.minimum);
    }
    speed.min(config.speeds.maximum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{place, place_bot, test_world};

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut world = test_world();
        let a = place(&mut world, ObjectType::Food, Position::new(0, 0), 3);
        let b = world.create_bot("b");
        let c = place(&mut world, ObjectType::Food, Position::new(5, 0), 3);
        assert!(a < b && b < c);
        world.remove_by_id(a);
        world.apply_after_tick_state_changes();
        let d = place(&mut world, ObjectType::Food, Position::new(9, 0), 3);
        assert!(d > c);
    }

    #[test]
    fn test_removal_is_staged() {
        let mut world = test_world();
        let food = place(&mut world, ObjectType::Food, Position::new(0, 0), 3);
        world.remove_by_id(food);
        world.remove_by_id(food);

        assert!(!world.is_present(food));
        assert!(world.get(food).is_none());
        assert!(world.object_ids().contains(&food));

        world.apply_after_tick_state_changes();
        assert!(!world.object_ids().contains(&food));
    }

    #[test]
    fn test_moving_ids_skip_static_objects() {
        let mut world = test_world();
        let bot = place_bot(&mut world, Position::new(0, 0), 10);
        let cloud = place(&mut world, ObjectType::GasCloud, Position::new(50, 0), 10);
        let salvo = world.spawn_projectile(ObjectType::TorpedoSalvo, Position::new(0, 50), 5, 20, 0, bot);
        for id in [bot, cloud] {
            let data = world.data_mut(id).unwrap();
            data.is_moving = true;
            data.speed = 10;
        }
        assert_eq!(world.moving_ids(), vec![bot, salvo]);
    }

    #[test]
    fn test_add_active_effect_is_idempotent() {
        let mut world = test_world();
        let bot = place_bot(&mut world, Position::new(0, 0), 10);

        assert!(world.add_active_effect(bot, Effect::Afterburner, 0));
        assert!(!world.add_active_effect(bot, Effect::Afterburner, 0));

        let count = world
            .active_effects
            .iter()
            .filter(|a| a.bot_id == bot && a.effect == Effect::Afterburner)
            .count();
        assert_eq!(count, 1);
        assert_eq!(world.data(bot).map(|d| d.effects.bits()), Some(1));

        assert!(world.remove_active_effect(bot, Effect::Afterburner));
        assert_eq!(world.data(bot).map(|d| d.effects.bits()), Some(0));
        assert!(!world.remove_active_effect(bot, Effect::Afterburner));
    }

    #[test]
    fn test_speed_is_inverse_to_size() {
        let config = Config::default();
        assert_eq!(speed_for_size(&config, 10, false, false), 20);
        assert_eq!(speed_for_size(&config, 11, false, false), 19);
        assert_eq!(speed_for_size(&config, 60, false, false), 4);
        assert_eq!(speed_for_size(&config, 0, false, false), 0);
    }

    #[test]
    fn test_speed_modifiers() {
        let config = Config::default();
        assert_eq!(speed_for_size(&config, 10, true, false), 40);
        assert_eq!(speed_for_size(&config, 10, false, true), 15);
        // Already at the floor: the penalty does not apply.
        assert_eq!(speed_for_size(&config, 340, false, true), 1);
        // Penalty never pushes below the floor.
        assert_eq!(speed_for_size(&config, 40, false, true), 1);
    }

    #[test]
    fn test_create_bot_uses_start_slots_and_seeds() {
        let mut world = test_world();
        let first = world.create_bot("first");
        let second = world.create_bot("second");

        let radius = world.config().game.start_radius;
        assert_eq!(world.data(first).map(|d| d.position), Some(Position::new(0, radius)));
        assert_eq!(world.data(second).map(|d| d.position), Some(Position::new(-radius, 0)));

        let bot = world.bot(first).unwrap();
        assert_eq!(bot.seed, Some(11));
        assert_eq!(bot.torpedo_salvo_count, world.config().torpedo.starting_count);
        assert_eq!(bot.data().size, world.config().game.starting_player_size);
        assert_eq!(world.bot(second).unwrap().seed, Some(22));
    }

    #[test]
    fn test_unpaired_wormhole_is_an_error() {
        let mut world = test_world();
        let hole = place(&mut world, ObjectType::Wormhole, Position::new(0, 0), 20);
        assert!(matches!(world.wormhole_pair(hole), Err(EngineError::UnpairedWormhole(id)) if id == hole));
    }

    #[test]
    fn test_snapshot_reuses_maps() {
        let mut world = test_world();
        let food = place(&mut world, ObjectType::Food, Position::new(4, 5), 3);
        let bot = place_bot(&mut world, Position::new(100, 0), 10);

        let snapshot = world.snapshot();
        assert_eq!(snapshot.game_objects[&food], [3, 0, 0, ObjectType::Food as i32, 4, 5, 0]);
        assert_eq!(snapshot.player_objects[&bot][0], 10);
        assert!(!snapshot.game_objects.contains_key(&bot));

        world.remove_by_id(food);
        world.apply_after_tick_state_changes();
        let snapshot = world.snapshot();
        assert!(snapshot.game_objects.is_empty());
        assert_eq!(snapshot.world.current_tick, 1);
    }

    #[test]
    fn test_payload_requires_seeds() {
        let mut world = test_world();
        let bot = place_bot(&mut world, Position::new(0, 0), 10);
        world.finalise_placements();
        assert!(matches!(world.game_complete_payload(), Err(EngineError::MissingSeed(id)) if id == bot));
    }

    #[test]
    fn test_placements_rank_by_size_then_score() {
        let mut world = test_world();
        let small = world.create_bot("small");
        let big = world.create_bot("big");
        let tied = world.create_bot("tied");
        world.data_mut(big).unwrap().size = 30;
        world.data_mut(tied).unwrap().size = 10;
        world.bot_mut(tied).unwrap().score = 5;

        world.finalise_placements();
        let payload = world.game_complete_payload().unwrap();
        let order: Vec<_> = payload.players.iter().map(|p| (p.id, p.placement)).collect();
        assert_eq!(order, vec![(big, 1), (tied, 2), (small, 3)]);
        // Four bots configured.
        assert_eq!(payload.players[0].match_points, 8);
        assert_eq!(payload.players[2].match_points, 4);
    }
}
