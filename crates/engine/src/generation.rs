//! Starting world generation.
//!
//! Placement is driven entirely by integer seeds, so a recorded set of
//! seeds reproduces the same arena.

use crate::{geometry, Config, World};
use protocol::{ObjectType, Position};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Attempts per object before giving up on placing it.
const MAX_PLACEMENT_ATTEMPTS: usize = 200;

/// An object to be added to the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedObject {
    pub object_type: ObjectType,
    pub position: Position,
    pub size: i32,
}

impl PlacedObject {
    pub fn new(object_type: ObjectType, position: Position, size: i32) -> Self {
        Self {
            object_type,
            position,
            size,
        }
    }

    fn overlaps_with_gap(&self, other: &PlacedObject, gap: i32) -> bool {
        geometry::distance_between(self.position, other.position) < self.size + other.size + gap
    }
}

/// When and where the supernova pickup appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupernovaPlan {
    pub spawn_tick: u32,
    pub position: Position,
}

/// Source of starting placements. Every method takes a seed and returns the
/// seed to carry forward.
pub trait WorldGenerator {
    /// Food close to each bot, one seed per bot.
    fn player_starting_food(&self, config: &Config, players: &[Position], seeds: &[i32]) -> Vec<PlacedObject>;

    /// Food and superfood spread over the arena, avoiding `occupied`.
    fn world_food(
        &self,
        config: &Config,
        players: &[Position],
        occupied: &[PlacedObject],
        seed: i32,
    ) -> (Vec<PlacedObject>, i32);

    /// Linked wormhole pairs.
    fn wormholes(&self, config: &Config, players: &[Position], seed: i32) -> (Vec<(PlacedObject, PlacedObject)>, i32);

    fn gas_clouds(&self, config: &Config, players: &[Position], seed: i32) -> (Vec<PlacedObject>, i32);

    fn asteroid_fields(&self, config: &Config, players: &[Position], seed: i32) -> (Vec<PlacedObject>, i32);

    fn supernova_plan(&self, config: &Config, seed: i32) -> (SupernovaPlan, i32);
}

/// `rand`-backed generator. Stateless; all state comes from the seeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeededGenerator;

impl SeededGenerator {
    fn rng(seed: i32) -> StdRng {
        StdRng::seed_from_u64(seed as u32 as u64)
    }

    /// Seed to hand back to the caller.
    fn next_seed(rng: &mut StdRng, config: &Config) -> i32 {
        rng.random_range(config.seeds.min_seed..config.seeds.max_seed)
    }

    /// Uniform point in the disc of `radius` around `center`.
    fn point_in_disc(rng: &mut StdRng, center: Position, radius: i32) -> Position {
        let distance = (radius.max(0) as f64 * rng.random::<f64>().sqrt()).round() as i32;
        let heading = rng.random_range(0..360);
        geometry::move_position(center, distance, heading)
    }

    /// Place `count` objects of `size`, keeping `separation` between them and
    /// `player_distance` between their edge and every player.
    #[allow(clippy::too_many_arguments)]
    fn scatter(
        rng: &mut StdRng,
        object_type: ObjectType,
        count: u32,
        size: i32,
        radius: i32,
        separation: i32,
        players: &[Position],
        player_distance: i32,
        occupied: &[PlacedObject],
    ) -> Vec<PlacedObject> {
        let mut placed: Vec<PlacedObject> = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let candidate = (0..MAX_PLACEMENT_ATTEMPTS)
                .map(|_| PlacedObject::new(object_type, Self::point_in_disc(rng, Position::ORIGIN, radius - size), size))
                .find(|candidate| {
                    let clear_of_players = players
                        .iter()
                        .all(|p| geometry::distance_between(*p, candidate.position) - size >= player_distance);
                    clear_of_players
                        && !placed.iter().any(|o| candidate.overlaps_with_gap(o, separation))
                        && !occupied.iter().any(|o| candidate.overlaps_with_gap(o, 0))
                });
            match candidate {
                Some(object) => placed.push(object),
                None => debug!("No room left for {:?}, placed {}", object_type, placed.len()),
            }
        }
        placed
    }
}

impl WorldGenerator for SeededGenerator {
    fn player_starting_food(&self, config: &Config, players: &[Position], seeds: &[i32]) -> Vec<PlacedObject> {
        let food = &config.food;
        let clearance = config.game.starting_player_size + food.food_size + 1;
        let mut placed = Vec::with_capacity(players.len() * food.player_safe_food as usize);

        for (player, seed) in players.iter().zip(seeds) {
            let mut rng = Self::rng(*seed);
            for _ in 0..food.player_safe_food {
                let distance = rng.random_range(clearance..=clearance.max(food.max_starting_separation));
                let heading = rng.random_range(0..360);
                let position = geometry::move_position(*player, distance, heading);
                placed.push(PlacedObject::new(ObjectType::Food, position, food.food_size));
            }
        }
        placed
    }

    fn world_food(
        &self,
        config: &Config,
        players: &[Position],
        occupied: &[PlacedObject],
        seed: i32,
    ) -> (Vec<PlacedObject>, i32) {
        let food = &config.food;
        let mut rng = Self::rng(seed);
        let already_placed = occupied
            .iter()
            .filter(|o| o.object_type == ObjectType::Food)
            .count() as u32;
        let count = food.starting_food_count.saturating_sub(already_placed);
        let clearance = config.game.starting_player_size;

        let mut placed = Self::scatter(
            &mut rng,
            ObjectType::Food,
            count,
            food.food_size,
            config.game.map_radius,
            food.min_separation,
            players,
            clearance,
            occupied,
        );
        for object in placed.iter_mut() {
            if rng.random_range(0..100) < food.superfood_percentage {
                object.object_type = ObjectType::Superfood;
            }
        }
        (placed, Self::next_seed(&mut rng, config))
    }

    fn wormholes(&self, config: &Config, players: &[Position], seed: i32) -> (Vec<(PlacedObject, PlacedObject)>, i32) {
        let wormholes = &config.wormholes;
        let mut rng = Self::rng(seed);
        let placed = Self::scatter(
            &mut rng,
            ObjectType::Wormhole,
            wormholes.count / 2 * 2,
            wormholes.start_size,
            config.game.map_radius,
            wormholes.min_separation,
            players,
            config.game.starting_player_size,
            &[],
        );
        let pairs = placed.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect();
        (pairs, Self::next_seed(&mut rng, config))
    }

    fn gas_clouds(&self, config: &Config, players: &[Position], seed: i32) -> (Vec<PlacedObject>, i32) {
        let clouds = &config.gas_clouds;
        let mut rng = Self::rng(seed);
        let placed = Self::scatter(
            &mut rng,
            ObjectType::GasCloud,
            clouds.count,
            clouds.size,
            config.game.map_radius,
            0,
            players,
            clouds.min_distance_from_players,
            &[],
        );
        (placed, Self::next_seed(&mut rng, config))
    }

    fn asteroid_fields(&self, config: &Config, players: &[Position], seed: i32) -> (Vec<PlacedObject>, i32) {
        let fields = &config.asteroid_fields;
        let mut rng = Self::rng(seed);
        let placed = Self::scatter(
            &mut rng,
            ObjectType::AsteroidField,
            fields.count,
            fields.size,
            config.game.map_radius,
            0,
            players,
            fields.min_distance_from_players,
            &[],
        );
        (placed, Self::next_seed(&mut rng, config))
    }

    fn supernova_plan(&self, config: &Config, seed: i32) -> (SupernovaPlan, i32) {
        let supernova = &config.supernova;
        let rounds = config.game.max_rounds as f64;
        let first = (rounds * supernova.pickup_window_start).floor() as u32;
        let last = ((rounds * supernova.pickup_window_end).floor() as u32).max(first);

        let mut rng = Self::rng(seed);
        let spawn_tick = rng.random_range(first..=last);
        // Keep it well inside the arena as it stands at spawn time.
        let radius = (config.game.map_radius - spawn_tick as i32) / 2;
        let position = Self::point_in_disc(&mut rng, Position::ORIGIN, radius);
        (SupernovaPlan { spawn_tick, position }, Self::next_seed(&mut rng, config))
    }
}

/// Configured seed, or a fresh one in the configured range.
fn seed_or_random(seed: Option<i32>, config: &Config) -> i32 {
    seed.unwrap_or_else(|| rand::rng().random_range(config.seeds.min_seed..config.seeds.max_seed))
}

/// One seed per bot: the configured list, or freshly drawn ones.
pub fn player_seeds(config: &Config) -> Vec<i32> {
    match &config.seeds.player_seeds {
        Some(seeds) => seeds.clone(),
        None => (0..config.game.bot_count)
            .map(|_| seed_or_random(None, config))
            .collect(),
    }
}

impl World {
    /// Populate the arena around the registered bots.
    ///
    /// Player seeds are resolved first if nothing has set them yet and
    /// handed to bots that do not have one.
    pub fn generate_starting_world(&mut self, generator: &impl WorldGenerator) {
        let config = self.config().clone();
        if self.player_seeds.is_empty() {
            self.player_seeds = player_seeds(&config);
        }

        let bot_ids = self.live_bot_ids();
        for (index, id) in bot_ids.iter().enumerate() {
            let seed = self.player_seeds.get(index).copied();
            if let Some(bot) = self.bot_mut(*id)
                && bot.seed.is_none()
            {
                bot.seed = seed;
            }
        }
        let players: Vec<Position> = bot_ids
            .iter()
            .filter_map(|id| self.data(*id).map(|d| d.position))
            .collect();
        let player_seeds: Vec<i32> = bot_ids
            .iter()
            .filter_map(|id| self.bot(*id).and_then(|b| b.seed))
            .collect();

        let mut occupied = generator.player_starting_food(&config, &players, &player_seeds);

        let wormhole_seed = seed_or_random(config.wormholes.seed, &config);
        let (pairs, _) = generator.wormholes(&config, &players, wormhole_seed);
        for (first, second) in &pairs {
            let a = self.spawn_object(first.object_type, first.position, first.size);
            let b = self.spawn_object(second.object_type, second.position, second.size);
            self.add_wormhole_pair(a, b);
            occupied.extend([*first, *second]);
        }

        let gas_seed = seed_or_random(config.gas_clouds.seed, &config);
        let (clouds, _) = generator.gas_clouds(&config, &players, gas_seed);
        let asteroid_seed = seed_or_random(config.asteroid_fields.seed, &config);
        let (fields, _) = generator.asteroid_fields(&config, &players, asteroid_seed);
        occupied.extend(clouds.iter().chain(fields.iter()).copied());

        let food_seed = player_seeds
            .iter()
            .fold(17i32, |acc, seed| acc.wrapping_mul(31).wrapping_add(*seed));
        let (food, _) = generator.world_food(&config, &players, &occupied, food_seed);

        let supernova_seed = seed_or_random(config.supernova.seed, &config);
        let (plan, _) = generator.supernova_plan(&config, supernova_seed);
        self.supernova.spawn_tick = Some(plan.spawn_tick);
        self.supernova.pickup_position = plan.position;

        for object in occupied
            .iter()
            .filter(|o| o.object_type != ObjectType::Wormhole)
            .chain(food.iter())
        {
            self.spawn_object(object.object_type, object.position, object.size);
        }

        self.world_seeds = vec![wormhole_seed, gas_seed, asteroid_seed];
        info!(
            "Generated world: {} objects, {} wormhole pairs, {} gas clouds, {} asteroid fields, supernova at tick {} (seeds {:?}, players {:?})",
            self.object_ids().len(),
            pairs.len(),
            clouds.len(),
            fields.len(),
            plan.spawn_tick,
            self.world_seeds,
            self.player_seeds,
        );
    }
}
