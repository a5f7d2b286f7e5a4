//! Stepwise movement and collision simulation.
//!
//! Every moving object walks its tick's travel one sample point per round.
//! Collisions are checked after each round, so fast objects cannot pass
//! through anything thinner than their speed.

use crate::collision::{resolve_collision, CollisionHandler};
use crate::{geometry, EngineError, World};
use protocol::{ObjectId, ObjectType, Position};
use std::collections::{HashSet, VecDeque};
use tracing::trace;

/// Remaining travel of one object this tick.
#[derive(Debug)]
struct MovementPath {
    id: ObjectId,
    points: VecDeque<Position>,
    /// Distance walked so far this tick.
    elapsed: i32,
    /// Position and heading the path was planned from.
    at: Position,
    heading: i32,
}

impl MovementPath {
    fn plan(world: &World, id: ObjectId) -> Option<Self> {
        let data = world.data(id)?;
        let mut path = Self {
            id,
            points: VecDeque::new(),
            elapsed: 0,
            at: data.position,
            heading: data.heading,
        };
        path.replan(world);
        Some(path)
    }

    /// Re-derive the remaining points from the object's current state.
    /// Travel already made counts against the current speed.
    fn replan(&mut self, world: &World) {
        let Some(data) = world.data(self.id) else {
            self.points.clear();
            return;
        };
        let remaining = (data.speed - self.elapsed).max(0);
        let end = geometry::move_position(data.position, remaining, data.heading);
        let mut points = geometry::collect_path_points(data.position, end, data.heading);
        geometry::limit_path(data.position, &mut points, remaining);

        self.points = points.into();
        self.at = data.position;
        self.heading = data.heading;
    }

    /// Whether something other than this path moved or turned the object.
    fn is_stale(&self, world: &World) -> bool {
        world
            .data(self.id)
            .is_some_and(|d| d.position != self.at || d.heading != self.heading)
    }

    /// Advance to the next point. Returns false when nothing is left.
    fn step(&mut self, world: &mut World) -> bool {
        let Some(point) = self.points.pop_front() else {
            return false;
        };
        let Some(data) = world.data_mut(self.id) else {
            return false;
        };
        self.elapsed += geometry::distance_between(data.position, point);
        data.position = point;
        self.at = point;
        true
    }
}

/// Move every moving object for one tick, resolving collisions on the way.
///
/// Does nothing once a single bot is left.
pub fn simulate(world: &mut World) -> Result<(), EngineError> {
    if world.player_count() <= 1 {
        return Ok(());
    }

    let mut paths: Vec<MovementPath> = world
        .moving_ids()
        .into_iter()
        .filter_map(|id| MovementPath::plan(world, id))
        .filter(|path| !path.points.is_empty())
        .collect();

    // Bot pairs that already bounced or fed this tick.
    let mut met: HashSet<(ObjectId, ObjectId)> = HashSet::new();
    let mut rounds = 0;
    while !paths.is_empty() {
        rounds += 1;

        let mut stepped = HashSet::with_capacity(paths.len());
        for path in paths.iter_mut() {
            if path.is_stale(world) {
                path.replan(world);
            }
            if path.step(world) {
                stepped.insert(path.id);
            }
        }

        for path in paths.iter_mut() {
            if !stepped.contains(&path.id) {
                continue;
            }
            if resolve_step(world, path.id, &stepped, &mut met)? {
                path.replan(world);
            }
            if world.player_count() <= 1 {
                trace!("Simulation stopped after {} rounds", rounds);
                return Ok(());
            }
        }

        paths.retain(|path| world.is_present(path.id) && !path.points.is_empty());
    }

    trace!("Simulation finished in {} rounds", rounds);
    Ok(())
}

/// Resolve everything `mover` overlaps at its current point.
/// Returns whether any collision happened.
///
/// Two bots meet at most once per tick. A bounce does not always clear a
/// deep overlap, and the second bot's own step would bounce the pair back.
fn resolve_step(
    world: &mut World,
    mover: ObjectId,
    stepped: &HashSet<ObjectId>,
    met: &mut HashSet<(ObjectId, ObjectId)>,
) -> Result<bool, EngineError> {
    let Some(mover_type) = world.data(mover).map(|d| d.object_type) else {
        return Ok(false);
    };

    let mut collided = false;
    for other in world.overlapping(mover) {
        if !world.is_present(mover) {
            break;
        }
        collided = true;
        if mover_type == ObjectType::Player && world.bot(other).is_some() && !met.insert(bot_pair(mover, other)) {
            continue;
        }
        let alive = resolve_collision(world, other, mover)?;

        // A bot that is not walking this round never sees the torpedo, so
        // the torpedo resolves the hit on its behalf.
        let stationary_bot = mover_type == ObjectType::TorpedoSalvo
            && !stepped.contains(&other)
            && world.bot(other).is_some();
        if stationary_bot && !CollisionHandler::TorpedoSalvo.apply(world, mover, other)? {
            world.remove_by_id(other);
        }

        if !alive {
            world.remove_by_id(mover);
            break;
        }
    }
    Ok(collided)
}

#[inline]
fn bot_pair(a: ObjectId, b: ObjectId) -> (ObjectId, ObjectId) {
    (a.min(b), a.max(b))
}
