//! End-of-tick world evolution.

use super::World;
use crate::entity::{Entity, ObjectEntry};
use crate::geometry;
use protocol::{Effect, ObjectId, ObjectType};
use tracing::{debug, info};

impl World {
    /// Advance the world one tick after movement and collisions.
    ///
    /// Returns the bots dropped from the roster this tick.
    pub fn apply_after_tick_state_changes(&mut self) -> Vec<ObjectId> {
        self.current_tick += 1;
        self.radius -= self.config.game.radius_shrink_per_tick;

        self.apply_boundary_pressure();
        self.remove_out_of_bounds_objects();
        self.evolve_wormholes();
        self.process_active_effects();
        let mut removed = self.flush_removals();

        self.regenerate_charges();
        self.advance_supernova();
        removed.extend(self.flush_removals());
        removed
    }

    /// Bots poking past the edge shrink by one.
    fn apply_boundary_pressure(&mut self) {
        let minimum = self.config.game.minimum_player_size;
        for id in self.live_bot_ids() {
            let radius = self.radius;
            let Some(data) = self.data_mut(id) else {
                continue;
            };
            if geometry::is_in_bounds_with_offset(data.position, data.size, radius) {
                continue;
            }
            data.size -= 1;
            let size = data.size;
            self.update_speed(id);
            if size < minimum {
                debug!("Bot {} shrank out of the arena", id);
                self.remove_by_id(id);
            }
        }
    }

    /// Non-player objects entirely outside the arena are dropped.
    fn remove_out_of_bounds_objects(&mut self) {
        let outside: Vec<ObjectId> = self
            .object_ids
            .iter()
            .copied()
            .filter(|id| {
                self.data(*id)
                    .is_some_and(|d| !geometry::is_in_bounds_with_offset(d.position, -d.size, self.radius))
            })
            .collect();
        for id in outside {
            self.remove_by_id(id);
        }
    }

    /// Grow each pair in lockstep, or drop it once either end reaches the edge.
    fn evolve_wormholes(&mut self) {
        let growth = self.config.wormholes.growth_rate;
        let max_size = self.config.wormholes.max_size;

        for (first, second) in self.wormhole_pairs.clone() {
            let (Some(a), Some(b)) = (self.data(first), self.data(second)) else {
                self.remove_by_id(first);
                self.remove_by_id(second);
                continue;
            };
            let edge_outside = |d: &crate::entity::ObjectData| {
                !geometry::is_in_bounds_with_offset(d.position, d.size, self.radius)
            };
            if edge_outside(a) || edge_outside(b) {
                debug!("Wormhole pair {}/{} left the arena", first, second);
                self.remove_by_id(first);
                self.remove_by_id(second);
                continue;
            }

            let size = ((a.size as f64 * growth).ceil() as i32).min(max_size);
            for id in [first, second] {
                if let Some(data) = self.data_mut(id) {
                    data.size = size;
                }
            }
        }
    }

    fn process_active_effects(&mut self) {
        let minimum = self.config.game.minimum_player_size;
        let afterburner_cost = self.config.afterburner.size_consumption_per_tick;
        let gas_damage = self.config.gas_clouds.affect_per_tick;

        let mut expired = Vec::new();
        for index in 0..self.active_effects.len() {
            let active = self.active_effects[index];
            let bot_id = active.bot_id;
            if self.data(bot_id).is_none() {
                expired.push((bot_id, active.effect));
                continue;
            }

            match active.effect {
                Effect::Afterburner => {
                    self.shrink_bot(bot_id, afterburner_cost, minimum);
                    self.update_speed(bot_id);
                }
                Effect::GasCloud => {
                    if self.overlaps_type(bot_id, ObjectType::GasCloud) {
                        self.shrink_bot(bot_id, gas_damage, minimum);
                        self.update_speed(bot_id);
                    } else {
                        expired.push((bot_id, active.effect));
                    }
                }
                Effect::AsteroidField => {
                    if self.overlaps_type(bot_id, ObjectType::AsteroidField) {
                        self.update_speed(bot_id);
                    } else {
                        expired.push((bot_id, active.effect));
                    }
                }
                Effect::Superfood | Effect::Shield => {
                    let entry = &mut self.active_effects[index];
                    entry.remaining -= 1;
                    if entry.remaining <= 0 {
                        expired.push((bot_id, active.effect));
                    }
                }
            }
        }

        for (bot_id, effect) in expired {
            self.remove_active_effect(bot_id, effect);
            self.update_speed(bot_id);
        }
    }

    /// Subtract `amount` and queue the bot once it is under `minimum`.
    fn shrink_bot(&mut self, bot_id: ObjectId, amount: i32, minimum: i32) {
        let Some(data) = self.data_mut(bot_id) else {
            return;
        };
        data.size -= amount;
        if data.size < minimum {
            self.remove_by_id(bot_id);
        }
    }

    /// Apply queued removals.
    ///
    /// The last bot in the roster is never dropped; it stays in play and
    /// takes the best remaining placement.
    fn flush_removals(&mut self) -> Vec<ObjectId> {
        // A wormhole never outlives its counterpart.
        for (first, second) in self.wormhole_pairs.clone() {
            if self.is_marked(first) || self.is_marked(second) {
                self.remove_by_id(first);
                self.remove_by_id(second);
            }
        }

        let marked = std::mem::take(&mut self.marked_ids);
        let mut removed_bots = Vec::new();

        for id in marked {
            let is_bot = self.objects.get(&id).is_some_and(ObjectEntry::is_bot);
            if !is_bot {
                if self.objects.remove(&id).is_some() && self.supernova.bomb_id == Some(id) {
                    self.supernova.bomb_id = None;
                    self.supernova.detonate = false;
                }
                continue;
            }
            if self.bot_ids.len() <= 1 {
                continue;
            }

            self.bot_ids.retain(|b| *b != id);
            self.active_effects.retain(|a| a.bot_id != id);
            if let Some(ObjectEntry::Bot(mut bot)) = self.objects.remove(&id) {
                bot.placement = self.bot_ids.len() as u32 + 1;
                info!(
                    "Bot {} '{}' consumed, placement {}",
                    id, bot.nickname, bot.placement
                );
                self.lost_bots.push(bot);
                removed_bots.push(id);
            }
        }

        let objects = &self.objects;
        self.object_ids.retain(|id| objects.contains_key(id));
        self.wormhole_pairs
            .retain(|(a, b)| objects.contains_key(a) && objects.contains_key(b));
        self.marked.clear();
        removed_bots
    }

    /// Every `charge_rate` ticks each bot regains one of each charge.
    fn regenerate_charges(&mut self) {
        let tick = self.current_tick;
        let due = |rate: u32| rate > 0 && tick % rate == 0;
        let torpedo = due(self.config.torpedo.charge_rate).then_some(self.config.torpedo.max_count);
        let teleport = due(self.config.teleport.charge_rate).then_some(self.config.teleport.max_count);
        let shield = due(self.config.shield.charge_rate).then_some(self.config.shield.max_count);
        if torpedo.is_none() && teleport.is_none() && shield.is_none() {
            return;
        }

        for id in self.live_bot_ids() {
            let Some(bot) = self.bot_mut(id) else {
                continue;
            };
            if let Some(max) = torpedo {
                bot.torpedo_salvo_count = (bot.torpedo_salvo_count + 1).min(max);
            }
            if let Some(max) = teleport {
                bot.teleporter_count = (bot.teleporter_count + 1).min(max);
            }
            if let Some(max) = shield {
                bot.shield_count = (bot.shield_count + 1).min(max);
            }
        }
    }

    fn advance_supernova(&mut self) {
        if self.supernova.spawn_tick == Some(self.current_tick) {
            let position = self.supernova.pickup_position;
            let id = self.spawn_object(ObjectType::SupernovaPickup, position, self.config.supernova.pickup_size);
            info!("Supernova pickup {} spawned at {}", id, position);
        }

        let Some(bomb_id) = self.supernova.bomb_id else {
            return;
        };
        if !self.is_present(bomb_id) {
            self.supernova.bomb_id = None;
            self.supernova.detonate = false;
            return;
        }
        if self.supernova.detonate {
            self.detonate_supernova(bomb_id);
        }
    }

    /// Damage every bot inside the blast and leave a gas cloud behind.
    fn detonate_supernova(&mut self, bomb_id: ObjectId) {
        let Some(center) = self.data(bomb_id).map(|d| d.position) else {
            return;
        };
        let supernova = self.config.supernova.clone();
        let minimum = self.config.game.minimum_player_size;
        let blast = (self.radius as f64 * supernova.blast_radius_ratio).ceil() as i32;

        let mut hit = 0;
        for id in self.live_bot_ids() {
            let inside = self
                .data(id)
                .is_some_and(|d| geometry::has_overlap(d.position, d.size, center, blast));
            if inside {
                hit += 1;
                self.shrink_bot(id, supernova.damage, minimum);
                self.update_speed(id);
            }
        }

        self.remove_by_id(bomb_id);
        let cloud = self.spawn_object(ObjectType::GasCloud, center, supernova.cloud_size);
        info!(
            "Supernova {} detonated at {} (blast {}, {} bots hit, cloud {})",
            bomb_id, center, blast, hit, cloud
        );
        self.supernova.bomb_id = None;
        self.supernova.detonate = false;
    }
}
