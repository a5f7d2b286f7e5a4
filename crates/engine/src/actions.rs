//! Bot action resolution.
//!
//! One handler per action kind, picked first-match from an ordered list.
//! Each handler mutates the world on behalf of a single bot.

use crate::entity::Entity;
use crate::{geometry, World};
use protocol::{ActionKind, Effect, ObjectId, ObjectType, PlayerAction};
use tracing::{debug, info};

/// Action handler variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionHandler {
    Forward,
    Stop,
    StartAfterburner,
    StopAfterburner,
    FireTorpedoes,
    FireSupernova,
    DetonateSupernova,
    FireTeleporter,
    Teleport,
    ActivateShield,
    /// Fallback when nothing claims the action.
    NoOp,
}

impl ActionHandler {
    /// Resolution order. No two entries may claim the same action kind.
    pub const ORDERED: [ActionHandler; 10] = [
        ActionHandler::Forward,
        ActionHandler::Stop,
        ActionHandler::StartAfterburner,
        ActionHandler::StopAfterburner,
        ActionHandler::FireTorpedoes,
        ActionHandler::FireSupernova,
        ActionHandler::DetonateSupernova,
        ActionHandler::FireTeleporter,
        ActionHandler::Teleport,
        ActionHandler::ActivateShield,
    ];

    pub fn is_applicable(self, kind: ActionKind) -> bool {
        matches!(
            (self, kind),
            (ActionHandler::Forward, ActionKind::Forward)
                | (ActionHandler::Stop, ActionKind::Stop)
                | (ActionHandler::StartAfterburner, ActionKind::StartAfterburner)
                | (ActionHandler::StopAfterburner, ActionKind::StopAfterburner)
                | (ActionHandler::FireTorpedoes, ActionKind::FireTorpedoes)
                | (ActionHandler::FireSupernova, ActionKind::FireSupernova)
                | (ActionHandler::DetonateSupernova, ActionKind::DetonateSupernova)
                | (ActionHandler::FireTeleporter, ActionKind::FireTeleport)
                | (ActionHandler::Teleport, ActionKind::Teleport)
                | (ActionHandler::ActivateShield, ActionKind::ActivateShield)
        )
    }

    /// First handler claiming `kind`, or `NoOp`.
    pub fn resolve(kind: ActionKind) -> ActionHandler {
        Self::ORDERED
            .into_iter()
            .find(|handler| handler.is_applicable(kind))
            .unwrap_or(ActionHandler::NoOp)
    }

    pub fn apply(self, world: &mut World, bot_id: ObjectId, action: &PlayerAction) {
        match self {
            ActionHandler::Forward => forward(world, bot_id, action.heading),
            ActionHandler::Stop => {
                if let Some(data) = world.data_mut(bot_id) {
                    data.is_moving = false;
                }
            }
            ActionHandler::StartAfterburner => start_afterburner(world, bot_id),
            ActionHandler::StopAfterburner => {
                if world.remove_active_effect(bot_id, Effect::Afterburner) {
                    world.update_speed(bot_id);
                }
            }
            ActionHandler::FireTorpedoes => fire_torpedoes(world, bot_id, action.heading),
            ActionHandler::FireSupernova => fire_supernova(world, bot_id, action.heading),
            ActionHandler::DetonateSupernova => detonate_supernova(world, bot_id),
            ActionHandler::FireTeleporter => fire_teleporter(world, bot_id, action.heading),
            ActionHandler::Teleport => teleport(world, bot_id),
            ActionHandler::ActivateShield => activate_shield(world, bot_id),
            ActionHandler::NoOp => {}
        }
    }
}

/// Promote the bot's next action and apply it.
///
/// Returns the applied action kind, or `None` if the bot is gone.
pub fn apply_action_to_bot(world: &mut World, bot_id: ObjectId) -> Option<ActionKind> {
    let action = world.bot_mut(bot_id)?.next_action()?;
    ActionHandler::resolve(action.action).apply(world, bot_id, &action);
    if let Some(bot) = world.bot_mut(bot_id) {
        bot.last_action = Some(action);
    }
    Some(action.action)
}

fn forward(world: &mut World, bot_id: ObjectId, heading: i32) {
    if let Some(data) = world.data_mut(bot_id) {
        data.heading = geometry::normalize_heading(heading);
        data.is_moving = true;
    }
}

fn start_afterburner(world: &mut World, bot_id: ObjectId) {
    let cost = world.config().afterburner.size_consumption_per_tick;
    let minimum = world.config().game.minimum_player_size;
    let Some(size) = world.data(bot_id).map(|d| d.size) else {
        return;
    };
    if size <= cost || size <= minimum {
        return;
    }
    if world.add_active_effect(bot_id, Effect::Afterburner, 0) {
        world.update_speed(bot_id);
    }
}

/// Spawn point just clear of the bot's edge.
fn launch_point(world: &World, bot_id: ObjectId, projectile_size: i32, heading: i32) -> Option<protocol::Position> {
    let data = world.data(bot_id)?;
    Some(geometry::move_position(
        data.position,
        data.size + projectile_size + 1,
        heading,
    ))
}

/// The action's heading aims the salvo. The bot keeps its own heading, so
/// it can fire sideways while travelling.
fn fire_torpedoes(world: &mut World, bot_id: ObjectId, heading: i32) {
    let torpedo = world.config().torpedo.clone();
    if world.bot(bot_id).is_none_or(|bot| bot.torpedo_salvo_count < 1) {
        return;
    }
    let Some(position) = launch_point(world, bot_id, torpedo.size, heading) else {
        return;
    };

    let heading = geometry::normalize_heading(heading);
    let id = world.spawn_projectile(ObjectType::TorpedoSalvo, position, torpedo.size, torpedo.speed, heading, bot_id);
    if let Some(bot) = world.bot_mut(bot_id) {
        bot.data_mut().size -= torpedo.cost;
        bot.torpedo_salvo_count -= 1;
    }
    world.update_speed(bot_id);
    debug!("Bot {} fired torpedo salvo {} heading {}", bot_id, id, heading);
}

fn fire_supernova(world: &mut World, bot_id: ObjectId, heading: i32) {
    let supernova = world.config().supernova.clone();
    if world.bot(bot_id).is_none_or(|bot| bot.supernova_available < 1) {
        return;
    }
    let Some(position) = launch_point(world, bot_id, supernova.bomb_size, heading) else {
        return;
    };

    let heading = geometry::normalize_heading(heading);
    let id = world.spawn_projectile(
        ObjectType::SupernovaBomb,
        position,
        supernova.bomb_size,
        supernova.bomb_speed,
        heading,
        bot_id,
    );
    if let Some(bot) = world.bot_mut(bot_id) {
        bot.supernova_available = 0;
    }
    world.set_supernova_bomb(id);
    info!("Bot {} fired supernova {} heading {}", bot_id, id, heading);
}

fn detonate_supernova(world: &mut World, bot_id: ObjectId) {
    let fired_by_bot = world
        .supernova_bomb()
        .is_some_and(|bomb| bomb.firing_player_id == bot_id);
    if fired_by_bot {
        debug!("Bot {} armed its supernova", bot_id);
        world.mark_supernova_for_detonation();
    }
}

fn fire_teleporter(world: &mut World, bot_id: ObjectId, heading: i32) {
    let teleport = world.config().teleport.clone();
    if world.bot(bot_id).is_none_or(|bot| bot.teleporter_count < 1) {
        return;
    }
    let Some(position) = launch_point(world, bot_id, teleport.size, heading) else {
        return;
    };

    let heading = geometry::normalize_heading(heading);
    let id = world.spawn_projectile(ObjectType::Teleporter, position, teleport.size, teleport.speed, heading, bot_id);
    if let Some(bot) = world.bot_mut(bot_id) {
        bot.data_mut().size -= teleport.cost;
        bot.teleporter_count -= 1;
    }
    world.update_speed(bot_id);
    debug!("Bot {} fired teleporter {}", bot_id, id);
}

fn teleport(world: &mut World, bot_id: ObjectId) {
    let Some(teleporter) = world.active_teleporter_for(bot_id) else {
        return;
    };
    let Some(target) = world.data(teleporter).map(|d| d.position) else {
        return;
    };
    if let Some(data) = world.data_mut(bot_id) {
        data.position = target;
    }
    world.remove_by_id(teleporter);
    debug!("Bot {} teleported to {}", bot_id, target);
}

fn activate_shield(world: &mut World, bot_id: ObjectId) {
    let shield = world.config().shield.clone();
    if world.bot(bot_id).is_none_or(|bot| bot.shield_count < 1) {
        return;
    }
    if !world.add_active_effect(bot_id, Effect::Shield, shield.effect_duration) {
        return;
    }
    if let Some(bot) = world.bot_mut(bot_id) {
        bot.data_mut().size -= shield.cost;
        bot.shield_count -= 1;
    }
    world.update_speed(bot_id);
}
