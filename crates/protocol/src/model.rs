//! Types exchanged between the engine and the outside world.

use crate::{ObjectId, Position, ProtocolError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Object type tag. The discriminant is what clients see in snapshots.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Player = 1,
    Food = 2,
    Wormhole = 3,
    GasCloud = 4,
    AsteroidField = 5,
    TorpedoSalvo = 6,
    Superfood = 7,
    SupernovaPickup = 8,
    SupernovaBomb = 9,
    Teleporter = 10,
    Shield = 11,
}

impl ObjectType {
    pub fn from_i32(value: i32) -> Result<Self, ProtocolError> {
        Ok(match value {
            1 => ObjectType::Player,
            2 => ObjectType::Food,
            3 => ObjectType::Wormhole,
            4 => ObjectType::GasCloud,
            5 => ObjectType::AsteroidField,
            6 => ObjectType::TorpedoSalvo,
            7 => ObjectType::Superfood,
            8 => ObjectType::SupernovaPickup,
            9 => ObjectType::SupernovaBomb,
            10 => ObjectType::Teleporter,
            11 => ObjectType::Shield,
            other => return Err(ProtocolError::UnknownObjectType(other)),
        })
    }

    /// Whether objects of this type travel along a heading.
    pub fn is_movable(self) -> bool {
        matches!(
            self,
            ObjectType::Player | ObjectType::TorpedoSalvo | ObjectType::SupernovaBomb | ObjectType::Teleporter
        )
    }
}

/// Player action kinds.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Forward = 1,
    Stop = 2,
    StartAfterburner = 3,
    StopAfterburner = 4,
    FireTorpedoes = 5,
    FireSupernova = 6,
    DetonateSupernova = 7,
    FireTeleport = 8,
    Teleport = 9,
    ActivateShield = 10,
}

impl ActionKind {
    pub const ALL: [ActionKind; 10] = [
        ActionKind::Forward,
        ActionKind::Stop,
        ActionKind::StartAfterburner,
        ActionKind::StopAfterburner,
        ActionKind::FireTorpedoes,
        ActionKind::FireSupernova,
        ActionKind::DetonateSupernova,
        ActionKind::FireTeleport,
        ActionKind::Teleport,
        ActionKind::ActivateShield,
    ];

    pub fn from_u8(value: u8) -> Result<Self, ProtocolError> {
        Self::ALL
            .into_iter()
            .find(|kind| *kind as u8 == value)
            .ok_or(ProtocolError::UnknownAction(value))
    }
}

/// An action submitted for a bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAction {
    /// Bot the action is for.
    pub player_id: ObjectId,
    pub action: ActionKind,
    /// Heading in degrees, only meaningful for directional actions.
    pub heading: i32,
}

impl PlayerAction {
    pub fn new(player_id: ObjectId, action: ActionKind, heading: i32) -> Self {
        Self { player_id, action, heading }
    }

    pub fn stop(player_id: ObjectId) -> Self {
        Self::new(player_id, ActionKind::Stop, 0)
    }
}

/// Effect kinds a bot can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Afterburner,
    AsteroidField,
    GasCloud,
    Superfood,
    Shield,
}

impl Effect {
    #[inline]
    pub const fn flag(self) -> Effects {
        match self {
            Effect::Afterburner => Effects::AFTERBURNER,
            Effect::AsteroidField => Effects::ASTEROID_FIELD,
            Effect::GasCloud => Effects::GAS_CLOUD,
            Effect::Superfood => Effects::SUPERFOOD,
            Effect::Shield => Effects::SHIELD,
        }
    }
}

/// Bitmask of active effect flags as published to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Effects(u32);

impl Effects {
    pub const NONE: Effects = Effects(0);
    pub const AFTERBURNER: Effects = Effects(1);
    pub const ASTEROID_FIELD: Effects = Effects(2);
    pub const GAS_CLOUD: Effects = Effects(4);
    pub const SUPERFOOD: Effects = Effects(8);
    pub const SHIELD: Effects = Effects(16);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Effects(bits)
    }

    #[inline]
    pub const fn contains(self, other: Effects) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: Effects) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: Effects) {
        self.0 &= !other.0;
    }
}

impl std::ops::BitOr for Effects {
    type Output = Effects;

    fn bitor(self, rhs: Effects) -> Effects {
        Effects(self.0 | rhs.0)
    }
}

/// `[size, speed, heading, type, x, y, effects]`
pub type ObjectState = [i32; 7];

/// `[size, speed, heading, type, x, y, effects, torpedoes, supernova, teleporters, shields]`
pub type PlayerState = [i32; 11];

/// World header of a published snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorldDto {
    pub radius: i32,
    pub center_point: Position,
    pub current_tick: u32,
}

/// Per-tick snapshot. Field order inside the state arrays is part of the
/// contract with bot clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStateDto {
    pub world: WorldDto,
    pub game_objects: HashMap<ObjectId, ObjectState>,
    pub player_objects: HashMap<ObjectId, PlayerState>,
}

/// Final standing of one bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub placement: u32,
    pub seed: i32,
    pub score: i32,
    pub id: ObjectId,
    pub nickname: String,
    pub match_points: i32,
}

/// Emitted once when a match completes normally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCompletePayload {
    pub total_ticks: u32,
    pub players: Vec<PlayerResult>,
    pub world_seeds: Vec<i32>,
}
