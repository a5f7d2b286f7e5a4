//! Player-controlled bots.

use super::{Entity, ObjectData};
use protocol::{ObjectId, ObjectType, PlayerAction, PlayerState, Position};
use std::collections::VecDeque;

/// A bot taking part in the match.
#[derive(Debug, Clone)]
pub struct BotObject {
    data: ObjectData,
    pub nickname: String,
    /// Submitted actions, oldest first. One is consumed per tick.
    pub pending_actions: VecDeque<PlayerAction>,
    /// Applied every tick until a newer action arrives.
    pub current_action: Option<PlayerAction>,
    pub last_action: Option<PlayerAction>,
    pub score: i32,
    /// 0 while unresolved.
    pub placement: u32,
    pub seed: Option<i32>,
    pub torpedo_salvo_count: i32,
    pub supernova_available: i32,
    pub teleporter_count: i32,
    pub shield_count: i32,
}

impl BotObject {
    pub fn new(id: ObjectId, nickname: impl Into<String>, position: Position, size: i32) -> Self {
        Self {
            data: ObjectData::new(id, ObjectType::Player, position, size),
            nickname: nickname.into(),
            pending_actions: VecDeque::new(),
            current_action: Some(PlayerAction::stop(id)),
            last_action: None,
            score: 0,
            placement: 0,
            seed: None,
            torpedo_salvo_count: 0,
            supernova_available: 0,
            teleporter_count: 0,
            shield_count: 0,
        }
    }

    /// Promote the oldest pending action, keeping the current one if none
    /// is queued.
    pub fn next_action(&mut self) -> Option<PlayerAction> {
        if let Some(action) = self.pending_actions.pop_front() {
            self.current_action = Some(action);
        }
        self.current_action
    }

    /// Object state followed by the charge counters.
    pub fn state(&self) -> PlayerState {
        let base = self.data.state();
        [
            base[0],
            base[1],
            base[2],
            base[3],
            base[4],
            base[5],
            base[6],
            self.torpedo_salvo_count,
            self.supernova_available,
            self.teleporter_count,
            self.shield_count,
        ]
    }
}

impl Entity for BotObject {
    fn data(&self) -> &ObjectData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut ObjectData {
        &mut self.data
    }
}
