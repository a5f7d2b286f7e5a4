//! Objects fired by bots: torpedo salvos, teleporters and supernova bombs.

use super::{Entity, ObjectData};
use protocol::{ObjectId, ObjectType, Position};

#[derive(Debug, Clone)]
pub struct Projectile {
    data: ObjectData,
    /// Bot credited with the projectile's effect.
    pub firing_player_id: ObjectId,
}

impl Projectile {
    pub fn new(
        id: ObjectId,
        object_type: ObjectType,
        position: Position,
        size: i32,
        speed: i32,
        heading: i32,
        firing_player_id: ObjectId,
    ) -> Self {
        let mut data = ObjectData::new(id, object_type, position, size);
        data.speed = speed;
        data.heading = heading;
        data.is_moving = true;
        Self {
            data,
            firing_player_id,
        }
    }
}

impl Entity for Projectile {
    fn data(&self) -> &ObjectData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut ObjectData {
        &mut self.data
    }
}
