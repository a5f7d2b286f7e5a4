//! Data shared by every object in the arena.

use crate::geometry;
use protocol::{Effects, ObjectId, ObjectState, ObjectType, Position};

/// Common object data shared by all object kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectData {
    pub id: ObjectId,
    pub object_type: ObjectType,
    pub position: Position,
    /// Radius for overlap tests and the object's depletable mass.
    pub size: i32,
    pub speed: i32,
    pub heading: i32,
    pub effects: Effects,
    /// Whether the object travels along a collision path this tick.
    pub is_moving: bool,
}

impl ObjectData {
    pub fn new(id: ObjectId, object_type: ObjectType, position: Position, size: i32) -> Self {
        Self {
            id,
            object_type,
            position,
            size,
            speed: 0,
            heading: 0,
            effects: Effects::NONE,
            is_moving: false,
        }
    }

    #[inline]
    pub fn overlaps(&self, other: &ObjectData) -> bool {
        geometry::has_overlap(self.position, self.size, other.position, other.size)
    }

    /// `[size, speed, heading, type, x, y, effects]`
    pub fn state(&self) -> ObjectState {
        [
            self.size,
            self.speed,
            self.heading,
            self.object_type as i32,
            self.position.x,
            self.position.y,
            self.effects.bits() as i32,
        ]
    }
}

/// Trait for all object kinds.
pub trait Entity {
    /// Get the common object data.
    fn data(&self) -> &ObjectData;

    /// Get mutable object data.
    fn data_mut(&mut self) -> &mut ObjectData;
}

impl Entity for ObjectData {
    fn data(&self) -> &ObjectData {
        self
    }

    fn data_mut(&mut self) -> &mut ObjectData {
        self
    }
}
