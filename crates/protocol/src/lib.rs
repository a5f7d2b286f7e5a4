//! Shared protocol crate for galaxio.
//!
//! This crate contains:
//! - Binary reading/writing utilities
//! - Packet definitions and builders
//! - Shared types (Position, object types, actions, published state)

mod binary;
mod error;
mod model;
pub mod packets;

pub use binary::{BinaryReader, BinaryWriter};
pub use error::ProtocolError;
pub use model::*;

/// Identifier shared by every object in a match. Never reused.
pub type ObjectId = u32;

/// Integer world coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::hash::Hash for Position {
    // (x, y) and (y, x) must not collide.
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let combined = ((self.x as i64) << 32) ^ (self.y as u32 as i64);
        combined.hash(state);
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(p: Position) -> u64 {
        let mut h = DefaultHasher::new();
        p.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_swapped_coordinates_hash_differently() {
        assert_ne!(hash_of(Position::new(3, 7)), hash_of(Position::new(7, 3)));
        assert_eq!(hash_of(Position::new(3, 7)), hash_of(Position::new(3, 7)));
    }
}
