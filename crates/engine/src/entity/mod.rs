//! Arena objects.

mod bot;
mod object;
mod projectile;

pub use bot::BotObject;
pub use object::{Entity, ObjectData};
pub use projectile::Projectile;

/// An object entry in the world.
#[derive(Debug, Clone)]
pub enum ObjectEntry {
    Bot(BotObject),
    Projectile(Projectile),
    /// Food, hazards, wormholes and pickups.
    Static(ObjectData),
}

impl ObjectEntry {
    /// Get the common object data.
    #[inline]
    pub fn data(&self) -> &ObjectData {
        match self {
            ObjectEntry::Bot(o) => o.data(),
            ObjectEntry::Projectile(o) => o.data(),
            ObjectEntry::Static(o) => o.data(),
        }
    }

    /// Get mutable object data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut ObjectData {
        match self {
            ObjectEntry::Bot(o) => o.data_mut(),
            ObjectEntry::Projectile(o) => o.data_mut(),
            ObjectEntry::Static(o) => o.data_mut(),
        }
    }

    pub fn as_bot(&self) -> Option<&BotObject> {
        match self {
            ObjectEntry::Bot(bot) => Some(bot),
            _ => None,
        }
    }

    pub fn as_bot_mut(&mut self) -> Option<&mut BotObject> {
        match self {
            ObjectEntry::Bot(bot) => Some(bot),
            _ => None,
        }
    }

    pub fn as_projectile(&self) -> Option<&Projectile> {
        match self {
            ObjectEntry::Projectile(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_bot(&self) -> bool {
        matches!(self, ObjectEntry::Bot(_))
    }
}
