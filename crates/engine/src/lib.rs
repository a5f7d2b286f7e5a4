//! Authoritative tick simulation core for galaxio matches.
//!
//! A match is a [`World`] advanced one tick at a time by an [`Engine`]:
//! queued bot actions are applied, every moving object walks its path with
//! collisions resolved step by step, and the world then evolves (shrinking
//! arena, growing wormholes, effects, charges, supernova). [`run_match`]
//! drives that loop against a runner over tokio channels.

pub mod actions;
pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod game;
pub mod generation;
pub mod geometry;
pub mod tick;
pub mod world;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::EngineError;
pub use game::{run_match, Engine, MatchChannels, TickOutcome};
pub use generation::{PlacedObject, SeededGenerator, SupernovaPlan, WorldGenerator};
pub use world::{speed_for_size, ActiveEffect, World};
