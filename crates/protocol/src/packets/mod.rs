//! Packet definitions for the galaxio wire format.
//!
//! This module contains both runner->engine and engine->runner packet types.

mod client;
mod server;

pub use client::*;
pub use server::*;

/// Opcodes for runner -> engine packets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientOpcode {
    /// Queue an action for a bot.
    SubmitAction = 0x10,
    /// Echo of the last published tick.
    TickAck = 0x20,
}

/// Opcodes for engine -> runner packets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerOpcode {
    /// Per-tick world snapshot.
    GameState = 0x10,
    /// A bot was removed this tick.
    PlayerConsumed = 0x11,
    /// Final standings, sent once.
    GameComplete = 0x30,
}
