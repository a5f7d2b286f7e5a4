//! Engine error taxonomy.

use protocol::{ObjectId, ObjectType};
use thiserror::Error;

/// Errors raised by the tick simulation core.
///
/// Objects that disappear earlier in the same tick are not errors; handlers
/// treat them as a no-op. Everything here aborts the current operation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A wormhole took part in a collision but has no pair record.
    #[error("wormhole {0} has no counterpart")]
    UnpairedWormhole(ObjectId),

    /// A collision handler was handed a pairing it cannot service.
    #[error("{handler} handler cannot resolve {encountered:?} encountered by {mover:?}")]
    HandlerMismatch {
        handler: &'static str,
        encountered: ObjectType,
        mover: ObjectType,
    },

    /// No collision handler claims the pairing.
    #[error("no collision handler for {encountered:?} encountered by {mover:?}")]
    NoCollisionHandler {
        encountered: ObjectType,
        mover: ObjectType,
    },

    /// A bot reached the end of the match without a seed.
    #[error("bot {0} has no seed")]
    MissingSeed(ObjectId),

    /// The runner went away before a winner was found.
    #[error("match aborted: {0}")]
    MatchAborted(String),

    /// The configuration bundle is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}
