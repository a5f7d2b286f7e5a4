//! Protocol error types.

use thiserror::Error;

/// Errors that can occur during protocol parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid packet opcode: {0:#04x}")]
    InvalidOpcode(u8),

    #[error("Unexpected end of data")]
    UnexpectedEof,

    #[error("Unknown action kind: {0}")]
    UnknownAction(u8),

    #[error("Unknown object type: {0}")]
    UnknownObjectType(i32),
}
