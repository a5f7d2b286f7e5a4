//! Runner -> engine packet parsing and building.

use crate::{ActionKind, BinaryReader, BinaryWriter, PlayerAction, ProtocolError};

use super::ClientOpcode;

/// Parsed runner packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientPacket {
    /// Queue an action (0x10).
    SubmitAction(PlayerAction),
    /// Tick acknowledgement (0x20).
    TickAck(u32),
}

impl ClientPacket {
    /// Parse a runner packet from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        let mut reader = BinaryReader::new(data.to_vec());
        let opcode = reader.get_u8()?;

        match opcode {
            0x10 => {
                let player_id = reader.get_u32()?;
                let action = ActionKind::from_u8(reader.get_u8()?)?;
                let heading = reader.get_i32()?;
                Ok(ClientPacket::SubmitAction(PlayerAction {
                    player_id,
                    action,
                    heading,
                }))
            }
            0x20 => Ok(ClientPacket::TickAck(reader.get_u32()?)),
            _ => Err(ProtocolError::InvalidOpcode(opcode)),
        }
    }
}

/// Build a SubmitAction packet (0x10).
pub fn build_submit_action(action: &PlayerAction) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(10);
    w.put_u8(ClientOpcode::SubmitAction as u8);
    w.put_u32(action.player_id);
    w.put_u8(action.action as u8);
    w.put_i32(action.heading);
    w
}

/// Build a TickAck packet (0x20).
pub fn build_tick_ack(tick: u32) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(5);
    w.put_u8(ClientOpcode::TickAck as u8);
    w.put_u32(tick);
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submit_action() {
        let action = PlayerAction::new(42, ActionKind::Forward, 270);
        let data = build_submit_action(&action).finish();
        assert_eq!(data.len(), 10);
        assert_eq!(ClientPacket::parse(&data), Ok(ClientPacket::SubmitAction(action)));
    }

    #[test]
    fn test_parse_rejects_unknown_action() {
        let data = [0x10, 1, 0, 0, 0, 99, 0, 0, 0, 0];
        assert_eq!(ClientPacket::parse(&data), Err(ProtocolError::UnknownAction(99)));
    }

    #[test]
    fn test_parse_rejects_unknown_opcode() {
        assert_eq!(ClientPacket::parse(&[0x77]), Err(ProtocolError::InvalidOpcode(0x77)));
        assert_eq!(ClientPacket::parse(&[]), Err(ProtocolError::UnexpectedEof));
    }
}
