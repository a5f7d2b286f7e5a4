//! Engine -> runner packet building and parsing.

use crate::{
    BinaryReader, BinaryWriter, GameCompletePayload, GameStateDto, ObjectId, ObjectState, PlayerResult,
    PlayerState, Position, ProtocolError, WorldDto,
};
use std::collections::HashMap;

use super::ServerOpcode;

/// Parsed engine packet.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerPacket {
    GameState(GameStateDto),
    PlayerConsumed(ObjectId),
    GameComplete(GameCompletePayload),
}

/// Build a GameState packet (0x10).
///
/// Each object is written as its id followed by the state array in
/// published field order.
pub fn build_game_state(state: &GameStateDto) -> BinaryWriter {
    let capacity = 21
        + state.game_objects.len() * (4 + 7 * 4)
        + state.player_objects.len() * (4 + 11 * 4);
    let mut w = BinaryWriter::with_capacity(capacity);
    w.put_u8(ServerOpcode::GameState as u8);
    w.put_i32(state.world.radius);
    w.put_i32(state.world.center_point.x);
    w.put_i32(state.world.center_point.y);
    w.put_u32(state.world.current_tick);

    w.put_u32(state.game_objects.len() as u32);
    for (id, fields) in &state.game_objects {
        w.put_u32(*id);
        for v in fields {
            w.put_i32(*v);
        }
    }

    w.put_u32(state.player_objects.len() as u32);
    for (id, fields) in &state.player_objects {
        w.put_u32(*id);
        for v in fields {
            w.put_i32(*v);
        }
    }
    w
}

/// Build a PlayerConsumed packet (0x11).
pub fn build_player_consumed(id: ObjectId) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(5);
    w.put_u8(ServerOpcode::PlayerConsumed as u8);
    w.put_u32(id);
    w
}

/// Build a GameComplete packet (0x30).
pub fn build_game_complete(payload: &GameCompletePayload) -> BinaryWriter {
    let mut w = BinaryWriter::new();
    w.put_u8(ServerOpcode::GameComplete as u8);
    w.put_u32(payload.total_ticks);
    w.put_u32(payload.players.len() as u32);
    for player in &payload.players {
        w.put_u32(player.placement);
        w.put_i32(player.seed);
        w.put_i32(player.score);
        w.put_u32(player.id);
        w.put_i32(player.match_points);
        w.put_string(&player.nickname);
    }
    w.put_u32(payload.world_seeds.len() as u32);
    for seed in &payload.world_seeds {
        w.put_i32(*seed);
    }
    w
}

impl ServerPacket {
    /// Parse an engine packet from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        let mut reader = BinaryReader::new(data.to_vec());
        let opcode = reader.get_u8()?;

        match opcode {
            0x10 => parse_game_state(&mut reader).map(ServerPacket::GameState),
            0x11 => Ok(ServerPacket::PlayerConsumed(reader.get_u32()?)),
            0x30 => parse_game_complete(&mut reader).map(ServerPacket::GameComplete),
            _ => Err(ProtocolError::InvalidOpcode(opcode)),
        }
    }
}

fn parse_game_state(reader: &mut BinaryReader) -> Result<GameStateDto, ProtocolError> {
    let radius = reader.get_i32()?;
    let x = reader.get_i32()?;
    let y = reader.get_i32()?;
    let current_tick = reader.get_u32()?;

    let object_count = reader.get_u32()? as usize;
    let mut game_objects = HashMap::with_capacity(object_count);
    for _ in 0..object_count {
        let id = reader.get_u32()?;
        let mut fields: ObjectState = [0; 7];
        for slot in fields.iter_mut() {
            *slot = reader.get_i32()?;
        }
        game_objects.insert(id, fields);
    }

    let player_count = reader.get_u32()? as usize;
    let mut player_objects = HashMap::with_capacity(player_count);
    for _ in 0..player_count {
        let id = reader.get_u32()?;
        let mut fields: PlayerState = [0; 11];
        for slot in fields.iter_mut() {
            *slot = reader.get_i32()?;
        }
        player_objects.insert(id, fields);
    }

    Ok(GameStateDto {
        world: WorldDto {
            radius,
            center_point: Position::new(x, y),
            current_tick,
        },
        game_objects,
        player_objects,
    })
}

fn parse_game_complete(reader: &mut BinaryReader) -> Result<GameCompletePayload, ProtocolError> {
    let total_ticks = reader.get_u32()?;
    let player_count = reader.get_u32()? as usize;
    let mut players = Vec::with_capacity(player_count);
    for _ in 0..player_count {
        players.push(PlayerResult {
            placement: reader.get_u32()?,
            seed: reader.get_i32()?,
            score: reader.get_i32()?,
            id: reader.get_u32()?,
            match_points: reader.get_i32()?,
            nickname: reader.get_string()?,
        });
    }
    let seed_count = reader.get_u32()? as usize;
    let mut world_seeds = Vec::with_capacity(seed_count);
    for _ in 0..seed_count {
        world_seeds.push(reader.get_i32()?);
    }
    Ok(GameCompletePayload {
        total_ticks,
        players,
        world_seeds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_state_keeps_field_order() {
        let mut state = GameStateDto::default();
        state.world.radius = 1000;
        state.world.current_tick = 7;
        state.game_objects.insert(3, [1, 0, 0, 2, -40, 25, 0]);
        state.player_objects.insert(9, [10, 20, 90, 1, 5, -5, 1, 2, 0, 1, 0]);

        let data = build_game_state(&state).finish();
        match ServerPacket::parse(&data) {
            Ok(ServerPacket::GameState(decoded)) => {
                assert_eq!(decoded.world.radius, 1000);
                assert_eq!(decoded.world.current_tick, 7);
                assert_eq!(decoded.game_objects[&3][4], -40);
                assert_eq!(decoded.player_objects[&9][7], 2);
            }
            other => panic!("unexpected packet: {other:?}"),
        }
    }

    #[test]
    fn test_truncated_game_state_is_eof() {
        let mut state = GameStateDto::default();
        state.game_objects.insert(1, [1; 7]);
        let data = build_game_state(&state).finish();
        assert_eq!(
            ServerPacket::parse(&data[..data.len() - 2]),
            Err(ProtocolError::UnexpectedEof)
        );
    }

    #[test]
    fn test_game_complete_nickname_survives() {
        let payload = GameCompletePayload {
            total_ticks: 300,
            players: vec![PlayerResult {
                placement: 1,
                seed: 77,
                score: 12,
                id: 4,
                nickname: "orbiter".to_string(),
                match_points: 8,
            }],
            world_seeds: vec![1, 2, 3],
        };
        let data = build_game_complete(&payload).finish();
        assert_eq!(ServerPacket::parse(&data), Ok(ServerPacket::GameComplete(payload)));
    }
}
