// Wire DTOs for the room tier: request payloads nested under a
// `Request.data` value, and the unsolicited push frames the room
// sends to every connected client.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use protocol::PushFrame;

use crate::domain::tetris::{ActivePiece, Move, PieceKind, BOARD_W};

#[derive(Debug, Deserialize)]
pub struct JoinData {
    pub role: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct InputData {
    #[serde(rename = "move")]
    pub mv: Move,
    #[allow(dead_code)]
    #[serde(default)]
    pub ts: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct PlayerSnapshot {
    pub board: Vec<[u8; BOARD_W as usize]>,
    pub score: u32,
    pub lines: u32,
    pub alive: bool,
    pub current_piece: CurrentPieceDto,
    pub next: Vec<PieceKind>,
    pub hold: Option<PieceKind>,
}

#[derive(Debug, Serialize)]
pub struct CurrentPieceDto {
    pub kind: PieceKind,
    pub x: i32,
    pub y: i32,
    pub orientation: u8,
}

impl From<&ActivePiece> for CurrentPieceDto {
    fn from(p: &ActivePiece) -> Self {
        Self {
            kind: p.kind,
            x: p.x,
            y: p.y,
            orientation: p.orientation,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StateUpdateEntry {
    pub score: u32,
    pub lines: u32,
    pub alive: bool,
}

/// Every unsolicited frame the room sends, internally tagged by
/// `type` so each variant's fields sit alongside it with no
/// enclosing wrapper — matching the shapes the wire contract names
/// verbatim.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum RoomPush {
    #[serde(rename = "game_meta")]
    GameMeta {
        seed: u64,
        #[serde(rename = "bagRule")]
        bag_rule: &'static str,
        gravity: f64,
    },
    #[serde(rename = "game_start")]
    GameStart,
    #[serde(rename = "snapshot")]
    Snapshot { payload: HashMap<String, PlayerSnapshot> },
    #[serde(rename = "state_update")]
    StateUpdate { payload: HashMap<String, StateUpdateEntry> },
    #[serde(rename = "game_over")]
    GameOver { winner: Option<String> },
}

impl PushFrame for RoomPush {}

/// Serializes `frame` as a raw length-prefixed body, matching the
/// codec used for every request/response frame on the same connection.
pub fn encode_push(frame: &RoomPush) -> Vec<u8> {
    let body = serde_json::to_vec(frame).expect("push frames are always serializable");
    let len = body.len() as u32;
    let mut out = Vec::with_capacity(4 + body.len());
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&body);
    out
}
