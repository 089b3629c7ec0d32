pub mod bag;
pub mod board;
pub mod kicks;
pub mod piece;
pub mod player;

pub use bag::BagGenerator;
pub use board::{Board, BOARD_H, BOARD_W};
pub use piece::{cells, Orientation, PieceKind};
pub use player::{ActivePiece, LockOutcome, PlayerState};

use serde::{Deserialize, Serialize};

/// The actions a connected client can send once seated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    Left,
    Right,
    RotateCW,
    RotateCCW,
    SoftDrop,
    HardDrop,
    Hold,
}
