// Domain-level identities for the room tier.

use serde::{Deserialize, Serialize};

/// A connected client's seat: a claimed competitive slot or a
/// spectator identified by connection-local name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    P1,
    P2,
}

impl Seat {
    pub fn parse(value: &str) -> Option<Seat> {
        match value {
            "p1" => Some(Seat::P1),
            "p2" => Some(Seat::P2),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Seat::P1 => "p1",
            Seat::P2 => "p2",
        }
    }
}

/// Room lifecycle: a room accepts joins but hasn't started, or it is
/// running the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    Running,
}
