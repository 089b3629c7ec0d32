// Domain-level identities for the lobby tier.

use serde::{Deserialize, Serialize};

/// The two disjoint identity spaces the lobby authenticates. Developers
/// and players are separate store collections even if names collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Developer,
    Player,
}

impl Role {
    pub fn collection(self) -> &'static str {
        match self {
            Role::Developer => "Developer",
            Role::Player => "Player",
        }
    }
}

/// An in-memory authenticated identity scoped to one TCP connection to
/// one lobby process. Never persisted; destroyed on logout or
/// connection drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub name: String,
}

/// A player's seat in a room: either a claimed competitive slot or a
/// spectator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatRole {
    P1,
    P2,
}

impl SeatRole {
    pub fn parse(value: &str) -> Option<SeatRole> {
        match value {
            "p1" => Some(SeatRole::P1),
            "p2" => Some(SeatRole::P2),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeatRole::P1 => "p1",
            SeatRole::P2 => "p2",
        }
    }
}
