// Domain-level errors for the room's connection handling. Each
// variant's message is the exact string sent back on the wire.

#[derive(Debug)]
pub enum RoomError {
    SeatTaken,
    NotEnoughPlayers,
    AlreadyStarted,
    SpectatorAction,
    HoldUsed,
    UnknownAction(String),
    BadRequest(String),
}

impl RoomError {
    pub fn message(&self) -> String {
        match self {
            RoomError::SeatTaken => "Role already taken.".to_string(),
            RoomError::NotEnoughPlayers => "Not enough players.".to_string(),
            RoomError::AlreadyStarted => "Game already started.".to_string(),
            RoomError::SpectatorAction => "Spectators cannot act.".to_string(),
            RoomError::HoldUsed => "Hold already used.".to_string(),
            RoomError::UnknownAction(action) => format!("unrecognised action: {action}"),
            RoomError::BadRequest(reason) => reason.clone(),
        }
    }
}
