// Domain-level errors for lobby workflows. Each variant's message is
// the exact string sent back on the wire.

#[derive(Debug)]
pub enum LobbyError {
    MissingField(&'static str),
    AlreadyExists,
    InvalidCredentials,
    AlreadyOnline,
    MissingSession,
    InvalidSession,
    GameNotFound,
    RoomNotFound,
    AmbiguousRoomId,
    RoleTaken,
    RoomFull,
    NotRoomOwner,
    MissingClientCode,
    NotEnoughFiles,
    SpawnFailed(String),
    Store(String),
    Io(String),
    UnknownAction(String),
}

impl LobbyError {
    /// The exact user-visible `errorMsg` text sent back over the wire.
    pub fn message(&self) -> String {
        match self {
            LobbyError::MissingField(name) => format!("{name} is required"),
            LobbyError::AlreadyExists => "A record with that name already exists.".to_string(),
            LobbyError::InvalidCredentials => "Invalid username or password.".to_string(),
            LobbyError::AlreadyOnline => "User already online.".to_string(),
            LobbyError::MissingSession => "Missing sessionID.".to_string(),
            LobbyError::InvalidSession => "Invalid or expired session.".to_string(),
            LobbyError::GameNotFound => "Game not found.".to_string(),
            LobbyError::RoomNotFound => "Room not found.".to_string(),
            LobbyError::AmbiguousRoomId => "Ambiguous ID.".to_string(),
            LobbyError::RoleTaken => "Role already taken.".to_string(),
            LobbyError::RoomFull => "Room is full.".to_string(),
            LobbyError::NotRoomOwner => "Only the room owner may delete it.".to_string(),
            LobbyError::MissingClientCode => "client.py is missing from the game folder.".to_string(),
            LobbyError::NotEnoughFiles => "Exactly two files are required.".to_string(),
            LobbyError::SpawnFailed(reason) => format!("failed to start room: {reason}"),
            LobbyError::Store(reason) => format!("storage failure: {reason}"),
            LobbyError::Io(reason) => format!("storage failure: {reason}"),
            LobbyError::UnknownAction(action) => format!("unrecognised action: {action}"),
        }
    }
}
