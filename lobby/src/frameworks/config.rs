use std::path::PathBuf;

// Runtime/server configuration, read from the environment.

pub fn server_host() -> String {
    std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

pub fn developer_port() -> u16 {
    std::env::var("DEVELOPER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4600)
}

pub fn player_port() -> u16 {
    std::env::var("PLAYER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4601)
}

pub fn db_host() -> String {
    std::env::var("DB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

pub fn db_port() -> u16 {
    std::env::var("DB_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4500)
}

pub fn game_server_port_base() -> u16 {
    std::env::var("GAME_SERVER_PORT_BASE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000)
}

pub fn games_root() -> PathBuf {
    std::env::var("GAMES_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./game"))
}

pub fn room_binary() -> String {
    std::env::var("ROOM_BINARY").unwrap_or_else(|_| "room".to_string())
}
