use std::path::PathBuf;

// Runtime/server configuration, read from the environment.

pub fn db_host() -> String {
    std::env::var("DB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

pub fn db_port() -> u16 {
    std::env::var("DB_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4500)
}

pub fn data_path() -> PathBuf {
    std::env::var("STORE_DATA_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data/store.json"))
}
