// `room host port roomId [seed]` — one process per active match,
// spawned by the lobby with its working directory set to the game
// folder and these four positional arguments.

use std::time::{SystemTime, UNIX_EPOCH};

use room::frameworks::server;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    server::init_tracing();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| {
        eprintln!("usage: room <host> <port> <roomId> [seed]");
        std::process::exit(2);
    });
    let port: u16 = args
        .next()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("usage: room <host> <port> <roomId> [seed]");
            std::process::exit(2);
        });
    let room_id = args.next().unwrap_or_else(|| {
        eprintln!("usage: room <host> <port> <roomId> [seed]");
        std::process::exit(2);
    });
    let seed: u64 = args.next().and_then(|v| v.parse().ok()).unwrap_or_else(default_seed);

    server::run(host, port, room_id, seed).await;
}

fn default_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
