// Framework bootstrap for one room process: binds its assigned port,
// constructs the shared room state, spawns the two tick loops and the
// accept loop, and exits cleanly once the match is over.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, info_span, Instrument};

use crate::frameworks::config;
use crate::interface_adapters::connection::handle_connection;
use crate::interface_adapters::state::RoomShared;
use crate::interface_adapters::tick_loops::{gravity_loop, snapshot_loop};

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(host: String, port: u16, room_id: String, seed: u64) {
    let addr = format!("{host}:{port}");
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    run_with_listener(listener, room_id, seed).await;
}

/// Runs the tick loops and accept loop against a pre-bound listener,
/// so integration tests can bind an ephemeral port.
pub async fn run_with_listener(listener: TcpListener, room_id: String, seed: u64) {
    let shared = Arc::new(RoomShared::new(seed));

    let addr = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_default();
    info!(%addr, %room_id, seed, "room listening");

    let gravity = tokio::spawn(gravity_loop(shared.clone(), config::GRAVITY, config::LOCK_DELAY));
    let snapshot = tokio::spawn(snapshot_loop(shared.clone(), config::SNAPSHOT_INTERVAL));

    let accept = {
        let shared = shared.clone();
        let room_id = room_id.clone();
        tokio::spawn(async move {
            loop {
                let (socket, peer) = match listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };
                let shared = shared.clone();
                let span = info_span!("conn", %peer, %room_id);
                tokio::spawn(handle_connection(socket, shared, seed, config::GRAVITY).instrument(span));
            }
        })
    };

    shared.shutdown.notified().await;
    // Give the gravity/snapshot loops and every connection's push
    // forwarder a moment to drain the game_over broadcast before the
    // process exits.
    tokio::time::sleep(Duration::from_millis(150)).await;

    accept.abort();
    gravity.abort();
    snapshot.abort();
}
