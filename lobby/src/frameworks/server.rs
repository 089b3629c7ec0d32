// Framework bootstrap for one lobby process (developer or player
// variant — same accept loop and connection handler, only `Role`
// differs). One task per connection; forced logout on disconnect is
// the sole cancellation signal (Concurrency & Resource Model).

use std::sync::Arc;

use protocol::{ProtocolError, Request, read_frame, write_frame};
use tokio::net::{TcpListener, TcpStream};
use tracing::{Instrument, info_span};

use crate::domain::Role;
use crate::frameworks::config;
use crate::interface_adapters::clients::{StoreClient, TokioProcessSpawner};
use crate::interface_adapters::{AppState, ConnectionState, dispatch};
use crate::use_cases::SessionTable;
use crate::use_cases::rooms::{PortAllocator, RoomRegistry};

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

pub async fn run(role: Role) {
    let _ = dotenvy::dotenv();
    init_tracing();

    let host = config::server_host();
    let port = match role {
        Role::Developer => config::developer_port(),
        Role::Player => config::player_port(),
    };
    let addr = format!("{host}:{port}");
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            return;
        }
    };

    let store_addr = format!("{}:{}", config::db_host(), config::db_port());
    run_with_listener(listener, role, &store_addr, config::games_root()).await;
}

/// Runs the accept loop against a pre-bound listener, a store address
/// and a games root, so integration tests can bind ephemeral ports for
/// both the lobby and a throwaway store instance and point uploads at
/// a tempdir instead of the process-wide default.
pub async fn run_with_listener(
    listener: TcpListener,
    role: Role,
    store_addr: &str,
    games_root: std::path::PathBuf,
) {
    let store = match StoreClient::connect(store_addr).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(%store_addr, error = %e, "failed to connect to store");
            return;
        }
    };

    let state = Arc::new(AppState {
        role,
        store,
        sessions: SessionTable::new(),
        room_registry: Arc::new(RoomRegistry::new()),
        ports: Arc::new(PortAllocator::new(config::game_server_port_base())),
        spawner: Arc::new(TokioProcessSpawner {
            room_binary: config::room_binary(),
        }),
        games_root,
        host: config::server_host(),
    });

    let addr = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_default();
    tracing::info!(%addr, ?role, "lobby listening");

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "failed to accept connection");
                continue;
            }
        };

        let state = state.clone();
        let span = info_span!("conn", %peer, ?role);
        tokio::spawn(handle_connection(socket, state).instrument(span));
    }
}

async fn handle_connection(mut socket: TcpStream, state: Arc<AppState>) {
    tracing::debug!("lobby connection accepted");
    let mut conn = ConnectionState::default();

    loop {
        let request: Request = match read_frame(&mut socket).await {
            Ok(request) => request,
            Err(ProtocolError::ConnectionClosed) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read request frame; closing");
                break;
            }
        };

        let response = dispatch(&state, &mut conn, request).await;
        if let Err(e) = write_frame(&mut socket, &response).await {
            tracing::warn!(error = %e, "failed to write response frame");
            break;
        }
    }

    if let Some(session_id) = conn.session_id.take() {
        tracing::info!(session_id = %session_id, "forcing logout on disconnect");
        if let Err(e) =
            crate::use_cases::auth::logout(state.store.as_ref(), &state.sessions, state.role, &session_id).await
        {
            tracing::warn!(error = ?e, "forced logout failed");
        }
    }
    tracing::debug!("lobby connection closed");
}
