// Framework bootstrap for the store process: one TCP listener, one
// document tree behind a mutex, one task per connection.

use std::sync::Arc;

use protocol::{ProtocolError, Request, read_frame, write_frame};
use tokio::net::{TcpListener, TcpStream};

use crate::frameworks::config;
use crate::interface_adapters::dispatch::dispatch;
use crate::interface_adapters::state::DocumentStore;

fn init_tracing() {
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

pub async fn run() {
    let _ = dotenvy::dotenv();
    init_tracing();

    let data_path = config::data_path();
    let addr = format!("{}:{}", config::db_host(), config::db_port());
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            return;
        }
    };

    run_with_listener(listener, &data_path).await;
}

/// Runs the store loop against a pre-bound listener, so integration
/// tests can bind an ephemeral port instead of a fixed one.
pub async fn run_with_listener(listener: TcpListener, data_path: &std::path::Path) {
    let store = match DocumentStore::load(data_path).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(error = %e, path = %data_path.display(), "failed to load document store");
            return;
        }
    };

    let addr = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_default();
    tracing::info!(%addr, path = %data_path.display(), "store listening");

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "failed to accept connection");
                continue;
            }
        };

        let store = store.clone();
        tokio::spawn(async move {
            tracing::debug!(%peer, "store connection accepted");
            handle_connection(socket, store).await;
            tracing::debug!(%peer, "store connection closed");
        });
    }
}

async fn handle_connection(mut socket: TcpStream, store: Arc<DocumentStore>) {
    loop {
        let request: Request = match read_frame(&mut socket).await {
            Ok(request) => request,
            Err(ProtocolError::ConnectionClosed) => return,
            Err(ProtocolError::Json(e)) => {
                // A parse failure is terminal for the store, unlike other peers.
                tracing::warn!(error = %e, "invalid request json; closing store connection");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read request frame");
                return;
            }
        };

        let response = dispatch(&store, request).await;
        if let Err(e) = write_frame(&mut socket, &response).await {
            tracing::warn!(error = %e, "failed to write response frame");
            return;
        }
    }
}
