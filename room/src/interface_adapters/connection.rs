// Per-connection handler: the join handshake, then request/response
// dispatch interleaved with unsolicited push frames arriving on the
// room's broadcast channel. Each connection owns its write half
// exclusively, so no lock is needed to serialize pushes against
// responses — they both flow through the same `tokio::select!` loop.

use std::sync::Arc;
use std::time::Duration;

use protocol::{ProtocolError, Request, Response, read_frame, write_frame};
use serde_json::json;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::domain::tetris::BOARD_W;
use crate::domain::{RoomError, Seat};
use crate::interface_adapters::state::RoomShared;
use crate::interface_adapters::wire::{encode_push, CurrentPieceDto, InputData, JoinData, PlayerSnapshot, RoomPush};

enum Who {
    Seat(Seat),
    Spectator,
}

pub async fn handle_connection<S>(mut socket: S, shared: Arc<RoomShared>, seed: u64, gravity: Duration)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let who = match handshake(&mut socket, &shared).await {
        Some(who) => who,
        None => return,
    };

    let meta = RoomPush::GameMeta {
        seed,
        bag_rule: "7-bag-FisherYates",
        gravity: gravity.as_secs_f64(),
    };
    if write_frame(&mut socket, &meta).await.is_err() {
        return;
    }

    let mut push_rx = shared.push_tx.subscribe();

    loop {
        tokio::select! {
            frame = read_frame::<Request, _>(&mut socket) => {
                match frame {
                    Ok(request) if request.action == "request_snapshot" => {
                        let state = shared.state.lock().await;
                        let payload = snapshot_payload(&state);
                        drop(state);
                        let push = RoomPush::Snapshot { payload };
                        if write_frame(&mut socket, &push).await.is_err() {
                            break;
                        }
                    }
                    Ok(request) => {
                        let response = handle_request(&shared, &who, &request).await;
                        if write_frame(&mut socket, &response).await.is_err() {
                            break;
                        }
                    }
                    Err(ProtocolError::ConnectionClosed) => break,
                    Err(e) => {
                        warn!(error = %e, "failed to read room request frame");
                        break;
                    }
                }
            }
            pushed = push_rx.recv() => {
                match pushed {
                    Ok(bytes) => {
                        if socket.write_all(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "connection lagged behind push broadcast");
                    }
                }
            }
        }
    }

    if let Who::Seat(seat) = who {
        let mut state = shared.state.lock().await;
        if let Some(player) = state.players.get_mut(&seat) {
            player.alive = false;
        }
        info!(?seat, "player disconnected; forfeiting");
    }
}

async fn handshake<S>(socket: &mut S, shared: &Arc<RoomShared>) -> Option<Who>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request: Request = match read_frame(socket).await {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "failed to read join frame");
            return None;
        }
    };

    if request.action != "join" {
        let response = Response::error(RoomError::BadRequest("first frame must be join".into()).message());
        let _ = write_frame(socket, &response).await;
        return None;
    }

    let data: JoinData = match serde_json::from_value(request.data) {
        Ok(d) => d,
        Err(e) => {
            let response = Response::error(RoomError::BadRequest(e.to_string()).message());
            let _ = write_frame(socket, &response).await;
            return None;
        }
    };

    let who = match Seat::parse(&data.role) {
        Some(seat) => {
            let mut state = shared.state.lock().await;
            match state.claim_seat(seat, data.name.clone()) {
                Ok(()) => Who::Seat(seat),
                Err(e) => {
                    drop(state);
                    let response = Response::error(e.message());
                    let _ = write_frame(socket, &response).await;
                    return None;
                }
            }
        }
        None => {
            let mut state = shared.state.lock().await;
            state.add_spectator(data.name.clone());
            Who::Spectator
        }
    };

    let seat_label = match who {
        Who::Seat(seat) => seat.as_str(),
        Who::Spectator => "spectator",
    };
    info!(role = seat_label, name = %data.name, "connection joined");

    let ack = Response::ok(json!({ "role": seat_label }));
    if write_frame(socket, &ack).await.is_err() {
        return None;
    }

    Some(who)
}

async fn handle_request(shared: &Arc<RoomShared>, who: &Who, request: &Request) -> Response {
    match request.action.as_str() {
        "start_game" => handle_start_game(shared).await,
        "input" => handle_input(shared, who, request).await,
        other => Response::error(RoomError::UnknownAction(other.to_string()).message()),
    }
}

async fn handle_start_game(shared: &Arc<RoomShared>) -> Response {
    let started = {
        let mut state = shared.state.lock().await;
        state.start()
    };
    match started {
        Ok(()) => {
            shared.broadcast_raw(encode_push(&RoomPush::GameStart));
            info!("game started");
            Response::ok_empty()
        }
        Err(e) => Response::error(e.message()),
    }
}

async fn handle_input(shared: &Arc<RoomShared>, who: &Who, request: &Request) -> Response {
    let seat = match who {
        Who::Seat(seat) => *seat,
        Who::Spectator => return Response::error(RoomError::SpectatorAction.message()),
    };
    let input: InputData = match serde_json::from_value(request.data.clone()) {
        Ok(i) => i,
        Err(e) => return Response::error(RoomError::BadRequest(e.to_string()).message()),
    };

    let mut state = shared.state.lock().await;
    match state.apply_move(seat, input.mv) {
        Ok(_outcome) => Response::ok_empty(),
        Err(e) => Response::error(e.message()),
    }
}

/// Builds the per-player snapshot map; shared by the periodic
/// broadcast loop and the single-connection `request_snapshot` path.
pub fn snapshot_payload(
    state: &crate::use_cases::room_state::RoomState,
) -> std::collections::HashMap<String, PlayerSnapshot> {
    state
        .players
        .iter()
        .map(|(seat, player)| {
            let board = player
                .board
                .rows()
                .iter()
                .map(|row| {
                    let mut copy = [0u8; BOARD_W as usize];
                    copy.copy_from_slice(row);
                    copy
                })
                .collect();
            let snapshot = PlayerSnapshot {
                board,
                score: player.score,
                lines: player.lines,
                alive: player.alive,
                current_piece: CurrentPieceDto::from(&player.current),
                next: player.next.iter().take(5).copied().collect(),
                hold: player.hold,
            };
            (seat.as_str().to_string(), snapshot)
        })
        .collect()
}
