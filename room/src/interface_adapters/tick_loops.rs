// The two tick loops that drive a running match: gravity (advances
// pieces, ends the match) and the periodic full-snapshot broadcast.
// Both run for the lifetime of the process; before the match starts
// they simply no-op each tick rather than being spawned on demand.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::domain::Phase;
use crate::interface_adapters::connection::snapshot_payload;
use crate::interface_adapters::state::RoomShared;
use crate::interface_adapters::wire::{encode_push, RoomPush, StateUpdateEntry};

pub async fn gravity_loop(shared: Arc<RoomShared>, gravity: Duration, lock_delay: Duration) {
    let mut ticker = interval(gravity);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shared.shutdown.notified() => break,
        }

        let mut state = shared.state.lock().await;
        if state.phase != Phase::Running {
            continue;
        }

        for step in state.gravity_tick(lock_delay) {
            if step.outcome.lines_cleared > 0 {
                info!(seat = ?step.seat, lines = step.outcome.lines_cleared, score_added = step.outcome.score_added, "lines cleared");
            }
            if step.outcome.topped_out {
                info!(seat = ?step.seat, "player topped out");
            }
        }

        if state.alive_count() <= 1 {
            let winner = state.winner().map(str::to_string);
            drop(state);

            info!(?winner, "match ended");
            shared.broadcast_raw(encode_push(&RoomPush::GameOver { winner: winner.clone() }));
            println!("{}", json!({"type": "game_over", "winner": winner}));
            shared.shutdown.notify_waiters();
            break;
        }

        let payload: HashMap<String, StateUpdateEntry> = state
            .players
            .iter()
            .map(|(seat, player)| {
                (
                    seat.as_str().to_string(),
                    StateUpdateEntry {
                        score: player.score,
                        lines: player.lines,
                        alive: player.alive,
                    },
                )
            })
            .collect();
        drop(state);

        shared.broadcast_raw(encode_push(&RoomPush::StateUpdate { payload }));
    }
}

pub async fn snapshot_loop(shared: Arc<RoomShared>, snapshot_interval: Duration) {
    let mut ticker = interval(snapshot_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shared.shutdown.notified() => break,
        }

        let state = shared.state.lock().await;
        if state.phase != Phase::Running {
            continue;
        }
        let payload = snapshot_payload(&state);
        drop(state);

        shared.broadcast_raw(encode_push(&RoomPush::Snapshot { payload }));
    }
}
