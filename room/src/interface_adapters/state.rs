// Room-wide shared state: the single state-owning mutex every
// gravity tick and every input handler takes, plus the broadcast
// channel used to fan pre-serialized push frames out to every
// connected writer.

use tokio::sync::{broadcast, Mutex, Notify};

use crate::use_cases::room_state::RoomState;

pub struct RoomShared {
    pub state: Mutex<RoomState>,
    pub push_tx: broadcast::Sender<Vec<u8>>,
    pub shutdown: Notify,
}

impl RoomShared {
    pub fn new(seed: u64) -> Self {
        let (push_tx, _rx) = broadcast::channel(64);
        Self {
            state: Mutex::new(RoomState::new(seed)),
            push_tx,
            shutdown: Notify::new(),
        }
    }

    /// Sends a push frame to every currently-subscribed connection.
    /// Subscribers that have lagged or dropped are silently skipped —
    /// matches the "iterate writer handles, drop silently on write
    /// failure" fanout rule.
    pub fn broadcast_raw(&self, frame: Vec<u8>) {
        let _ = self.push_tx.send(frame);
    }
}
