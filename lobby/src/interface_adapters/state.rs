// Shared state for one lobby process. Both the developer and player
// lobby binaries build the same `AppState` shape; `role` narrows which
// verbs `dispatch` honours (Design Notes: "No ambient globals" — this
// is constructed once in `frameworks::server::run` and threaded
// through, never a `static`).

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::{ProcessSpawner, Role, StorePort};
use crate::use_cases::SessionTable;
use crate::use_cases::rooms::{PortAllocator, RoomRegistry};

pub struct AppState {
    pub role: Role,
    pub store: Arc<dyn StorePort>,
    pub sessions: SessionTable,
    pub room_registry: Arc<RoomRegistry>,
    pub ports: Arc<PortAllocator>,
    pub spawner: Arc<dyn ProcessSpawner>,
    pub games_root: PathBuf,
    pub host: String,
}

/// Per-connection bookkeeping: the session established on this
/// connection, if any. Tracked so a dropped connection can force a
/// logout without the client having sent one explicitly.
#[derive(Default)]
pub struct ConnectionState {
    pub session_id: Option<String>,
}
