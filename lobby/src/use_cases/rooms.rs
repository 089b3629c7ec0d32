// Room lifecycle: create/list/join/delete plus the monitor task that
// reaps a room's in-memory handle and store row once its process
// exits. The `RoomRegistry` is an explicitly owned component
// (constructed once in `frameworks::server::run`), never an ambient
// global (Design Notes: "No ambient globals").

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::{Notify, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Document, LobbyError, RoomProcessHandle, SeatRole, StoreClientError, StorePort};

/// Monotonic port allocator shared by every `create-room` call.
pub struct PortAllocator {
    next: AtomicU16,
}

impl PortAllocator {
    pub fn new(base: u16) -> Self {
        Self {
            next: AtomicU16::new(base),
        }
    }

    pub fn allocate(&self) -> u16 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

/// Live rooms keyed by id — the in-memory counterpart to the store's
/// `Room` collection (Invariant: one entry here implies one matching
/// store row, and vice versa, except transiently during create/delete).
///
/// The actual OS process handle is owned exclusively by the room's
/// `monitor_room` task (so `wait` and `kill` are never called from two
/// places at once); the registry instead holds a `Notify` per room
/// that `delete_room`/`reap` fire to ask the monitor to kill its
/// process early.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Arc<Notify>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a newly spawned room and returns the kill switch the
    /// caller hands to its `monitor_room` task.
    pub async fn insert(&self, room_id: String) -> Arc<Notify> {
        let kill_switch = Arc::new(Notify::new());
        self.rooms.write().await.insert(room_id, kill_switch.clone());
        kill_switch
    }

    pub async fn remove(&self, room_id: &str) -> Option<Arc<Notify>> {
        self.rooms.write().await.remove(room_id)
    }

    /// Ids of every live room, used for prefix matching by `join-room`
    /// and `delete-room`.
    pub async fn ids(&self) -> Vec<String> {
        self.rooms.read().await.keys().cloned().collect()
    }

    pub async fn contains(&self, room_id: &str) -> bool {
        self.rooms.read().await.contains_key(room_id)
    }
}

#[derive(Serialize)]
pub struct CreatedRoom {
    pub id: String,
    pub port: u16,
}

pub async fn create_room(
    store: Arc<dyn StorePort>,
    registry: Arc<RoomRegistry>,
    spawner: &dyn crate::domain::ProcessSpawner,
    host: &str,
    ports: &PortAllocator,
    owner: &str,
    game_id: &str,
    visibility: &str,
    invite: Option<&str>,
    seed: Option<u64>,
) -> Result<CreatedRoom, LobbyError> {
    let game = store.read("Game", game_id).await.map_err(store_err)?;
    let folder = game["folder"].as_str().unwrap_or_default().to_string();

    let port = ports.allocate();

    let mut data = Document::new();
    data.insert("owner".to_string(), json!(owner));
    data.insert("gameId".to_string(), json!(game_id));
    data.insert("port".to_string(), json!(port));
    data.insert("visibility".to_string(), json!(visibility));
    data.insert("invite".to_string(), invite.map(Value::from).unwrap_or(Value::Null));
    data.insert("players".to_string(), json!([]));
    data.insert("spectators".to_string(), json!([]));

    let created = store.create("Room", data).await.map_err(store_err)?;
    let room_id = created["id"].as_str().unwrap_or_default().to_string();

    let handle = spawner
        .spawn(&folder, host, port, &room_id, seed)
        .await
        .map_err(LobbyError::SpawnFailed)?;
    let kill_switch = registry.insert(room_id.clone()).await;
    tokio::spawn(monitor_room(store.clone(), registry.clone(), room_id.clone(), handle, kill_switch));

    info!(room_id = %room_id, port, "room spawned");
    Ok(CreatedRoom { id: room_id, port })
}

/// Three queries concatenated verbatim, no de-duplication: private
/// rooms invited to `caller_name`, all public rooms, private rooms
/// owned by `caller_name`.
pub async fn list_rooms(store: &dyn StorePort, caller_name: &str) -> Result<Vec<Document>, LobbyError> {
    let mut rooms = Vec::new();

    let mut invited_filter = Document::new();
    invited_filter.insert("visibility".to_string(), json!("private"));
    invited_filter.insert("invite".to_string(), json!(caller_name));
    rooms.extend(store.query("Room", invited_filter).await.map_err(store_err)?);

    let mut public_filter = Document::new();
    public_filter.insert("visibility".to_string(), json!("public"));
    rooms.extend(store.query("Room", public_filter).await.map_err(store_err)?);

    let mut owned_filter = Document::new();
    owned_filter.insert("visibility".to_string(), json!("private"));
    owned_filter.insert("owner".to_string(), json!(caller_name));
    rooms.extend(store.query("Room", owned_filter).await.map_err(store_err)?);

    Ok(rooms)
}

pub struct JoinedRoom {
    pub id: String,
    pub port: u16,
    pub role: String,
    pub client_code_b64: String,
    pub game_name: String,
    pub owner: String,
}

pub async fn join_room(
    store: &dyn StorePort,
    registry: &RoomRegistry,
    id_prefix: &str,
    caller_name: &str,
    requested_role: &str,
) -> Result<JoinedRoom, LobbyError> {
    let room_id = resolve_prefix(registry, id_prefix).await?;
    let mut room = store.read("Room", &room_id).await.map_err(store_err)?;

    let mut players = room["players"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    let role = match SeatRole::parse(requested_role) {
        Some(seat) => {
            let taken = players
                .iter()
                .any(|p| p.get("role").and_then(Value::as_str) == Some(seat.as_str()));
            if taken {
                return Err(LobbyError::RoleTaken);
            }
            if players.len() >= 2 {
                return Err(LobbyError::RoomFull);
            }
            players.push(json!({"name": caller_name, "role": seat.as_str()}));
            seat.as_str().to_string()
        }
        None => {
            let mut spectators = room["spectators"].as_array().cloned().unwrap_or_default();
            spectators.push(json!(caller_name));
            room["spectators"] = Value::Array(spectators);
            "spectator".to_string()
        }
    };
    room["players"] = Value::Array(players);

    let mut patch = Document::new();
    patch.insert("players".to_string(), room["players"].clone());
    patch.insert("spectators".to_string(), room["spectators"].clone());
    store.update("Room", &room_id, patch).await.map_err(store_err)?;

    let game_id = room["gameId"].as_str().unwrap_or_default();
    let game = store.read("Game", game_id).await.map_err(store_err)?;
    let folder = game["folder"].as_str().unwrap_or_default();
    let game_name = game["gameName"].as_str().unwrap_or_default().to_string();

    let client_bytes = tokio::fs::read(Path::new(folder).join("client.py"))
        .await
        .map_err(|_| LobbyError::MissingClientCode)?;

    Ok(JoinedRoom {
        id: room_id,
        port: room["port"].as_u64().unwrap_or_default() as u16,
        role,
        client_code_b64: BASE64.encode(client_bytes),
        game_name,
        owner: room["owner"].as_str().unwrap_or_default().to_string(),
    })
}

/// Entry point for a caller-initiated delete — enforces ownership.
pub async fn delete_room(
    store: &dyn StorePort,
    registry: &RoomRegistry,
    id_prefix: &str,
    caller_name: &str,
) -> Result<(), LobbyError> {
    let room_id = resolve_prefix(registry, id_prefix).await?;
    let room = store.read("Room", &room_id).await.map_err(store_err)?;
    if room["owner"].as_str() != Some(caller_name) {
        return Err(LobbyError::NotRoomOwner);
    }
    reap(store, registry, &room_id).await
}

/// The internal reap path: fires the room's kill switch (if it is
/// still registered, waking its `monitor_room` task to terminate the
/// process) and deletes the store row. No ownership check; idempotent
/// so a racing explicit `delete-room` and a natural process exit never
/// conflict.
pub async fn reap(store: &dyn StorePort, registry: &RoomRegistry, room_id: &str) -> Result<(), LobbyError> {
    if let Some(kill_switch) = registry.remove(room_id).await {
        kill_switch.notify_one();
    }
    match store.delete("Room", room_id).await {
        Ok(_) | Err(StoreClientError::NotFound) => Ok(()),
        Err(e) => Err(store_err(e)),
    }
}

/// Owns the spawned process for its whole lifetime. Races the
/// process's natural exit against the room's kill switch; on the
/// latter it kills the process itself (nobody else holds the handle),
/// then either way reaps the room's registry entry and store row.
///
/// Spawned once per room by `create_room` — this is what makes a
/// crashed or finished room process actually get cleaned up instead of
/// leaving a dangling store row and registry entry behind.
pub async fn monitor_room(
    store: Arc<dyn StorePort>,
    registry: Arc<RoomRegistry>,
    room_id: String,
    mut handle: Box<dyn RoomProcessHandle>,
    kill_switch: Arc<Notify>,
) {
    tokio::select! {
        (stdout, success) = handle.wait() => {
            if !success {
                warn!(room_id = %room_id, "room process exited with failure");
            }
            match parse_game_over(&stdout) {
                Some(winner) => info!(room_id = %room_id, winner = ?winner, "room finished"),
                None => warn!(room_id = %room_id, "room stdout did not end with a game_over line"),
            }
        }
        _ = kill_switch.notified() => {
            handle.kill().await;
            info!(room_id = %room_id, "room process killed by delete-room");
        }
    }
    if let Err(e) = reap(store.as_ref(), registry.as_ref(), &room_id).await {
        warn!(room_id = %room_id, error = ?e, "failed to reap room record");
    }
}

fn parse_game_over(stdout: &str) -> Option<Option<String>> {
    let last_line = stdout.lines().rev().find(|l| !l.trim().is_empty())?;
    let value: Value = serde_json::from_str(last_line).ok()?;
    if value.get("type").and_then(Value::as_str) != Some("game_over") {
        return None;
    }
    Some(value.get("winner").and_then(Value::as_str).map(String::from))
}

async fn resolve_prefix(registry: &RoomRegistry, id_prefix: &str) -> Result<String, LobbyError> {
    let ids = registry.ids().await;
    let mut matches = ids.into_iter().filter(|id| id.starts_with(id_prefix));
    let first = matches.next().ok_or(LobbyError::RoomNotFound)?;
    if matches.next().is_some() {
        return Err(LobbyError::AmbiguousRoomId);
    }
    Ok(first)
}

fn store_err(e: StoreClientError) -> LobbyError {
    match e {
        StoreClientError::NotFound => LobbyError::RoomNotFound,
        StoreClientError::Transport(msg) => LobbyError::Store(msg),
        StoreClientError::Upstream(msg) => LobbyError::Store(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    struct FakeStore {
        records: StdMutex<Vec<Document>>,
    }

    impl FakeStore {
        fn new() -> Self {
            Self {
                records: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl StorePort for FakeStore {
        async fn create(&self, _c: &str, mut data: Document) -> Result<Document, StoreClientError> {
            let id = Uuid::new_v4().to_string();
            data.insert("id".to_string(), json!(id));
            self.records.lock().unwrap().push(data.clone());
            Ok(data)
        }

        async fn read(&self, _c: &str, id: &str) -> Result<Document, StoreClientError> {
            self.records
                .lock()
                .unwrap()
                .iter()
                .find(|r| r["id"] == json!(id))
                .cloned()
                .ok_or(StoreClientError::NotFound)
        }

        async fn update(&self, _c: &str, id: &str, data: Document) -> Result<Document, StoreClientError> {
            let mut records = self.records.lock().unwrap();
            let r = records.iter_mut().find(|r| r["id"] == json!(id)).ok_or(StoreClientError::NotFound)?;
            for (k, v) in data {
                r.insert(k, v);
            }
            Ok(r.clone())
        }

        async fn delete(&self, _c: &str, id: &str) -> Result<Document, StoreClientError> {
            let mut records = self.records.lock().unwrap();
            let pos = records.iter().position(|r| r["id"] == json!(id)).ok_or(StoreClientError::NotFound)?;
            Ok(records.remove(pos))
        }

        async fn query(&self, _c: &str, filter: Document) -> Result<Vec<Document>, StoreClientError> {
            let records = self.records.lock().unwrap();
            Ok(records
                .iter()
                .filter(|r| filter.iter().all(|(k, v)| r.get(k) == Some(v)))
                .cloned()
                .collect())
        }
    }

    #[test]
    fn port_allocator_is_monotonic() {
        let alloc = PortAllocator::new(9000);
        assert_eq!(alloc.allocate(), 9000);
        assert_eq!(alloc.allocate(), 9001);
    }

    #[tokio::test]
    async fn list_rooms_concatenates_without_dedup() {
        let store = FakeStore::new();
        let mut public_room = Document::new();
        public_room.insert("visibility".to_string(), json!("public"));
        public_room.insert("owner".to_string(), json!("dave"));
        public_room.insert("invite".to_string(), json!("carol"));
        store.create("Room", public_room).await.unwrap();

        let rooms = list_rooms(&store, "carol").await.unwrap();
        // matches both the invited-private query shape (none here) and
        // the public query; since it's public it also is NOT owned by
        // carol, so it should appear exactly once via the public branch.
        assert_eq!(rooms.len(), 1);

        // A private room carol both owns and is invited to matches two
        // of the three concatenated queries, so it appears twice — the
        // concatenation is never de-duplicated.
        let mut owned_and_invited = Document::new();
        owned_and_invited.insert("visibility".to_string(), json!("private"));
        owned_and_invited.insert("owner".to_string(), json!("carol"));
        owned_and_invited.insert("invite".to_string(), json!("carol"));
        let owned_and_invited = store.create("Room", owned_and_invited).await.unwrap();
        let dup_id = owned_and_invited["id"].clone();

        let rooms = list_rooms(&store, "carol").await.unwrap();
        let dup_count = rooms.iter().filter(|r| r["id"] == dup_id).count();
        assert_eq!(dup_count, 2);
    }

    #[tokio::test]
    async fn private_room_invited_to_caller_is_not_visible_to_others() {
        let store = FakeStore::new();
        let mut private_room = Document::new();
        private_room.insert("visibility".to_string(), json!("private"));
        private_room.insert("owner".to_string(), json!("dave"));
        private_room.insert("invite".to_string(), json!("erin"));
        store.create("Room", private_room).await.unwrap();

        let rooms = list_rooms(&store, "carol").await.unwrap();
        assert!(rooms.is_empty());
    }

    #[tokio::test]
    async fn resolve_prefix_detects_ambiguity() {
        let registry = RoomRegistry::new();
        registry.insert("abcd1111".to_string()).await;
        registry.insert("abcd2222".to_string()).await;

        let result = resolve_prefix(&registry, "abcd").await;
        assert!(matches!(result, Err(LobbyError::AmbiguousRoomId)));

        let unique = resolve_prefix(&registry, "abcd11").await.unwrap();
        assert_eq!(unique, "abcd1111");
    }

    struct NoopHandle;

    #[async_trait]
    impl RoomProcessHandle for NoopHandle {
        async fn wait(&mut self) -> (String, bool) {
            (String::new(), true)
        }
        async fn kill(&mut self) {}
    }

    struct ScriptedHandle {
        exit_signal: Arc<Notify>,
        stdout: String,
    }

    #[async_trait]
    impl RoomProcessHandle for ScriptedHandle {
        async fn wait(&mut self) -> (String, bool) {
            self.exit_signal.notified().await;
            (self.stdout.clone(), true)
        }
        async fn kill(&mut self) {}
    }

    struct ScriptedSpawner {
        exit_signal: Arc<Notify>,
    }

    #[async_trait]
    impl crate::domain::ProcessSpawner for ScriptedSpawner {
        async fn spawn(
            &self,
            _working_dir: &str,
            _host: &str,
            _port: u16,
            _room_id: &str,
            _seed: Option<u64>,
        ) -> Result<Box<dyn RoomProcessHandle>, String> {
            Ok(Box::new(ScriptedHandle {
                exit_signal: self.exit_signal.clone(),
                stdout: "{\"type\":\"game_over\",\"winner\":\"bob\"}".to_string(),
            }))
        }
    }

    #[test]
    fn parse_game_over_reads_the_final_line() {
        let stdout = "some warning\n{\"type\":\"game_over\",\"winner\":\"bob\"}\n";
        assert_eq!(parse_game_over(stdout), Some(Some("bob".to_string())));
    }

    #[test]
    fn parse_game_over_is_none_on_garbage() {
        assert_eq!(parse_game_over("not json"), None);
    }

    #[tokio::test]
    async fn join_room_claims_a_free_seat_and_returns_client_code() {
        let store = FakeStore::new();
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("client.py"), b"print('hi')")
            .await
            .unwrap();

        let mut game = Document::new();
        game.insert("gameName".to_string(), json!("tet"));
        game.insert("owner".to_string(), json!("alice"));
        game.insert("folder".to_string(), json!(dir.path().to_string_lossy()));
        let game = store.create("Game", game).await.unwrap();
        let game_id = game["id"].as_str().unwrap().to_string();

        let mut room = Document::new();
        room.insert("owner".to_string(), json!("bob"));
        room.insert("gameId".to_string(), json!(game_id));
        room.insert("port".to_string(), json!(9100));
        room.insert("players".to_string(), json!([]));
        room.insert("spectators".to_string(), json!([]));
        let room = store.create("Room", room).await.unwrap();
        let room_id = room["id"].as_str().unwrap().to_string();

        let registry = RoomRegistry::new();
        registry.insert(room_id.clone()).await;

        let joined = join_room(&store, &registry, &room_id, "carol", "p1")
            .await
            .unwrap();
        assert_eq!(joined.role, "p1");
        assert_eq!(joined.game_name, "tet");
        assert!(!joined.client_code_b64.is_empty());

        // p1 is occupied but the room is not full (only one of two
        // seats taken) — this is the RoleTaken case, not RoomFull.
        let second = join_room(&store, &registry, &room_id, "erin", "p1").await;
        assert!(matches!(second, Err(LobbyError::RoleTaken)));
    }

    #[tokio::test]
    async fn create_room_spawns_a_monitor_that_reaps_on_process_exit() {
        let store: Arc<dyn StorePort> = Arc::new(FakeStore::new());
        let registry = Arc::new(RoomRegistry::new());
        let ports = PortAllocator::new(9000);
        let exit_signal = Arc::new(Notify::new());
        let spawner = ScriptedSpawner { exit_signal: exit_signal.clone() };

        let mut game = Document::new();
        game.insert("folder".to_string(), json!("."));
        let game = store.create("Game", game).await.unwrap();
        let game_id = game["id"].as_str().unwrap().to_string();

        let created = create_room(
            store.clone(),
            registry.clone(),
            &spawner,
            "127.0.0.1",
            &ports,
            "alice",
            &game_id,
            "public",
            None,
            None,
        )
        .await
        .unwrap();

        assert!(registry.contains(&created.id).await);
        assert!(store.read("Room", &created.id).await.is_ok());

        // Simulate the room process exiting; the spawned monitor task
        // should notice and reap both the registry entry and the
        // store row without any explicit delete-room call.
        exit_signal.notify_one();
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }

        assert!(!registry.contains(&created.id).await);
        assert!(matches!(store.read("Room", &created.id).await, Err(StoreClientError::NotFound)));
    }
}
