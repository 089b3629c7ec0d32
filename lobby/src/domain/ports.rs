// Ports the use-cases layer depends on. Concrete adapters (a real TCP
// connection to the store, a real OS subprocess) live in
// `interface_adapters`; use cases only ever see these traits, so tests
// can substitute in-memory doubles.

use async_trait::async_trait;
use serde_json::{Map, Value};

pub type Document = Map<String, Value>;

#[derive(Debug)]
pub enum StoreClientError {
    NotFound,
    Transport(String),
    Upstream(String),
}

/// Port onto the document store, one call per CRUD/query operation.
#[async_trait]
pub trait StorePort: Send + Sync {
    async fn create(&self, collection: &str, data: Document) -> Result<Document, StoreClientError>;
    async fn read(&self, collection: &str, id: &str) -> Result<Document, StoreClientError>;
    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<Document, StoreClientError>;
    async fn delete(&self, collection: &str, id: &str) -> Result<Document, StoreClientError>;
    async fn query(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreClientError>;
}

/// A handle onto one spawned room process, distinguishing "still
/// running" from a completed/crashed exit for the monitor task. Owned
/// exclusively by the monitor task for the life of the process; never
/// shared, so both methods take `&mut self`.
#[async_trait]
pub trait RoomProcessHandle: Send + Sync {
    /// Waits for the process to exit and returns its captured stdout
    /// (for `game_over` parsing) alongside the exit status success flag.
    async fn wait(&mut self) -> (String, bool);
    async fn kill(&mut self);
}

/// Port for starting a room's OS process. Kept separate from the
/// concrete `tokio::process::Command` usage so the lifecycle logic in
/// `use_cases::rooms` can be unit tested against a fake spawner.
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    async fn spawn(
        &self,
        working_dir: &str,
        host: &str,
        port: u16,
        room_id: &str,
        seed: Option<u64>,
    ) -> Result<Box<dyn RoomProcessHandle>, String>;
}
