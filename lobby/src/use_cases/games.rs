// Game asset management: upload/update/delete operate on real files on
// disk under a configured games root, alongside a `Game` store row
// that tracks where those files live.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::domain::{Document, LobbyError, StoreClientError, StorePort};

pub struct UploadFile {
    pub filename: String,
    pub content_b64: String,
}

pub struct UploadedGame {
    pub game_id: String,
    pub folder: String,
}

pub struct GameSummary {
    pub game_id: String,
    pub game_name: String,
    pub owner: String,
    pub description: Option<String>,
}

/// Games owned by `owner` only, trimmed to the fields the developer
/// menu displays.
pub async fn list_games_for_owner(
    store: &dyn StorePort,
    owner: &str,
) -> Result<Vec<GameSummary>, LobbyError> {
    let mut filter = Document::new();
    filter.insert("owner".to_string(), json!(owner));
    let records = store.query("Game", filter).await.map_err(store_err)?;
    Ok(records.iter().map(summarize).collect())
}

/// Every game, regardless of owner — the player lobby's asymmetric
/// listing (no owner filter, `description` surfaced when present).
pub async fn list_all_games(store: &dyn StorePort) -> Result<Vec<GameSummary>, LobbyError> {
    let records = store.query("Game", Document::new()).await.map_err(store_err)?;
    Ok(records.iter().map(summarize).collect())
}

fn summarize(record: &Document) -> GameSummary {
    GameSummary {
        game_id: record["id"].as_str().unwrap_or_default().to_string(),
        game_name: record["gameName"].as_str().unwrap_or_default().to_string(),
        owner: record["owner"].as_str().unwrap_or_default().to_string(),
        description: record.get("description").and_then(Value::as_str).map(String::from),
    }
}

pub async fn upload_game(
    store: &dyn StorePort,
    games_root: &Path,
    owner: &str,
    game_name: &str,
    files: &[UploadFile],
) -> Result<UploadedGame, LobbyError> {
    if files.len() != 2 {
        return Err(LobbyError::NotEnoughFiles);
    }

    let folder = games_root.join(format!("{game_name}_{}", &Uuid::new_v4().to_string()[..8]));
    write_files(&folder, files).await?;

    let mut data = Document::new();
    data.insert("gameName".to_string(), json!(game_name));
    data.insert("owner".to_string(), json!(owner));
    data.insert("folder".to_string(), json!(folder.to_string_lossy()));

    let created = store.create("Game", data).await.map_err(store_err)?;
    Ok(UploadedGame {
        game_id: created["id"].as_str().unwrap_or_default().to_string(),
        folder: folder.to_string_lossy().into_owned(),
    })
}

/// Per Open Question #1: no ownership check against the caller is
/// performed here, matching the original's behavior verbatim.
pub async fn update_game(
    store: &dyn StorePort,
    game_id: &str,
    files: &[UploadFile],
) -> Result<(), LobbyError> {
    let record = store.read("Game", game_id).await.map_err(store_err)?;
    let folder = record["folder"].as_str().unwrap_or_default();
    // TODO(Open Question #1): verify caller owns `record["owner"]` before allowing this.
    write_files(Path::new(folder), files).await
}

/// Per Open Question #1: no ownership check against the caller is
/// performed here, matching the original's behavior verbatim.
pub async fn delete_game(store: &dyn StorePort, game_id: &str) -> Result<(), LobbyError> {
    let record = store.read("Game", game_id).await.map_err(store_err)?;
    let folder = record["folder"].as_str().unwrap_or_default();
    // TODO(Open Question #1): verify caller owns `record["owner"]` before allowing this.
    match tokio::fs::remove_dir_all(folder).await {
        Ok(()) | Err(_) => {}
    }
    store.delete("Game", game_id).await.map_err(store_err)?;
    Ok(())
}

async fn write_files(folder: &Path, files: &[UploadFile]) -> Result<(), LobbyError> {
    tokio::fs::create_dir_all(folder)
        .await
        .map_err(|e| LobbyError::Io(e.to_string()))?;

    for file in files {
        let name = safe_basename(&file.filename)?;
        let bytes = BASE64
            .decode(&file.content_b64)
            .map_err(|e| LobbyError::Io(format!("invalid base64: {e}")))?;
        tokio::fs::write(folder.join(name), bytes)
            .await
            .map_err(|e| LobbyError::Io(e.to_string()))?;
    }
    Ok(())
}

/// Strips any path component, keeping only the final segment, to block
/// `../`-style traversal out of the game folder.
fn safe_basename(filename: &str) -> Result<String, LobbyError> {
    let name = PathBuf::from(filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .ok_or(LobbyError::Io("invalid file name".to_string()))?;
    Ok(name)
}

fn store_err(e: StoreClientError) -> LobbyError {
    match e {
        StoreClientError::NotFound => LobbyError::GameNotFound,
        StoreClientError::Transport(msg) => LobbyError::Store(msg),
        StoreClientError::Upstream(msg) => LobbyError::Store(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeStore {
        records: Mutex<Vec<Document>>,
    }

    impl FakeStore {
        fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
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

    #[tokio::test]
    async fn upload_requires_exactly_two_files() {
        let store = FakeStore::new();
        let dir = tempfile::tempdir().unwrap();
        let result = upload_game(
            &store,
            dir.path(),
            "alice",
            "tet",
            &[UploadFile {
                filename: "client.py".to_string(),
                content_b64: BASE64.encode(b"print(1)"),
            }],
        )
        .await;
        assert!(matches!(result, Err(LobbyError::NotEnoughFiles)));
    }

    #[tokio::test]
    async fn upload_writes_files_under_basename_only() {
        let store = FakeStore::new();
        let dir = tempfile::tempdir().unwrap();
        let uploaded = upload_game(
            &store,
            dir.path(),
            "alice",
            "tet",
            &[
                UploadFile {
                    filename: "../../etc/client.py".to_string(),
                    content_b64: BASE64.encode(b"print(1)"),
                },
                UploadFile {
                    filename: "server.py".to_string(),
                    content_b64: BASE64.encode(b"print(2)"),
                },
            ],
        )
        .await
        .unwrap();

        let folder = PathBuf::from(&uploaded.folder);
        assert!(folder.join("client.py").exists());
        assert!(folder.join("server.py").exists());
        assert!(!dir.path().join("etc").exists());
    }

    #[tokio::test]
    async fn list_games_for_owner_filters_by_owner() {
        let store = FakeStore::new();
        let dir = tempfile::tempdir().unwrap();
        let files = [
            UploadFile { filename: "client.py".to_string(), content_b64: BASE64.encode(b"x") },
            UploadFile { filename: "server.py".to_string(), content_b64: BASE64.encode(b"y") },
        ];
        upload_game(&store, dir.path(), "alice", "tet", &files).await.unwrap();
        upload_game(&store, dir.path(), "bob", "tet2", &files).await.unwrap();

        let alices = list_games_for_owner(&store, "alice").await.unwrap();
        assert_eq!(alices.len(), 1);
        assert_eq!(alices[0].owner, "alice");
    }

    #[tokio::test]
    async fn delete_game_is_tolerant_of_a_missing_folder() {
        let store = FakeStore::new();
        let dir = tempfile::tempdir().unwrap();
        let files = [
            UploadFile { filename: "client.py".to_string(), content_b64: BASE64.encode(b"x") },
            UploadFile { filename: "server.py".to_string(), content_b64: BASE64.encode(b"y") },
        ];
        let uploaded = upload_game(&store, dir.path(), "alice", "tet", &files).await.unwrap();
        tokio::fs::remove_dir_all(&uploaded.folder).await.unwrap();
        delete_game(&store, &uploaded.game_id).await.unwrap();
    }
}
