// Shared, mutex-guarded document tree plus its on-disk persistence.
//
// All mutation serializes behind one `tokio::sync::Mutex`; each
// mutation is followed by a full rewrite of the backing JSON file.
// Atomicity of that rewrite is best-effort, not guaranteed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::{Collection, Document, StoreError};
use crate::use_cases::documents::{self, Collections};

pub struct DocumentStore {
    collections: Mutex<Collections>,
    data_path: PathBuf,
}

impl DocumentStore {
    /// Loads the document tree from `data_path` if it exists, otherwise
    /// starts empty. `Room` is always reset to `{}` on load — rooms are
    /// ephemeral across store restarts.
    pub async fn load(data_path: impl AsRef<Path>) -> std::io::Result<Self> {
        let data_path = data_path.as_ref().to_path_buf();
        let mut collections = documents::empty_collections();

        match tokio::fs::read_to_string(&data_path).await {
            Ok(raw) => {
                if let Ok(Value::Object(top)) = serde_json::from_str::<Value>(&raw) {
                    for collection in Collection::ALL {
                        if collection == Collection::Room {
                            // Rooms are ephemeral; never rehydrated.
                            continue;
                        }
                        if let Some(Value::Object(records)) = top.get(collection.as_str()) {
                            let bucket = collections.entry(collection).or_default();
                            for (id, record) in records {
                                if let Value::Object(map) = record.clone() {
                                    bucket.insert(id.clone(), map);
                                }
                            }
                        }
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        Ok(Self {
            collections: Mutex::new(collections),
            data_path,
        })
    }

    pub async fn create(
        &self,
        collection: Collection,
        data: Document,
    ) -> Result<Document, StoreError> {
        let mut guard = self.collections.lock().await;
        let result = documents::create(&mut guard, collection, data)?;
        self.persist(&guard).await?;
        Ok(result)
    }

    pub async fn read(&self, collection: Collection, id: &str) -> Result<Document, StoreError> {
        let guard = self.collections.lock().await;
        documents::read(&guard, collection, id)
    }

    pub async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Document,
    ) -> Result<Document, StoreError> {
        let mut guard = self.collections.lock().await;
        let result = documents::update(&mut guard, collection, id, patch)?;
        self.persist(&guard).await?;
        Ok(result)
    }

    pub async fn delete(&self, collection: Collection, id: &str) -> Result<Document, StoreError> {
        let mut guard = self.collections.lock().await;
        let result = documents::delete(&mut guard, collection, id)?;
        self.persist(&guard).await?;
        Ok(result)
    }

    pub async fn query(
        &self,
        collection: Collection,
        filter: &Document,
    ) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.lock().await;
        documents::query(&guard, collection, filter)
    }

    async fn persist(&self, collections: &Collections) -> Result<(), StoreError> {
        let mut top = serde_json::Map::new();
        for collection in Collection::ALL {
            let bucket = collections.get(&collection).cloned().unwrap_or_default();
            let records: HashMap<String, Document> = bucket;
            top.insert(
                collection.as_str().to_string(),
                serde_json::to_value(records).unwrap_or(Value::Object(Default::default())),
            );
        }

        if let Some(parent) = self.data_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StoreError::Persist)?;
        }

        let body = serde_json::to_vec_pretty(&Value::Object(top)).expect("document tree serializes");
        tokio::fs::write(&self.data_path, body)
            .await
            .map_err(StoreError::Persist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn load_on_a_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::load(dir.path().join("store.json")).await.unwrap();
        let all = store.query(Collection::Player, &Document::new()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn a_record_created_then_reloaded_from_disk_survives_except_rooms() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = DocumentStore::load(&path).await.unwrap();
        let mut player = Document::new();
        player.insert("name".to_string(), json!("bob"));
        store.create(Collection::Player, player).await.unwrap();

        let mut room = Document::new();
        room.insert("owner".to_string(), json!("bob"));
        store.create(Collection::Room, room).await.unwrap();

        let reloaded = DocumentStore::load(&path).await.unwrap();
        let players = reloaded.query(Collection::Player, &Document::new()).await.unwrap();
        let rooms = reloaded.query(Collection::Room, &Document::new()).await.unwrap();

        assert_eq!(players.len(), 1);
        assert!(rooms.is_empty());
    }
}
